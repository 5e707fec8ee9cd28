//! Cart-aware widgets.
//!
//! Every widget is a [`CartObserver`]: it subscribes when mounted, reads the
//! published cart, and re-derives its own display on every change signal.
//! Widgets never reference each other; the cart service is the only
//! coupling between them.
//!
//! Mounting returns a [`Mounted`] guard. Dropping it deregisters the widget
//! and moves it back to [`WidgetState::Unmounted`].

mod badge;
mod detail;
mod drawer;
mod listing;
mod stepper;

pub use badge::CartBadge;
pub use detail::ProductDetail;
pub use drawer::{CartDrawer, DrawerLine, DrawerView, EMPTY_MESSAGE};
pub use listing::{ListingView, ProductListing};
pub use stepper::{QuantityStepper, StepperView};

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::cart::{CartError, CartHandle, CartObserver, Subscription};

/// Lifecycle of a widget's derived display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum WidgetState<T> {
    Unmounted,
    Loading,
    Ready(T),
    /// A remote fetch failed after retries.
    Failed(String),
}

impl<T> WidgetState<T> {
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    #[must_use]
    pub const fn is_unmounted(&self) -> bool {
        matches!(self, Self::Unmounted)
    }
}

/// A widget that can be attached to the cart service.
pub trait Widget: CartObserver + 'static {
    /// Return to [`WidgetState::Unmounted`].
    fn unmount(&self);
}

/// A mounted widget.
///
/// Dropping the guard unmounts the widget and deregisters it.
#[must_use = "dropping a Mounted guard immediately unmounts the widget"]
pub struct Mounted<W: Widget> {
    widget: Arc<W>,
    _subscription: Subscription,
}

impl<W: Widget> Mounted<W> {
    /// Shared access to the widget beyond the guard's lifetime.
    #[must_use]
    pub fn widget(&self) -> Arc<W> {
        self.widget.clone()
    }
}

impl<W: Widget> Deref for Mounted<W> {
    type Target = W;

    fn deref(&self) -> &W {
        &self.widget
    }
}

impl<W: Widget> Drop for Mounted<W> {
    fn drop(&mut self) {
        self.widget.unmount();
    }
}

/// Subscribe `widget` to the change signal.
///
/// Subscribing happens before the widget's first load so that no change
/// between the two is missed.
async fn attach<W: Widget>(widget: W, cart: &CartHandle) -> Result<Mounted<W>, CartError> {
    let widget = Arc::new(widget);
    let subscription = cart.subscribe(widget.clone()).await?;
    Ok(Mounted {
        widget,
        _subscription: subscription,
    })
}

/// Recompute a ready state in place; other states are left alone.
fn refresh<T>(state: &RwLock<WidgetState<T>>, update: impl FnOnce(&mut T)) {
    if let WidgetState::Ready(value) = &mut *state.write() {
        update(value);
    }
}
