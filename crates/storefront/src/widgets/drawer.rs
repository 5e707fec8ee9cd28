//! Cart drawer: every line, its total and the cart total.

use parking_lot::RwLock;
use pshowcase_core::{Cart, ProductId};
use serde::Serialize;

use super::{Mounted, Widget, WidgetState, attach};
use crate::cart::{CartError, CartHandle, CartObserver};

/// Shown in place of line items when the cart is empty.
pub const EMPTY_MESSAGE: &str = "Your cart is empty, please add items.";

/// One rendered cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawerLine {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// What the drawer displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawerView {
    pub lines: Vec<DrawerLine>,
    pub total: String,
    pub is_empty: bool,
}

impl DrawerView {
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let lines = cart
            .lines()
            .iter()
            .map(|line| DrawerLine {
                id: line.id,
                title: line.title.clone(),
                image: line.image.clone(),
                quantity: line.quantity,
                unit_price: line.price.to_string(),
                line_total: line.line_total().to_string(),
            })
            .collect();

        Self {
            lines,
            total: cart.total().to_string(),
            is_empty: cart.is_empty(),
        }
    }

    /// The message to show instead of lines, if any.
    #[must_use]
    pub const fn empty_message(&self) -> Option<&'static str> {
        if self.is_empty {
            Some(EMPTY_MESSAGE)
        } else {
            None
        }
    }
}

/// Slide-out cart listing every line and the cart total.
pub struct CartDrawer {
    cart: CartHandle,
    state: RwLock<WidgetState<DrawerView>>,
}

impl CartDrawer {
    /// Mount a drawer.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart service has stopped.
    pub async fn mount(cart: &CartHandle) -> Result<Mounted<Self>, CartError> {
        let drawer = attach(
            Self {
                cart: cart.clone(),
                state: RwLock::new(WidgetState::Loading),
            },
            cart,
        )
        .await?;
        drawer.reload();
        Ok(drawer)
    }

    #[must_use]
    pub fn view(&self) -> Option<DrawerView> {
        self.state.read().ready().cloned()
    }

    #[must_use]
    pub fn state(&self) -> WidgetState<DrawerView> {
        self.state.read().clone()
    }

    /// Drop a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn remove(&self, id: ProductId) -> Result<(), CartError> {
        self.cart.remove(id).await.map(|_| ())
    }

    fn reload(&self) {
        let mut state = self.state.write();
        if !state.is_unmounted() {
            *state = WidgetState::Ready(DrawerView::from_cart(&self.cart.snapshot()));
        }
    }
}

impl CartObserver for CartDrawer {
    fn cart_changed(&self) {
        self.reload();
    }
}

impl Widget for CartDrawer {
    fn unmount(&self) {
        *self.state.write() = WidgetState::Unmounted;
    }
}
