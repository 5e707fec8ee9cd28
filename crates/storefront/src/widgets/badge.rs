//! Header badge showing how many lines the cart holds.

use parking_lot::RwLock;

use super::{Mounted, Widget, WidgetState, attach};
use crate::cart::{CartError, CartHandle, CartObserver, CartReader};

/// Header badge showing how many distinct products are in the cart.
pub struct CartBadge {
    cart: CartReader,
    state: RwLock<WidgetState<usize>>,
}

impl CartBadge {
    /// Mount a badge.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart service has stopped.
    pub async fn mount(cart: &CartHandle) -> Result<Mounted<Self>, CartError> {
        let badge = attach(
            Self {
                cart: cart.reader(),
                state: RwLock::new(WidgetState::Loading),
            },
            cart,
        )
        .await?;
        badge.reload();
        Ok(badge)
    }

    /// The current count, if mounted.
    #[must_use]
    pub fn count(&self) -> Option<usize> {
        self.state.read().ready().copied()
    }

    #[must_use]
    pub fn state(&self) -> WidgetState<usize> {
        self.state.read().clone()
    }

    fn reload(&self) {
        let mut state = self.state.write();
        if !state.is_unmounted() {
            *state = WidgetState::Ready(self.cart.load().len());
        }
    }
}

impl CartObserver for CartBadge {
    fn cart_changed(&self) {
        self.reload();
    }
}

impl Widget for CartBadge {
    fn unmount(&self) {
        *self.state.write() = WidgetState::Unmounted;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pshowcase_core::QuantityDelta;

    use super::*;
    use crate::widgets::test_support::{cart, product};

    #[tokio::test]
    async fn test_counts_distinct_lines() {
        let cart = cart();
        let badge = CartBadge::mount(&cart).await.unwrap();
        assert_eq!(badge.count(), Some(0));

        let a = product(1, 100, "a");
        cart.adjust(&a, QuantityDelta::Increment).await.unwrap();
        cart.adjust(&a, QuantityDelta::Increment).await.unwrap();
        assert_eq!(badge.count(), Some(1));

        cart.adjust(&product(2, 100, "a"), QuantityDelta::Increment)
            .await
            .unwrap();
        assert_eq!(badge.count(), Some(2));
    }

    #[tokio::test]
    async fn test_unmount_stops_updates() {
        let cart = cart();
        let badge = CartBadge::mount(&cart).await.unwrap();
        let widget = badge.widget();

        drop(badge);
        cart.adjust(&product(1, 100, "a"), QuantityDelta::Increment)
            .await
            .unwrap();

        assert_eq!(widget.state(), WidgetState::Unmounted);
        assert_eq!(widget.count(), None);
    }
}
