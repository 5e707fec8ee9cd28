//! Add-to-cart button that becomes a quantity stepper once the product is in the cart.

use parking_lot::RwLock;
use pshowcase_core::{Product, QuantityDelta};
use serde::Serialize;

use super::{Mounted, Widget, WidgetState, attach};
use crate::cart::{CartError, CartHandle, CartObserver};

/// What a product card's cart control shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "quantity", rename_all = "snake_case")]
pub enum StepperView {
    /// Not in the cart yet.
    AddToCart,
    /// In the cart, with increment and decrement controls.
    Quantity(u32),
}

impl StepperView {
    #[must_use]
    pub const fn from_quantity(quantity: u32) -> Self {
        if quantity == 0 {
            Self::AddToCart
        } else {
            Self::Quantity(quantity)
        }
    }

    #[must_use]
    pub const fn quantity(self) -> u32 {
        match self {
            Self::AddToCart => 0,
            Self::Quantity(quantity) => quantity,
        }
    }
}

/// Per-product quantity control.
pub struct QuantityStepper {
    product: Product,
    cart: CartHandle,
    state: RwLock<WidgetState<StepperView>>,
}

impl QuantityStepper {
    /// Mount a stepper for `product`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart service has stopped.
    pub async fn mount(product: Product, cart: &CartHandle) -> Result<Mounted<Self>, CartError> {
        let stepper = attach(
            Self {
                product,
                cart: cart.clone(),
                state: RwLock::new(WidgetState::Loading),
            },
            cart,
        )
        .await?;
        stepper.reload();
        Ok(stepper)
    }

    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    #[must_use]
    pub fn view(&self) -> Option<StepperView> {
        self.state.read().ready().copied()
    }

    /// Add one unit. Also serves as "add to cart".
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn increment(&self) -> Result<StepperView, CartError> {
        self.step(QuantityDelta::Increment).await
    }

    /// Remove one unit; the line disappears at 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn decrement(&self) -> Result<StepperView, CartError> {
        self.step(QuantityDelta::Decrement).await
    }

    async fn step(&self, delta: QuantityDelta) -> Result<StepperView, CartError> {
        let cart = self.cart.adjust(&self.product, delta).await?;
        Ok(StepperView::from_quantity(cart.quantity_of(self.product.id)))
    }

    fn reload(&self) {
        let mut state = self.state.write();
        if !state.is_unmounted() {
            let quantity = self.cart.snapshot().quantity_of(self.product.id);
            *state = WidgetState::Ready(StepperView::from_quantity(quantity));
        }
    }
}

impl CartObserver for QuantityStepper {
    fn cart_changed(&self) {
        self.reload();
    }
}

impl Widget for QuantityStepper {
    fn unmount(&self) {
        *self.state.write() = WidgetState::Unmounted;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::widgets::test_support::{cart, product};

    #[tokio::test]
    async fn test_add_then_step() {
        let cart = cart();
        let stepper = QuantityStepper::mount(product(1, 100, "a"), &cart)
            .await
            .unwrap();
        assert_eq!(stepper.view(), Some(StepperView::AddToCart));

        assert_eq!(stepper.increment().await.unwrap(), StepperView::Quantity(1));
        assert_eq!(stepper.increment().await.unwrap(), StepperView::Quantity(2));
        assert_eq!(stepper.view(), Some(StepperView::Quantity(2)));

        stepper.decrement().await.unwrap();
        assert_eq!(stepper.decrement().await.unwrap(), StepperView::AddToCart);
        assert!(cart.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_sibling_steppers_stay_in_sync() {
        let cart = cart();
        let item = product(5, 100, "a");
        let first = QuantityStepper::mount(item.clone(), &cart).await.unwrap();
        let second = QuantityStepper::mount(item, &cart).await.unwrap();

        first.increment().await.unwrap();

        assert_eq!(second.view(), Some(StepperView::Quantity(1)));
    }

    #[tokio::test]
    async fn test_decrement_absent_is_noop() {
        let cart = cart();
        let stepper = QuantityStepper::mount(product(1, 100, "a"), &cart)
            .await
            .unwrap();

        assert_eq!(stepper.decrement().await.unwrap(), StepperView::AddToCart);
        assert!(cart.snapshot().is_empty());
    }
}
