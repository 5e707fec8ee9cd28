//! Single-product detail view.
//!
//! Shows the product with its current cart quantity. An unknown ID leaves the
//! widget ready with no product so the caller can answer not found.

use parking_lot::RwLock;
use pshowcase_core::{Product, ProductId};
use tracing::warn;

use super::{Mounted, Widget, WidgetState, attach, refresh};
use crate::cart::{CartError, CartHandle, CartObserver, CartReader};
use crate::catalog::{CatalogError, CatalogLoader};

/// Product detail page.
///
/// Ready with `None` when the catalog has no product under the ID.
pub struct ProductDetail {
    id: ProductId,
    cart: CartReader,
    state: RwLock<WidgetState<Option<Product>>>,
}

impl ProductDetail {
    /// Mount the detail view and fetch the product.
    ///
    /// A failed fetch leaves the widget in [`WidgetState::Failed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cart service has stopped.
    pub async fn mount(
        id: ProductId,
        loader: &CatalogLoader,
        cart: &CartHandle,
    ) -> Result<Mounted<Self>, CartError> {
        let detail = attach(
            Self {
                id,
                cart: cart.reader(),
                state: RwLock::new(WidgetState::Loading),
            },
            cart,
        )
        .await?;

        let fetched = loader.load_product(id).await;
        detail.finish(fetched);
        Ok(detail)
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.id
    }

    #[must_use]
    pub fn product(&self) -> Option<Product> {
        self.state.read().ready().cloned().flatten()
    }

    #[must_use]
    pub fn state(&self) -> WidgetState<Option<Product>> {
        self.state.read().clone()
    }

    fn finish(&self, fetched: Result<Product, CatalogError>) {
        let mut state = self.state.write();
        if state.is_unmounted() {
            return;
        }
        *state = match fetched {
            Ok(mut product) => {
                product.quantity = self.cart.load().quantity_of(self.id);
                WidgetState::Ready(Some(product))
            }
            Err(CatalogError::NotFound(_)) => WidgetState::Ready(None),
            Err(e) => {
                warn!(product_id = %self.id, error = %e, "Failed to load product");
                WidgetState::Failed(e.to_string())
            }
        };
    }
}

impl CartObserver for ProductDetail {
    fn cart_changed(&self) {
        let quantity = self.cart.load().quantity_of(self.id);
        refresh(&self.state, |product| {
            if let Some(product) = product {
                product.quantity = quantity;
            }
        });
    }
}

impl Widget for ProductDetail {
    fn unmount(&self) {
        *self.state.write() = WidgetState::Unmounted;
    }
}
