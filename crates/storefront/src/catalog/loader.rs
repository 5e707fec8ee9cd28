//! Catalog fetches with cart quantities merged in.

use pshowcase_core::{Catalog, Product, ProductId};
use tracing::instrument;

use super::{CatalogClient, CatalogError};
use crate::cart::CartReader;

/// Fetches from the catalog and merges in the current cart.
#[derive(Clone)]
pub struct CatalogLoader {
    client: CatalogClient,
    cart: CartReader,
}

impl CatalogLoader {
    #[must_use]
    pub const fn new(client: CatalogClient, cart: CartReader) -> Self {
        Self { client, cart }
    }

    /// Fetch every product, merge cart quantities and derive categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        let products = self.client.fetch_products().await?;
        Ok(Catalog::new(products, &self.cart.load()))
    }

    /// Fetch one product with its cart quantity merged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be fetched or does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn load_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let mut product = self.client.fetch_product(id).await?;
        product.quantity = self.cart.load().quantity_of(id);
        Ok(product)
    }
}
