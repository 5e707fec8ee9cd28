//! The in-memory catalog: remote products with cart quantities merged in.

use serde::{Deserialize, Serialize};

use crate::types::{Cart, Product, ProductId};

/// Products in remote order plus the categories they span.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<String>,
}

impl Catalog {
    /// Build a catalog from freshly fetched products.
    ///
    /// Quantities are merged from `cart` and categories are derived in a
    /// separate pass.
    #[must_use]
    pub fn new(mut products: Vec<Product>, cart: &Cart) -> Self {
        merge_cart_quantities(&mut products, cart);
        let categories = derive_categories(&products);
        Self {
            products,
            categories,
        }
    }

    /// All products in remote order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Recompute every product's quantity from a new cart.
    pub fn remerge(&mut self, cart: &Cart) {
        merge_cart_quantities(&mut self.products, cart);
    }
}

/// Overwrite each product's quantity with its quantity in `cart` (0 if absent).
pub fn merge_cart_quantities(products: &mut [Product], cart: &Cart) {
    for product in products {
        product.quantity = cart.quantity_of(product.id);
    }
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn derive_categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for product in products {
        if !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}
