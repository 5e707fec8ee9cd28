//! Cache types for catalog responses.

use std::sync::Arc;

use pshowcase_core::{Product, ProductId};

/// Cache key for the product list and single products.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
}
