//! Catalog products.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating, typically 0-5.
    pub rate: f64,
    /// Number of reviews behind the average.
    pub count: u32,
}

/// A product as returned by the remote catalog.
///
/// `quantity` is not part of the product itself: it is the cart quantity
/// merged onto the product for display and is always recomputed from the
/// cart. Remote payloads do not carry it and deserialize with `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub image: String,
    #[serde(default)]
    pub rating: Rating,
    /// Cart quantity merged from the current cart.
    #[serde(default)]
    pub quantity: u32,
}

impl Product {
    /// Returns `true` if at least one unit is in the cart.
    #[must_use]
    pub const fn in_cart(&self) -> bool {
        self.quantity > 0
    }
}
