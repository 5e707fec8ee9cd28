//! Cart lines and the quantity algebra applied to them.
//!
//! The cart is the single source of truth for what a shopper has selected.
//! Every operation here is a pure `Cart -> Cart` transformation; persisting
//! the result and notifying interested views is the caller's job.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// A one-unit change to a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityDelta {
    Increment,
    Decrement,
}

impl QuantityDelta {
    /// Applies the delta, saturating at zero.
    #[must_use]
    pub const fn apply(self, quantity: u32) -> u32 {
        match self {
            Self::Increment => quantity.saturating_add(1),
            Self::Decrement => quantity.saturating_sub(1),
        }
    }
}

/// One product in the cart together with the display data captured when it
/// was first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    pub quantity: u32,
}

impl CartLine {
    /// Snapshot a product's display data into a new line.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity,
        }
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The shopper's cart.
///
/// Lines are unique by product ID and keep insertion order. A line may carry
/// quantity 0 between an adjustment and the next persist;
/// [`Cart::without_empty_lines`] drops those before the cart is written.
/// Deserializing drops lines whose quantity is not positive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<StoredLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines, keeping the first line for each product ID.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if cart.get(line.id).is_none() {
                cart.lines.push(line);
            }
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Quantity of a product in the cart, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |line| line.quantity)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Apply a one-unit change for `product`.
    ///
    /// An existing line is adjusted in place; when it reaches 0 it stays in the
    /// returned cart until [`Cart::without_empty_lines`] runs. An absent product
    /// is appended with quantity 1 on [`QuantityDelta::Increment`] and ignored
    /// on [`QuantityDelta::Decrement`].
    #[must_use]
    pub fn adjust_quantity(mut self, product: &Product, delta: QuantityDelta) -> Self {
        if let Some(line) = self.lines.iter_mut().find(|line| line.id == product.id) {
            line.quantity = delta.apply(line.quantity);
        } else if delta == QuantityDelta::Increment {
            self.lines.push(CartLine::from_product(product, 1));
        }
        self
    }

    /// Drop the line for a product regardless of its quantity.
    #[must_use]
    pub fn remove_line(mut self, id: ProductId) -> Self {
        self.lines.retain(|line| line.id != id);
        self
    }

    /// Drop every line whose quantity is 0.
    #[must_use]
    pub fn without_empty_lines(mut self) -> Self {
        self.lines.retain(|line| line.quantity > 0);
        self
    }

    /// Returns `true` if any line has quantity 0.
    #[must_use]
    pub fn has_empty_lines(&self) -> bool {
        self.lines.iter().any(|line| line.quantity == 0)
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Self::from_lines(lines)
    }
}

/// A line as found in storage, before its quantity is validated.
#[derive(Deserialize)]
struct StoredLine {
    id: ProductId,
    title: String,
    price: Price,
    #[serde(default)]
    image: String,
    #[serde(default)]
    category: String,
    quantity: i64,
}

impl StoredLine {
    fn into_line(self) -> Option<CartLine> {
        let quantity = u32::try_from(self.quantity).ok().filter(|&q| q > 0)?;
        Some(CartLine {
            id: self.id,
            title: self.title,
            price: self.price,
            image: self.image,
            category: self.category,
            quantity,
        })
    }
}

impl From<Vec<StoredLine>> for Cart {
    fn from(lines: Vec<StoredLine>) -> Self {
        Self::from_lines(lines.into_iter().filter_map(StoredLine::into_line).collect())
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::Rating;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(cents),
            description: String::new(),
            category: "misc".to_string(),
            image: format!("https://img.example/{id}.jpg"),
            rating: Rating::default(),
            quantity: 0,
        }
    }

    #[test]
    fn test_increment_twice_yields_one_line() {
        let item = product(1, 999);
        let cart = Cart::new()
            .adjust_quantity(&item, QuantityDelta::Increment)
            .adjust_quantity(&item, QuantityDelta::Increment);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(item.id), 2);
    }

    #[test]
    fn test_decrement_to_zero_is_dropped_by_cleanup() {
        let item = product(1, 999);
        let cart = Cart::new()
            .adjust_quantity(&item, QuantityDelta::Increment)
            .adjust_quantity(&item, QuantityDelta::Decrement);

        assert!(cart.has_empty_lines());
        assert_eq!(cart.quantity_of(item.id), 0);

        let cart = cart.without_empty_lines();
        assert!(cart.is_empty());
        assert!(cart.get(item.id).is_none());
    }

    #[test]
    fn test_decrement_absent_product_is_noop() {
        let item = product(4, 100);
        let cart = Cart::new().adjust_quantity(&item, QuantityDelta::Decrement);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_new_line_snapshots_display_data() {
        let item = product(3, 1250);
        let cart = Cart::new().adjust_quantity(&item, QuantityDelta::Increment);
        let line = cart.get(item.id).unwrap();

        assert_eq!(line.title, "Product 3");
        assert_eq!(line.price, Price::from_cents(1250));
        assert_eq!(line.image, "https://img.example/3.jpg");
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_totals() {
        let a = product(1, 999);
        let b = product(2, 500);
        let cart = Cart::new()
            .adjust_quantity(&a, QuantityDelta::Increment)
            .adjust_quantity(&b, QuantityDelta::Increment)
            .adjust_quantity(&b, QuantityDelta::Increment);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total().to_string(), "$19.99");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let cart = Cart::new()
            .adjust_quantity(&product(5, 1), QuantityDelta::Increment)
            .adjust_quantity(&product(2, 1), QuantityDelta::Increment)
            .adjust_quantity(&product(9, 1), QuantityDelta::Increment)
            .adjust_quantity(&product(2, 1), QuantityDelta::Increment);

        let ids: Vec<i32> = cart.lines().iter().map(|l| l.id.as_i32()).collect();
        assert_eq!(ids, vec![5, 2, 9]);
    }

    #[test]
    fn test_remove_line() {
        let a = product(1, 999);
        let cart = Cart::new()
            .adjust_quantity(&a, QuantityDelta::Increment)
            .adjust_quantity(&a, QuantityDelta::Increment)
            .remove_line(a.id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_deserialize_dedupes_and_ignores_unknown_fields() {
        let json = r#"[
            {"id": 1, "title": "A", "price": 10.5, "quantity": 2, "rating": {"rate": 4.1, "count": 3}},
            {"id": 1, "title": "A again", "price": 10.5, "quantity": 7}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 2);
    }

    #[test]
    fn test_deserialize_drops_non_positive_lines() {
        let json = r#"[
            {"id": 1, "title": "A", "price": "1.00", "quantity": 0},
            {"id": 2, "title": "B", "price": "2.00", "quantity": -4},
            {"id": 3, "title": "C", "price": "3.00", "quantity": 1},
            {"id": 1, "title": "A later", "price": "1.00", "quantity": 5}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        let ids: Vec<i32> = cart.lines().iter().map(|l| l.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 5);
        assert!(!cart.has_empty_lines());
    }

    proptest! {
        #[test]
        fn property_adjustments_keep_lines_unique(ops in proptest::collection::vec((0i32..5, any::<bool>()), 0..64)) {
            let mut cart = Cart::new();
            let mut expected = [0u32; 5];
            for (id, increment) in ops {
                let delta = if increment { QuantityDelta::Increment } else { QuantityDelta::Decrement };
                cart = cart.adjust_quantity(&product(id, 100), delta).without_empty_lines();
                let slot = &mut expected[usize::try_from(id).unwrap()];
                *slot = delta.apply(*slot);
            }

            for (id, quantity) in expected.iter().enumerate() {
                let id = ProductId::new(i32::try_from(id).unwrap());
                prop_assert_eq!(cart.quantity_of(id), *quantity);
                prop_assert!(cart.lines().iter().filter(|l| l.id == id).count() <= 1);
            }
            prop_assert!(!cart.has_empty_lines());
        }
    }
}
