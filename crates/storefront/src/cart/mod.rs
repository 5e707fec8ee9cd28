//! Cart persistence and change notification.
//!
//! # Architecture
//!
//! - [`CartStore`] reads and writes the cart under the `cart` storage key.
//!   Reads fail soft: a missing or malformed value is an empty cart.
//! - [`CartService`] is the single owner of the cart. Every mutation is sent
//!   to it as a command, applied in arrival order, persisted, published as a
//!   snapshot and then announced to observers with a payload-less signal.
//! - Observers ([`CartObserver`]) re-read the published snapshot when
//!   signalled. They never talk to each other.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = CartStore::new(Arc::new(MemoryStore::new()));
//! let cart = CartService::spawn(store);
//!
//! let badge = CartBadge::mount(&cart).await?;
//! cart.adjust(&product, QuantityDelta::Increment).await?;
//! assert_eq!(badge.count(), Some(1));
//! ```

mod service;
mod signal;

pub use service::{CartHandle, CartReader, CartService};
pub use signal::{CartObserver, Subscription, SubscriptionId};

use std::sync::Arc;

use pshowcase_core::Cart;
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{CART_KEY, KeyValueStore, StorageError};

/// Errors that can occur while mutating the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The cart service task has stopped.
    #[error("cart service is not running")]
    Closed,
}

/// Reads and writes the persisted cart.
#[derive(Clone)]
pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
}

impl CartStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Load the persisted cart.
    ///
    /// Returns an empty cart if nothing is stored or the stored value cannot
    /// be read or parsed.
    #[must_use]
    pub fn load(&self) -> Cart {
        let raw = match self.storage.get(CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                return Cart::new();
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => {
                debug!(lines = cart.len(), "Loaded persisted cart");
                cart
            }
            Err(e) => {
                warn!(error = %e, "Persisted cart is malformed, starting empty");
                Cart::new()
            }
        }
    }

    /// Persist `cart`, dropping lines whose quantity is 0.
    ///
    /// Returns the cart as written.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn save(&self, cart: Cart) -> Result<Cart, CartError> {
        let cart = cart.without_empty_lines();
        let raw = serde_json::to_string(&cart)?;
        self.storage.set(CART_KEY, &raw)?;
        debug!(lines = cart.len(), "Persisted cart");
        Ok(cart)
    }
}
