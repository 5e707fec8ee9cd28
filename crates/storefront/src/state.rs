//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::{CartError, CartHandle, CartService, CartStore};
use crate::catalog::{CatalogClient, CatalogError, CatalogLoader};
use crate::config::StorefrontConfig;
use crate::session;
use crate::storage::{FileStore, KeyValueStore, StorageError};
use crate::widgets::{CartBadge, CartDrawer, Mounted};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("catalog client error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("cart error: {0}")]
    Cart(#[from] CartError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The header badge and the cart
/// drawer stay mounted for the lifetime of the state; listing, detail and
/// stepper widgets are mounted per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    user_id: u32,
    cart: CartHandle,
    catalog: CatalogLoader,
    badge: Mounted<CartBadge>,
    drawer: Mounted<CartDrawer>,
}

impl AppState {
    /// Open the storage file and build the state on top of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file cannot be opened or written, or
    /// the catalog client cannot be built.
    pub async fn initialize(config: StorefrontConfig) -> Result<Self, StateError> {
        let storage = FileStore::open(&config.storage_path)?;
        tracing::info!(path = %storage.path().display(), "Storage opened");
        Self::with_storage(config, Arc::new(storage)).await
    }

    /// Build the state on an arbitrary store.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the session ID cannot be written or the catalog
    /// client cannot be built.
    pub async fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, StateError> {
        let user_id = session::start_session(storage.as_ref())?;

        let cart = CartService::spawn(CartStore::new(storage));
        let client = CatalogClient::new(&config.catalog)?;
        let catalog = CatalogLoader::new(client, cart.reader());

        let badge = CartBadge::mount(&cart).await?;
        let drawer = CartDrawer::mount(&cart).await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                user_id,
                cart,
                catalog,
                badge,
                drawer,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The anonymous session ID written at startup.
    #[must_use]
    pub fn user_id(&self) -> u32 {
        self.inner.user_id
    }

    #[must_use]
    pub fn cart(&self) -> &CartHandle {
        &self.inner.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogLoader {
        &self.inner.catalog
    }

    #[must_use]
    pub fn badge(&self) -> &CartBadge {
        &self.inner.badge
    }

    #[must_use]
    pub fn drawer(&self) -> &CartDrawer {
        &self.inner.drawer
    }
}
