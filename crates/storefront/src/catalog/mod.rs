//! Remote product catalog.
//!
//! # Architecture
//!
//! - [`CatalogClient`] talks to the REST catalog (`GET /products`,
//!   `GET /products/{id}`) with `reqwest`, retrying transient failures with
//!   exponential backoff.
//! - Responses are cached in memory via `moka` (5 minute TTL by default), so
//!   mounting a page does not always reach the remote endpoint.
//! - [`CatalogLoader`] merges the current cart into what the client returns.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = CatalogClient::new(&config.catalog)?;
//! let loader = CatalogLoader::new(client, cart.reader());
//!
//! let catalog = loader.load_catalog().await?;
//! let product = loader.load_product(ProductId::new(1)).await?;
//! ```

mod cache;
mod client;
mod loader;

pub use client::{CatalogClient, RetryPolicy};
pub use loader::CatalogLoader;

use thiserror::Error;

/// Errors that can occur when fetching from the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("catalog returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl CatalogError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder(),
            Self::Status { status, .. } => *status >= 500,
            Self::RateLimited(_) => true,
            Self::Parse(_) | Self::NotFound(_) => false,
        }
    }
}
