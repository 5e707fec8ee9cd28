//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                      - Product listing (?category=&sort=&page=)
//! GET  /product/{id}          - Product detail
//! GET  /health                - Health check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                  - Cart drawer fragment
//! GET  /cart/count            - Cart count badge fragment
//! POST /cart/{id}/increment   - Add one unit (returns stepper, triggers cart-updated)
//! POST /cart/{id}/decrement   - Remove one unit (returns stepper, triggers cart-updated)
//! POST /cart/{id}/remove      - Drop the line (returns drawer, triggers cart-updated)
//!
//! # JSON API
//! GET  /api/products          - Listing page
//! GET  /api/products/{id}     - Product with cart quantity
//! GET  /api/cart              - Drawer contents and badge count
//! ```

pub mod api;
pub mod cart;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/{id}/increment", post(cart::increment))
        .route("/{id}/decrement", post(cart::decrement))
        .route("/{id}/remove", post(cart::remove))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::products))
        .route("/products/{id}", get(api::product))
        .route("/cart", get(api::cart))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/product/{id}", get(products::show))
        .route("/health", get(health))
        .nest("/cart", cart_routes())
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
