//! JSON API handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use pshowcase_core::{Product, ProductId};
use serde::Serialize;
use tracing::instrument;

use super::products::ListingParams;
use crate::error::AppError;
use crate::state::AppState;
use crate::widgets::{DrawerView, ListingView, ProductListing, WidgetState};

/// Cart summary returned by `GET /api/cart`.
#[derive(Debug, Serialize)]
pub struct CartSummary {
    /// Number of distinct lines.
    pub count: usize,
    #[serde(flatten)]
    pub drawer: DrawerView,
}

/// Listing page as JSON.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ListingView>, AppError> {
    let query = params.to_query(state.config().page_size);
    let listing = ProductListing::mount(query, state.catalog(), state.cart()).await?;

    match listing.state() {
        WidgetState::Ready(view) => Ok(Json(view)),
        WidgetState::Failed(message) => Err(AppError::Unavailable(message)),
        WidgetState::Loading | WidgetState::Unmounted => {
            Err(AppError::Internal("listing did not load".to_string()))
        }
    }
}

/// One product with its cart quantity.
#[instrument(skip(state))]
pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id: ProductId = id
        .parse()
        .map_err(|e: pshowcase_core::ParseIdError| AppError::BadRequest(e.to_string()))?;

    state
        .catalog()
        .load_product(id)
        .await
        .map(Json)
        .map_err(AppError::from_catalog)
}

/// The drawer contents and badge count.
#[instrument(skip(state))]
pub async fn cart(State(state): State<AppState>) -> Result<Json<CartSummary>, AppError> {
    let drawer = state
        .drawer()
        .view()
        .ok_or_else(|| AppError::Internal("cart drawer is not mounted".to_string()))?;

    Ok(Json(CartSummary {
        count: state.badge().count().unwrap_or_default(),
        drawer,
    }))
}
