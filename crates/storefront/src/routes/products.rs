//! Product route handlers.

use std::fmt::Display;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pshowcase_core::{CategoryFilter, PageLink, Product, ProductId, SortKey, ViewQuery};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::state::AppState;
use crate::widgets::{ListingView, ProductDetail, ProductListing, StepperView, WidgetState};

/// Shown when the detail route carries an ID that does not parse.
pub const FALLBACK_PRODUCT_ID: ProductId = ProductId::new(1);

/// Listing query parameters.
///
/// Every field is optional; missing or unparsable values use the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

impl ListingParams {
    /// Build the view selection.
    #[must_use]
    pub fn to_query(&self, page_size: usize) -> ViewQuery {
        ViewQuery {
            category: self
                .category
                .as_deref()
                .map_or(CategoryFilter::All, CategoryFilter::from),
            sort: self.sort.as_deref().map_or(SortKey::Price, SortKey::parse),
            page: self
                .page
                .as_deref()
                .and_then(|page| page.trim().parse().ok())
                .unwrap_or(1),
            page_size,
        }
    }
}

/// A product card in the grid.
#[derive(Clone)]
pub struct ProductCard {
    pub product: Product,
    pub stepper: StepperView,
}

impl From<Product> for ProductCard {
    fn from(product: Product) -> Self {
        Self {
            stepper: StepperView::from_quantity(product.quantity),
            product,
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub categories: Vec<String>,
    pub category: String,
    pub sort: &'static str,
    pub cards: Vec<ProductCard>,
    pub page: u32,
    pub total_pages: u32,
    pub links: Vec<PageLink>,
    pub has_previous: bool,
    pub has_next: bool,
    pub cart_count: usize,
}

impl ProductsIndexTemplate {
    fn new(view: ListingView, cart_count: usize) -> Self {
        Self {
            category: view.query.category.as_str().to_string(),
            sort: view.query.sort.as_str(),
            links: view.page.links(),
            has_previous: view.page.has_previous(),
            has_next: view.page.has_next(),
            page: view.page.page,
            total_pages: view.page.total_pages,
            cards: view.page.items.into_iter().map(ProductCard::from).collect(),
            categories: view.categories,
            cart_count,
        }
    }

    /// Query string for a link to `page` with the current selection.
    #[must_use]
    pub fn page_href(&self, page: impl Display) -> String {
        format!(
            "/?category={}&sort={}&page={page}",
            url_encode(&self.category),
            self.sort
        )
    }

    /// Query string for a link to `category` with the current sort and page.
    #[must_use]
    pub fn category_href(&self, category: impl Display) -> String {
        format!(
            "/?category={}&sort={}&page={}",
            url_encode(&category.to_string()),
            self.sort,
            self.page
        )
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: Product,
    pub stepper: StepperView,
    pub cart_count: usize,
}

/// Catalog failure page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub message: String,
    pub cart_count: usize,
}

/// Display the product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Response, AppError> {
    let query = params.to_query(state.config().page_size);
    let listing = ProductListing::mount(query, state.catalog(), state.cart()).await?;
    let cart_count = state.badge().count().unwrap_or_default();

    let response = match listing.state() {
        WidgetState::Ready(view) => ProductsIndexTemplate::new(view, cart_count).into_response(),
        WidgetState::Failed(message) => unavailable(message, cart_count),
        WidgetState::Loading | WidgetState::Unmounted => {
            return Err(AppError::Internal("listing did not load".to_string()));
        }
    };
    Ok(response)
}

/// Display a product.
///
/// An ID that does not parse shows product 1 instead.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, AppError> {
    let id = id.parse::<ProductId>().unwrap_or_else(|e| {
        tracing::warn!(error = %e, fallback = %FALLBACK_PRODUCT_ID, "Invalid product ID");
        FALLBACK_PRODUCT_ID
    });

    let detail = ProductDetail::mount(id, state.catalog(), state.cart()).await?;
    let cart_count = state.badge().count().unwrap_or_default();

    match detail.state() {
        WidgetState::Ready(Some(product)) => Ok(ProductShowTemplate {
            stepper: StepperView::from_quantity(product.quantity),
            product,
            cart_count,
        }
        .into_response()),
        WidgetState::Ready(None) => Err(AppError::NotFound(format!("product {id}"))),
        WidgetState::Failed(message) => Ok(unavailable(message, cart_count)),
        WidgetState::Loading | WidgetState::Unmounted => {
            Err(AppError::Internal("product did not load".to_string()))
        }
    }
}

fn unavailable(message: String, cart_count: usize) -> Response {
    tracing::error!(%message, "Catalog unavailable");
    (
        StatusCode::BAD_GATEWAY,
        ErrorTemplate {
            message,
            cart_count,
        },
    )
        .into_response()
}

/// Percent-encode a query parameter value.
fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
