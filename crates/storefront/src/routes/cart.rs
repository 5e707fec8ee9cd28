//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation answers with an `HX-Trigger: cart-updated` header so the
//! badge and drawer fragments on the page refresh themselves.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{AppendHeaders, IntoResponse, Response},
};
use pshowcase_core::ProductId;
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::state::AppState;
use crate::widgets::{DrawerView, QuantityStepper, StepperView};

/// Header sent with every cart mutation.
pub const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart drawer fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_drawer.html")]
pub struct CartDrawerTemplate {
    pub drawer: DrawerView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

/// Quantity stepper fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/stepper.html")]
pub struct StepperTemplate {
    pub product_id: ProductId,
    pub stepper: StepperView,
}

/// Parse a product ID from a cart route.
///
/// Unlike the detail page, cart mutations never fall back to a default product.
fn parse_id(raw: &str) -> Result<ProductId, AppError> {
    raw.parse()
        .map_err(|e: pshowcase_core::ParseIdError| AppError::BadRequest(e.to_string()))
}

fn drawer_view(state: &AppState) -> Result<DrawerView, AppError> {
    state
        .drawer()
        .view()
        .ok_or_else(|| AppError::Internal("cart drawer is not mounted".to_string()))
}

/// Cart drawer fragment.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<CartDrawerTemplate, AppError> {
    Ok(CartDrawerTemplate {
        drawer: drawer_view(&state)?,
    })
}

/// Cart count badge fragment.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> CartCountTemplate {
    CartCountTemplate {
        count: state.badge().count().unwrap_or_default(),
    }
}

/// Add one unit (HTMX).
#[instrument(skip(state))]
pub async fn increment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    step(&state, &id, true).await
}

/// Remove one unit (HTMX).
#[instrument(skip(state))]
pub async fn decrement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    step(&state, &id, false).await
}

async fn step(state: &AppState, raw_id: &str, increment: bool) -> Result<Response, AppError> {
    let id = parse_id(raw_id)?;
    let product = state
        .catalog()
        .load_product(id)
        .await
        .map_err(AppError::from_catalog)?;

    let stepper = QuantityStepper::mount(product, state.cart()).await?;
    let view = if increment {
        stepper.increment().await?
    } else {
        stepper.decrement().await?
    };

    let id_label = id.to_string();
    add_breadcrumb(
        "cart",
        if increment { "Incremented quantity" } else { "Decremented quantity" },
        Some(&[("product_id", id_label.as_str())]),
    );

    Ok((
        AppendHeaders([CART_UPDATED]),
        StepperTemplate {
            product_id: id,
            stepper: view,
        },
    )
        .into_response())
}

/// Remove a line (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    state.drawer().remove(id).await?;

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartDrawerTemplate {
            drawer: drawer_view(&state)?,
        },
    )
        .into_response())
}
