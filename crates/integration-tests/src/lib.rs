//! Integration tests for PShowcase.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pshowcase-integration-tests
//! ```
//!
//! Nothing external is needed: every test starts a [`FakeCatalog`] on an
//! ephemeral port and points the storefront at it.
//!
//! # Test Categories
//!
//! - `catalog_client` - Retry, caching and not-found handling
//! - `widget_sync` - Widgets observing one cart
//! - `storefront_routes` - HTTP routes end to end

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use pshowcase_core::{Price, Product, ProductId, Rating};
use pshowcase_storefront::cart::{CartHandle, CartService, CartStore};
use pshowcase_storefront::catalog::{CatalogClient, CatalogLoader};
use pshowcase_storefront::config::StorefrontConfig;
use pshowcase_storefront::state::AppState;
use pshowcase_storefront::storage::{KeyValueStore, MemoryStore};
use tokio::net::TcpListener;

/// Build a product the way the remote catalog would return it.
#[must_use]
pub fn product(id: i32, cents: i64, category: &str, rate: f64) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Price::from_cents(cents),
        description: format!("Description of product {id}"),
        category: category.to_string(),
        image: format!("https://img.example/{id}.jpg"),
        rating: Rating { rate, count: 10 },
        quantity: 0,
    }
}

/// `count` products cycling through three categories.
#[must_use]
pub fn sample_products(count: i32) -> Vec<Product> {
    let categories = ["electronics", "jewelery", "men's clothing"];
    (1..=count)
        .map(|id| {
            let category = categories
                .get(usize::try_from(id).unwrap_or(0) % categories.len())
                .copied()
                .unwrap_or("electronics");
            product(id, i64::from(id) * 150, category, f64::from(id % 5))
        })
        .collect()
}

struct FakeCatalogState {
    products: Vec<Product>,
    failures: AtomicU32,
    failure_status: StatusCode,
    hits: AtomicUsize,
}

impl FakeCatalogState {
    /// Count the hit and report whether it should fail.
    fn should_fail(&self) -> bool {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// A stand-in for the remote catalog.
///
/// Unknown product IDs get an empty 200 response.
pub struct FakeCatalog {
    addr: SocketAddr,
    state: Arc<FakeCatalogState>,
}

impl FakeCatalog {
    /// Serve `products` with no injected failures.
    pub async fn start(products: Vec<Product>) -> Self {
        Self::start_failing(products, 0, StatusCode::SERVICE_UNAVAILABLE).await
    }

    /// Serve `products`, answering the first `failures` requests with `status`.
    pub async fn start_failing(products: Vec<Product>, failures: u32, status: StatusCode) -> Self {
        let state = Arc::new(FakeCatalogState {
            products,
            failures: AtomicU32::new(failures),
            failure_status: status,
            hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .with_state(state.clone());

        let addr = serve(app).await;
        Self { addr, state }
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far, failed ones included.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Fail the next `count` requests.
    pub fn fail_next(&self, count: u32) {
        self.state.failures.store(count, Ordering::SeqCst);
    }
}

async fn list_products(State(state): State<Arc<FakeCatalogState>>) -> Response {
    if state.should_fail() {
        return state.failure_status.into_response();
    }
    Json(state.products.clone()).into_response()
}

async fn get_product(
    State(state): State<Arc<FakeCatalogState>>,
    Path(id): Path<i32>,
) -> Response {
    if state.should_fail() {
        return state.failure_status.into_response();
    }
    state
        .products
        .iter()
        .find(|product| product.id == ProductId::new(id))
        .map_or_else(|| StatusCode::OK.into_response(), |product| Json(product.clone()).into_response())
}

/// Serve `app` on an ephemeral local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });
    addr
}

/// Storefront configuration pointing at `catalog_url` with fast retries.
#[must_use]
pub fn config(catalog_url: &str, extra: &[(&str, &str)]) -> StorefrontConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("CATALOG_BASE_URL".to_string(), catalog_url.to_string()),
        ("CATALOG_MAX_ATTEMPTS".to_string(), "3".to_string()),
        ("CATALOG_RETRY_BASE_MS".to_string(), "5".to_string()),
        ("CATALOG_TIMEOUT_SECS".to_string(), "5".to_string()),
    ]);
    for (key, value) in extra {
        vars.insert((*key).to_string(), (*value).to_string());
    }
    StorefrontConfig::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config")
}

/// A cart service on fresh in-memory storage.
#[must_use]
pub fn memory_cart() -> (Arc<MemoryStore>, CartHandle) {
    let storage = Arc::new(MemoryStore::new());
    let cart = CartService::spawn(CartStore::new(storage.clone()));
    (storage, cart)
}

/// A catalog loader for `catalog` merging from `cart`.
#[must_use]
pub fn loader(catalog: &FakeCatalog, cart: &CartHandle) -> CatalogLoader {
    let config = config(&catalog.url(), &[]);
    let client = CatalogClient::new(&config.catalog).expect("Failed to build catalog client");
    CatalogLoader::new(client, cart.reader())
}

/// A running storefront backed by a fake catalog.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
    pub state: AppState,
    pub storage: Arc<dyn KeyValueStore>,
    pub catalog: FakeCatalog,
}

impl TestContext {
    /// Start a storefront on in-memory storage.
    pub async fn new(catalog: FakeCatalog) -> Self {
        Self::with_storage(catalog, Arc::new(MemoryStore::new())).await
    }

    /// Start a storefront on the given storage.
    pub async fn with_storage(catalog: FakeCatalog, storage: Arc<dyn KeyValueStore>) -> Self {
        let state = AppState::with_storage(config(&catalog.url(), &[]), storage.clone())
            .await
            .expect("Failed to build application state");
        let addr = serve(pshowcase_storefront::app(state.clone())).await;

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            state,
            storage,
            catalog,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .send()
            .await
            .expect("POST request failed")
    }
}
