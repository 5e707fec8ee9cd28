//! Catalog client behavior against a fake remote catalog.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use pshowcase_core::{ProductId, QuantityDelta};
use pshowcase_integration_tests::{FakeCatalog, loader, memory_cart, product, sample_products};
use pshowcase_storefront::catalog::CatalogError;

#[tokio::test]
async fn test_transient_503_is_retried() {
    let catalog = FakeCatalog::start_failing(sample_products(4), 1, StatusCode::SERVICE_UNAVAILABLE).await;
    let (_, cart) = memory_cart();

    let loaded = loader(&catalog, &cart).load_catalog().await.unwrap();

    assert_eq!(loaded.len(), 4);
    assert_eq!(catalog.hits(), 2);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let catalog = FakeCatalog::start_failing(sample_products(4), 10, StatusCode::BAD_GATEWAY).await;
    let (_, cart) = memory_cart();

    let err = loader(&catalog, &cart).load_catalog().await.unwrap_err();

    assert!(matches!(err, CatalogError::Status { status: 502, .. }));
    assert_eq!(catalog.hits(), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let catalog = FakeCatalog::start_failing(sample_products(4), 10, StatusCode::BAD_REQUEST).await;
    let (_, cart) = memory_cart();

    let err = loader(&catalog, &cart).load_catalog().await.unwrap_err();

    assert!(matches!(err, CatalogError::Status { status: 400, .. }));
    assert_eq!(catalog.hits(), 1);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let catalog = FakeCatalog::start_failing(sample_products(2), 1, StatusCode::TOO_MANY_REQUESTS).await;
    let (_, cart) = memory_cart();

    let loaded = loader(&catalog, &cart).load_catalog().await.unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(catalog.hits(), 2);
}

#[tokio::test]
async fn test_catalog_is_cached() {
    let catalog = FakeCatalog::start(sample_products(3)).await;
    let (_, cart) = memory_cart();
    let loader = loader(&catalog, &cart);

    loader.load_catalog().await.unwrap();
    loader.load_catalog().await.unwrap();
    // The list fetch also caches each product.
    loader.load_product(ProductId::new(2)).await.unwrap();

    assert_eq!(catalog.hits(), 1);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let catalog = FakeCatalog::start(sample_products(3)).await;
    let (_, cart) = memory_cart();

    let err = loader(&catalog, &cart)
        .load_product(ProductId::new(99))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn test_cart_quantities_are_merged() {
    let products = vec![
        product(1, 1000, "a", 4.0),
        product(2, 500, "b", 3.0),
    ];
    let catalog = FakeCatalog::start(products.clone()).await;
    let (_, cart) = memory_cart();
    cart.adjust(&products[1], QuantityDelta::Increment).await.unwrap();
    cart.adjust(&products[1], QuantityDelta::Increment).await.unwrap();
    let loader = loader(&catalog, &cart);

    let loaded = loader.load_catalog().await.unwrap();
    assert_eq!(loaded.get(ProductId::new(1)).unwrap().quantity, 0);
    assert_eq!(loaded.get(ProductId::new(2)).unwrap().quantity, 2);
    assert_eq!(loaded.categories(), ["a".to_string(), "b".to_string()]);

    let detail = loader.load_product(ProductId::new(2)).await.unwrap();
    assert_eq!(detail.quantity, 2);
}
