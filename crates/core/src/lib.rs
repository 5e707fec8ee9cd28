//! PShowcase Core - Shared catalog and cart types.
//!
//! This crate provides the domain model used by the storefront:
//! - products and prices as returned by the remote catalog
//! - the cart and its quantity algebra
//! - the catalog projection (cart quantities merged onto products)
//! - the derived listing view (filter, sort, paginate)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage, no HTTP clients. Persistence and change notification live in the
//! storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, products and the cart
//! - [`catalog`] - Catalog with merged cart quantities and derived categories
//! - [`view`] - Filter/sort/paginate projection of a catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;
pub mod view;

pub use catalog::Catalog;
pub use types::*;
pub use view::{CatalogPage, CategoryFilter, PageLink, SortKey, ViewQuery};
