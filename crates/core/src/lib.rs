//! Casualwear Core - Shared domain library.
//!
//! This crate provides the types and pure logic used by every Casualwear
//! component:
//! - `storefront` - Public-facing web storefront
//! - `cli` - Command-line tools for inspecting the remote catalog
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices
//! - [`product`] - Catalog product record
//! - [`cart`] - Shopping cart store
//! - [`filter`] - Filter criteria and facet derivation
//! - [`listing`] - Sorting and pagination of filtered listings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod filter;
pub mod listing;
pub mod product;
pub mod types;

pub use cart::{Cart, CartItem, MAX_QUANTITY};
pub use filter::{Facets, FilterCriteria, PriceRange};
pub use listing::{Page, SortOrder};
pub use product::Product;
pub use types::*;
