//! Remote catalog integration module
//!
//! Provides typed access to the PokeAPI catalog service: record lookup by
//! name or number, and the full name index used to populate the UI.

pub mod catalog;

pub use catalog::{CatalogClient, CatalogError, CatalogQuery, CatalogRecord};
