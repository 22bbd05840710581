//! # Timetable Catalog
//!
//! Loading of the course catalog that feeds the search pipeline.
//!
//! - **Source**: the asynchronous data source trait and its HTTP implementation
//! - **Cache**: per-resource request coalescing over any source
//! - **Config**: environment based catalog settings

/// Coalescing catalog cache
pub mod cache;
/// Catalog configuration loaded from the environment
pub mod config;
/// Catalog error type
pub mod errors;
/// Catalog data sources
pub mod source;

pub use cache::CatalogCache;
pub use errors::CatalogError;
pub use source::{CatalogSource, HttpCatalogSource};
