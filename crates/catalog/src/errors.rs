use thiserror::Error;

/// Failure to load a catalog resource.
///
/// Always distinct from an empty result so callers can tell "no matches"
/// from "fetch failed".
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Request for catalog resource failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog resource {resource} returned status {status}")]
    Status { resource: String, status: u16 },

    #[error("Catalog resource {resource} is malformed: {source}")]
    Malformed {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Catalog source error: {0}")]
    Source(#[from] eyre::Report),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
