//! # Catalog Configuration
//!
//! Catalog settings are read from environment variables:
//!
//! - `CATALOG_BASE_URL`: base URL the catalog JSON files are served from (required)
//! - `CATALOG_RESOURCES`: comma separated resource names
//!   (default: "schedules-majors,schedules-liberal-arts")
//! - `CATALOG_PAGE_SIZE`: number of search results per page (default: 100)
//! - `CATALOG_REQUEST_TIMEOUT_SECONDS`: HTTP timeout (default: 30)
//! - `LOG_LEVEL`: logging level (default: "info")

use std::env;
use std::time::Duration;

use eyre::{Result, WrapErr};
use timetable_core::search::DEFAULT_PAGE_SIZE;
use tracing::Level;

pub const DEFAULT_RESOURCES: [&str; 2] = ["schedules-majors", "schedules-liberal-arts"];

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog files, without a trailing resource name
    pub base_url: String,

    /// Resources merged into one catalog, in this order
    pub resources: Vec<String>,

    pub page_size: usize,

    pub log_level: Level,

    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl CatalogConfig {
    /// Loads the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails if `CATALOG_BASE_URL` is not set or `CATALOG_PAGE_SIZE` is not a
    /// positive number.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("CATALOG_BASE_URL")
            .wrap_err("CATALOG_BASE_URL environment variable must be set")?;

        let resources = env::var("CATALOG_RESOURCES")
            .ok()
            .map(|value| parse_resources(&value))
            .filter(|resources| !resources.is_empty())
            .unwrap_or_else(|| DEFAULT_RESOURCES.iter().map(|r| r.to_string()).collect());

        let page_size = env::var("CATALOG_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse::<usize>()
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| eyre::eyre!("CATALOG_PAGE_SIZE must be a positive number"))?;

        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        let request_timeout = env::var("CATALOG_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(Self {
            base_url,
            resources,
            page_size,
            log_level,
            request_timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

pub fn parse_resources(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_log_level(value: &str) -> Level {
    match value {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
