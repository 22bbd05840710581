use std::time::Duration;

use async_trait::async_trait;
use timetable_core::models::Lecture;
use tracing::{debug, info};

use crate::errors::{CatalogError, CatalogResult};

/// An asynchronous provider of catalog resources, e.g. `"schedules-majors"`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, resource: &str) -> CatalogResult<Vec<Lecture>>;
}

/// Fetches `<base_url>/<resource>.json` over HTTP
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CatalogResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}.json", self.base_url, resource)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self, resource: &str) -> CatalogResult<Vec<Lecture>> {
        let url = self.resource_url(resource);
        info!("Fetching catalog resource {} from {}", resource, url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status {
                resource: resource.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        let lectures: Vec<Lecture> =
            serde_json::from_slice(&body).map_err(|source| CatalogError::Malformed {
                resource: resource.to_string(),
                source,
            })?;

        debug!("Catalog resource {} has {} lectures", resource, lectures.len());
        Ok(lectures)
    }
}
