//! # Catalog Cache
//!
//! Coalesces catalog fetches: at most one fetch per resource is in flight no
//! matter how many callers ask for it, and a successful result is kept for
//! the lifetime of the cache. The cache is an explicit object; construct one
//! per session and hand clones to every consumer.
//!
//! Every fetch runs on its own task, so a caller that gives up waiting does
//! not stop it; the result still lands in the cache. Failed fetches are not
//! cached. Callers waiting on a fetch that fails see the next one of them
//! retry it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use eyre::eyre;
use timetable_core::models::Lecture;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{CatalogError, CatalogResult};
use crate::source::CatalogSource;

pub type CatalogData = Arc<Vec<Lecture>>;

type Slot = Arc<OnceCell<CatalogData>>;

struct CacheInner {
    source: Arc<dyn CatalogSource>,
    slots: Mutex<HashMap<String, Slot>>,
}

#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<CacheInner>,
}

impl CatalogCache {
    pub fn new(source: impl CatalogSource + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    pub fn from_shared(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn slot(&self, resource: &str) -> Slot {
        let mut slots = self
            .inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(resource.to_string()).or_default())
    }

    /// Starts loading `resource` on a detached task.
    ///
    /// Dropping the returned handle does not cancel the fetch. Tasks spawned
    /// for the same resource wait on one shared slot, so only one of them
    /// reaches the source at a time.
    fn spawn_fetch(&self, resource: &str) -> JoinHandle<CatalogResult<CatalogData>> {
        let slot = self.slot(resource);
        let source = Arc::clone(&self.inner.source);
        let resource = resource.to_string();
        tokio::spawn(async move {
            slot.get_or_try_init(|| async {
                info!("Loading catalog resource {}", resource);
                match source.fetch(&resource).await {
                    Ok(lectures) => Ok(Arc::new(lectures)),
                    Err(err) => {
                        warn!("Loading catalog resource {} failed: {}", resource, err);
                        Err(err)
                    }
                }
            })
            .await
            .map(Arc::clone)
        })
    }

    async fn join(handle: JoinHandle<CatalogResult<CatalogData>>) -> CatalogResult<CatalogData> {
        handle
            .await
            .map_err(|err| CatalogError::Source(eyre!("Catalog task failed: {}", err)))?
    }

    /// Returns the lectures of `resource`, fetching them on first use.
    ///
    /// Concurrent callers for the same resource share one fetch.
    ///
    /// # Errors
    ///
    /// Returns the source's error when the fetch fails. Nothing is cached in
    /// that case and the next call fetches again.
    pub async fn fetch(&self, resource: &str) -> CatalogResult<CatalogData> {
        if let Some(data) = self.slot(resource).get() {
            debug!("Catalog resource {} served from cache", resource);
            return Ok(Arc::clone(data));
        }
        Self::join(self.spawn_fetch(resource)).await
    }

    /// Whether `resource` has been fetched successfully
    pub fn is_cached(&self, resource: &str) -> bool {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource)
            .is_some_and(|slot| slot.initialized())
    }

    /// Fetches every resource concurrently and concatenates them in the
    /// given order.
    ///
    /// # Errors
    ///
    /// Returns the first error in resource order. Fetches of the other
    /// resources keep running and are cached when they succeed.
    pub async fn load_all(&self, resources: &[String]) -> CatalogResult<CatalogData> {
        let handles: Vec<_> = resources
            .iter()
            .map(|resource| self.spawn_fetch(resource))
            .collect();

        let mut lectures = Vec::new();
        for handle in handles {
            let part = Self::join(handle).await?;
            lectures.extend(part.iter().cloned());
        }
        info!(
            "Loaded {} lectures from {} catalog resources",
            lectures.len(),
            resources.len()
        );
        Ok(Arc::new(lectures))
    }
}
