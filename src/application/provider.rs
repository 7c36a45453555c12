//! Cached recent-items provider.

use std::sync::Arc;

use metrics::counter;
use tracing::{instrument, warn};

use crate::application::repos::ContentRepo;
use crate::cache::{CacheConfig, TransientKey, TransientStore};
use crate::domain::items::ItemRecord;

const SOURCE: &str = "application::provider::RecentItemsProvider";

const METRIC_RECENT_QUERY: &str = "vetrina_recent_query_total";
const METRIC_RECENT_QUERY_FAILURE: &str = "vetrina_recent_query_failure_total";

/// Read-through provider for recent published items.
///
/// Each widget instance caches its last successful query result in the
/// transient store. A failed content query is served as an empty list
/// and never cached, so the next call hits the repository again.
#[derive(Clone)]
pub struct RecentItemsProvider {
    content: Arc<dyn ContentRepo>,
    store: Arc<TransientStore>,
    cache_enabled: bool,
}

impl RecentItemsProvider {
    pub fn new(
        content: Arc<dyn ContentRepo>,
        store: Arc<TransientStore>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            content,
            store,
            cache_enabled: config.is_enabled(),
        }
    }

    /// Fetch up to `count` recent items for the instance behind `key`.
    ///
    /// Returns at most `count` items even when a cached entry was stored
    /// under an older, larger count. `count == 0` short-circuits without
    /// touching the repository or the store.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn fetch(&self, key: &TransientKey, count: usize, category: &str) -> Vec<ItemRecord> {
        if count == 0 {
            return Vec::new();
        }

        if self.cache_enabled
            && let Some(mut items) = self.store.get(key)
        {
            items.truncate(count);
            return items;
        }

        counter!(METRIC_RECENT_QUERY).increment(1);
        match self.content.recent_published(category, count).await {
            Ok(items) => {
                if self.cache_enabled {
                    self.store.set(key.clone(), items.clone());
                }
                let mut items = items;
                items.truncate(count);
                items
            }
            Err(err) => {
                counter!(METRIC_RECENT_QUERY_FAILURE).increment(1);
                warn!(
                    source_module = SOURCE,
                    key = %key,
                    category,
                    error = %err,
                    "Recent items query failed, serving an empty uncached list"
                );
                Vec::new()
            }
        }
    }

    /// Drop the cached entry for `key`, forcing a fresh query next fetch.
    pub fn invalidate(&self, key: &TransientKey) -> bool {
        self.store.delete(key)
    }

    pub fn store(&self) -> &Arc<TransientStore> {
        &self.store
    }
}
