use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use time::{Duration, OffsetDateTime};
use url::Url;
use uuid::Uuid;
use vetrina::application::provider::RecentItemsProvider;
use vetrina::application::repos::{ContentRepo, RepoError};
use vetrina::cache::{
    CacheConfig, EventQueue, FlushConsumer, FlushTrigger, TransientKey, TransientStore,
};
use vetrina::domain::items::{CategoryRecord, ItemRecord};
use vetrina::infra::memory::MemoryHost;

fn sample_item(title: &str) -> ItemRecord {
    ItemRecord {
        id: Uuid::new_v4(),
        title: title.to_string(),
        excerpt: "".to_string(),
        permalink: "http://cms.test/metrics-post".to_string(),
        category: "".to_string(),
        published_at: OffsetDateTime::now_utc(),
    }
}

struct OfflineContent;

#[async_trait]
impl ContentRepo for OfflineContent {
    async fn recent_published(
        &self,
        _category: &str,
        _limit: usize,
    ) -> Result<Vec<ItemRecord>, RepoError> {
        Err(RepoError::from_persistence("content store offline"))
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn cache_and_flush_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let config = CacheConfig::default();
    let store = Arc::new(TransientStore::new(&config));
    let queue = Arc::new(EventQueue::new());
    let consumer = Arc::new(FlushConsumer::new(
        config.clone(),
        Arc::clone(&store),
        Arc::clone(&queue),
    ));
    let trigger = FlushTrigger::new(config.clone(), queue, consumer);

    // Transient store, hit, and every miss reason
    let key = TransientKey::new("metrics-w1");
    assert!(store.get(&key).is_none());
    store.set(key.clone(), vec![sample_item("Metrics Post")]);
    assert!(store.get(&key).is_some());
    store.set_at(
        key.clone(),
        vec![sample_item("Metrics Post")],
        OffsetDateTime::now_utc() - Duration::hours(13),
    );
    assert!(store.get(&key).is_none());

    // Targeted purge through the flush pipeline (event + purge + duration)
    store.set(key.clone(), vec![sample_item("Metrics Post")]);
    trigger.settings_saved(&key);
    assert!(store.get(&key).is_none());

    // Theme flush leaves the entry in place but reading it back is a stale miss
    store.set(key.clone(), vec![sample_item("Metrics Post")]);
    trigger.theme_changed();
    assert!(store.get(&key).is_none());

    // Provider query counters, success then failure
    let host: Arc<dyn ContentRepo> = Arc::new(MemoryHost::with_sample_content(
        Url::parse("http://cms.test/").expect("valid base url"),
    ));
    let provider = RecentItemsProvider::new(host, Arc::clone(&store), &config);
    let fetched = provider.fetch(&TransientKey::new("metrics-w2"), 3, "").await;
    assert!(!fetched.is_empty());

    let offline: Arc<dyn ContentRepo> = Arc::new(OfflineContent);
    let failing = RecentItemsProvider::new(offline, Arc::clone(&store), &config);
    let fallback = failing.fetch(&TransientKey::new("metrics-w3"), 3, "").await;
    assert!(fallback.is_empty());

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "vetrina_transient_hit_total",
        "vetrina_transient_miss_total",
        "vetrina_transient_store_total",
        "vetrina_transient_purge_total",
        "vetrina_flush_event_total",
        "vetrina_flush_consume_duration_seconds",
        "vetrina_recent_query_total",
        "vetrina_recent_query_failure_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
