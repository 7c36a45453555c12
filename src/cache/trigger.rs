//! Flush trigger service.
//!
//! High-level entry point for publishing flush events, with optional
//! immediate consumption.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::config::CacheConfig;
use super::consumer::FlushConsumer;
use super::events::{EventKind, EventQueue};
use super::keys::TransientKey;

/// Flush trigger for publishing content-change events.
///
/// Wraps the event queue and consumer behind convenience methods so write
/// paths can invalidate transients without touching either directly.
///
/// ```ignore
/// // After a successful settings save:
/// trigger.settings_saved(&key);
/// ```
pub struct FlushTrigger {
    config: CacheConfig,
    queue: Arc<EventQueue>,
    consumer: Arc<FlushConsumer>,
}

impl FlushTrigger {
    /// Create a new flush trigger.
    pub fn new(config: CacheConfig, queue: Arc<EventQueue>, consumer: Arc<FlushConsumer>) -> Self {
        Self {
            config,
            queue,
            consumer,
        }
    }

    /// Publish one event, running the consumer right away when
    /// `consume_now` is set. Otherwise events sit in the queue until the
    /// next explicit consumption.
    pub fn trigger(&self, kind: EventKind, consume_now: bool) {
        if !self.config.is_enabled() {
            debug!(event_kind = ?kind, "Flush trigger skipped: cache disabled");
            return;
        }

        self.queue.publish(kind);

        if consume_now {
            self.consumer.consume();
        }
    }

    /// Trigger a post publish event (content created).
    pub fn post_published(&self, post_id: Uuid, slug: &str) {
        self.trigger(
            EventKind::PostPublished {
                post_id,
                slug: slug.to_string(),
            },
            true,
        );
    }

    /// Trigger a post delete event (content removed).
    pub fn post_deleted(&self, post_id: Uuid) {
        self.trigger(EventKind::PostDeleted { post_id }, true);
    }

    /// Trigger a theme change event (global invalidation).
    pub fn theme_changed(&self) {
        self.trigger(EventKind::ThemeChanged, true);
    }

    /// Trigger a settings save event for one widget instance.
    pub fn settings_saved(&self, key: &TransientKey) {
        self.trigger(EventKind::SettingsSaved { key: key.clone() }, true);
    }

    /// The cache configuration this trigger consults.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The queue events are published to.
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// The consumer run on `consume_now`.
    pub fn consumer(&self) -> &Arc<FlushConsumer> {
        &self.consumer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::TransientStore;

    fn create_trigger() -> FlushTrigger {
        let config = CacheConfig::default();
        let store = Arc::new(TransientStore::new(&config));
        let queue = Arc::new(EventQueue::new());
        let consumer = Arc::new(FlushConsumer::new(config.clone(), store, queue.clone()));

        FlushTrigger::new(config, queue, consumer)
    }

    fn create_disabled_trigger() -> FlushTrigger {
        let config = CacheConfig {
            enabled: false,
            ..Default::default()
        };
        let store = Arc::new(TransientStore::new(&config));
        let queue = Arc::new(EventQueue::new());
        let consumer = Arc::new(FlushConsumer::new(config.clone(), store, queue.clone()));

        FlushTrigger::new(config, queue, consumer)
    }

    #[test]
    fn trigger_publishes_event() {
        let trigger = create_trigger();

        assert!(trigger.queue.is_empty());

        trigger.trigger(EventKind::ThemeChanged, false);

        // Not consumed since consume_now was false
        assert_eq!(trigger.queue.len(), 1);
    }

    #[test]
    fn trigger_respects_disabled_config() {
        let trigger = create_disabled_trigger();

        trigger.post_published(Uuid::nil(), "hello");

        // No events should be published when the cache is disabled
        assert!(trigger.queue.is_empty());
    }

    #[test]
    fn trigger_consumes_immediately_when_requested() {
        let trigger = create_trigger();

        trigger.theme_changed();

        // Published and consumed in one call
        assert!(trigger.queue.is_empty());
    }

    #[test]
    fn convenience_methods_work() {
        let trigger = create_trigger();

        trigger.post_published(Uuid::nil(), "post-slug");
        trigger.post_deleted(Uuid::nil());
        trigger.theme_changed();
        trigger.settings_saved(&TransientKey::new("recent-posts-1"));

        // Every convenience method consumes its own event
        assert!(trigger.queue.is_empty());
    }
}
