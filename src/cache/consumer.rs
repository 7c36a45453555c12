//! Flush consumer for executing flush plans.
//!
//! Consumes events from the queue and applies the resulting plan to the
//! transient store.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, instrument};
use uuid::Uuid;

use super::config::CacheConfig;
use super::events::EventQueue;
use super::planner::FlushPlan;
use super::store::TransientStore;

const METRIC_FLUSH_EVENT: &str = "vetrina_flush_event_total";
const METRIC_TRANSIENT_PURGE: &str = "vetrina_transient_purge_total";
const METRIC_FLUSH_CONSUME_SECONDS: &str = "vetrina_flush_consume_duration_seconds";

/// Flush consumer that processes events and keeps the transient store
/// consistent with published content.
///
/// Each consumption drains a batch from the queue, merges it into a
/// flush plan, and applies the plan (epoch bump first, then purges).
pub struct FlushConsumer {
    config: CacheConfig,
    store: Arc<TransientStore>,
    queue: Arc<EventQueue>,
}

impl FlushConsumer {
    /// Create a new flush consumer.
    pub fn new(config: CacheConfig, store: Arc<TransientStore>, queue: Arc<EventQueue>) -> Self {
        Self {
            config,
            store,
            queue,
        }
    }

    /// Consume pending events and apply the resulting plan.
    ///
    /// Returns whether anything was processed.
    #[instrument(skip(self))]
    pub fn consume(&self) -> bool {
        let consume_started_at = Instant::now();
        let events = self.queue.drain(self.config.consume_batch_limit);
        if events.is_empty() {
            return false;
        }

        let event_count = events.len();
        let event_ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        let plan = FlushPlan::from_events(events);

        info!(
            event_count,
            event_ids = ?event_ids,
            plan = %plan,
            "Flush consumption starting"
        );

        counter!(METRIC_FLUSH_EVENT).increment(plan.merged_events as u64);

        // Epoch first: entries already stored must not outlive a theme change
        // while the purge below runs.
        if plan.bump_display_epoch {
            let epoch = self.store.advance_display_epoch();
            info!(display_epoch = epoch, "Display epoch advanced");
        }

        let mut purged = 0;
        if plan.purge_all_entries {
            purged = self.store.clear();
        } else {
            for key in &plan.purge_keys {
                if self.store.delete(key) {
                    purged += 1;
                }
            }
        }
        if purged > 0 {
            counter!(METRIC_TRANSIENT_PURGE).increment(purged as u64);
        }

        info!(event_count, purged, "Flush consumption complete");

        histogram!(METRIC_FLUSH_CONSUME_SECONDS)
            .record(consume_started_at.elapsed().as_secs_f64());

        true
    }

    /// The queue this consumer drains.
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// The store this consumer purges.
    pub fn store(&self) -> &Arc<TransientStore> {
        &self.store
    }
}
