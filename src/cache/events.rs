//! Flush event system.
//!
//! Defines content-change events and an in-memory queue for event-driven
//! transient invalidation.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::keys::TransientKey;
use super::lock::mutex_guard;

const SOURCE: &str = "cache::events";

/// Monotonic sequence number assigned to every flush event.
///
/// Each event gets a unique, monotonically increasing epoch number. The
/// same numbering feeds the store's display epoch for global invalidation.
pub type Epoch = u64;

/// Content-change event with idempotency and ordering support.
#[derive(Debug, Clone)]
pub struct ContentEvent {
    /// Random id, used to drop duplicates during planning.
    pub id: Uuid,
    /// Position in the process-wide sequence.
    pub epoch: Epoch,
    /// The type of change.
    pub kind: EventKind,
    /// Enqueue time, recorded for logs.
    pub timestamp: OffsetDateTime,
}

impl ContentEvent {
    /// Create a new event with the given kind and epoch.
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Types of change that flush transient entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    // Content
    /// A post was published; any recent-posts list may now be out of date.
    PostPublished { post_id: Uuid, slug: String },
    /// A post left the published set.
    PostDeleted { post_id: Uuid },

    // Display
    /// The active theme changed; cached markup is invalid everywhere.
    ThemeChanged,

    // Settings
    /// A widget instance's settings were saved.
    SettingsSaved { key: TransientKey },
}

/// In-memory event queue for transient invalidation.
///
/// Events are published by write paths and consumed by the flush consumer.
/// Contention is expected to be low, so a plain mutex guards the queue.
pub struct EventQueue {
    queue: Mutex<VecDeque<ContentEvent>>,
    epoch_counter: AtomicU64,
}

impl EventQueue {
    /// New queue with the epoch counter at zero.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
        }
    }

    /// Reserve the next epoch number.
    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Wrap `kind` in a new event and enqueue it, logging id and epoch.
    pub fn publish(&self, kind: EventKind) {
        let epoch = self.next_epoch();
        let event = ContentEvent::new(kind.clone(), epoch);

        info!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = ?kind,
            "Flush event enqueued"
        );

        mutex_guard(&self.queue, SOURCE, "publish").push_back(event);
    }

    /// Remove and return up to `limit` events, oldest first.
    pub fn drain(&self, limit: usize) -> Vec<ContentEvent> {
        let mut queue = mutex_guard(&self.queue, SOURCE, "drain");
        let count = limit.min(queue.len());
        queue.drain(..count).collect()
    }

    /// Number of events waiting.
    pub fn len(&self) -> usize {
        mutex_guard(&self.queue, SOURCE, "len").len()
    }

    /// True when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all pending events.
    pub fn clear(&self) {
        mutex_guard(&self.queue, SOURCE, "clear").clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn event_creation() {
        let kind = EventKind::ThemeChanged;
        let event = ContentEvent::new(kind.clone(), 42);

        assert_eq!(event.epoch, 42);
        assert_eq!(event.kind, kind);
        assert!(!event.id.is_nil());
    }

    #[test]
    fn epoch_monotonicity() {
        let queue = EventQueue::new();

        let e1 = queue.next_epoch();
        let e2 = queue.next_epoch();
        let e3 = queue.next_epoch();

        assert!(e1 < e2);
        assert!(e2 < e3);
    }

    #[test]
    fn publish_and_drain() {
        let queue = EventQueue::new();

        queue.publish(EventKind::ThemeChanged);
        queue.publish(EventKind::PostDeleted {
            post_id: Uuid::nil(),
        });
        queue.publish(EventKind::PostPublished {
            post_id: Uuid::nil(),
            slug: "hello".to_string(),
        });

        assert_eq!(queue.len(), 3);

        let events = queue.drain(2);
        assert_eq!(events.len(), 2);
        assert_eq!(queue.len(), 1);

        // Oldest events come out first.
        assert_eq!(events[0].kind, EventKind::ThemeChanged);
        assert_eq!(
            events[1].kind,
            EventKind::PostDeleted {
                post_id: Uuid::nil()
            }
        );
    }

    #[test]
    fn drain_more_than_available() {
        let queue = EventQueue::new();

        queue.publish(EventKind::ThemeChanged);

        let events = queue.drain(100);
        assert_eq!(events.len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_queue() {
        let queue = EventQueue::new();

        queue.publish(EventKind::ThemeChanged);
        queue.publish(EventKind::SettingsSaved {
            key: TransientKey::new("recent-posts-1"),
        });
        assert!(!queue.is_empty());

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn event_kind_equality() {
        let kind1 = EventKind::SettingsSaved {
            key: TransientKey::new("recent-posts-1"),
        };
        let kind2 = EventKind::SettingsSaved {
            key: TransientKey::new("recent-posts-1"),
        };
        let kind3 = EventKind::SettingsSaved {
            key: TransientKey::new("recent-posts-2"),
        };

        assert_eq!(kind1, kind2);
        assert_ne!(kind1, kind3);
    }

    #[test]
    fn event_queue_recovers_from_poisoned_lock() {
        let queue = EventQueue::new();

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = queue.queue.lock().expect("queue lock should be acquired");
            panic!("poison queue lock");
        }));

        queue.publish(EventKind::ThemeChanged);
        assert_eq!(queue.len(), 1);
    }
}
