//! Vetrina transient cache.
//!
//! A single-layer transient store for recent-item lists:
//!
//! - **Store**: results cached per widget instance under an opaque key,
//!   expiring after a TTL, bounded by LRU eviction
//! - **Flush pipeline**: content-change events flow through a queue and a
//!   planner into purges; theme changes invalidate globally via a display
//!   epoch compared at read time
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `vetrina.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! transient_ttl_seconds = 43200
//! transient_capacity = 64
//! consume_batch_limit = 100
//! ```

mod config;
mod consumer;
mod events;
mod keys;
mod lock;
mod planner;
mod store;
mod trigger;

pub use config::CacheConfig;
pub use consumer::FlushConsumer;
pub use events::{ContentEvent, Epoch, EventKind, EventQueue};
pub use keys::TransientKey;
pub use planner::FlushPlan;
pub use store::{TransientEntry, TransientStore};
pub use trigger::FlushTrigger;
