//! Flush plan generation.
//!
//! Merges queued content events into a single execution plan.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::events::{ContentEvent, Epoch, EventKind};
use super::keys::TransientKey;

/// Actions to execute against the transient store.
///
/// The planner merges multiple events into a single plan, deduplicating by
/// event id and collapsing overlapping work: a content change already purges
/// every entry, so per-key purges are dropped when it is present.
#[derive(Debug, Default, PartialEq)]
pub struct FlushPlan {
    /// Number of distinct events merged into this plan.
    pub merged_events: usize,
    /// Highest event epoch seen while merging.
    pub epoch: Epoch,
    /// Advance the display epoch (theme changed: every entry goes stale).
    pub bump_display_epoch: bool,
    /// Purge every stored entry (content changed: any list may be affected).
    pub purge_all_entries: bool,
    /// Individual keys to purge (settings saves). Empty when
    /// `purge_all_entries` is set.
    pub purge_keys: BTreeSet<TransientKey>,
}

impl fmt::Display for FlushPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FlushPlan {{ events: {}, epoch: {}, bump_epoch: {}, purge_all: {}, purge_keys: {} }}",
            self.merged_events,
            self.epoch,
            self.bump_display_epoch,
            self.purge_all_entries,
            self.purge_keys.len(),
        )
    }
}

impl FlushPlan {
    /// Merge multiple events into a flush plan.
    ///
    /// Duplicate event ids collapse to one, the highest epoch is kept for
    /// logging, and a purge-all subsumes individual key purges.
    pub fn from_events(events: Vec<ContentEvent>) -> Self {
        let mut plan = Self::default();
        let mut seen_ids = HashSet::new();

        // A redelivered event id contributes nothing new
        let events: Vec<_> = events
            .into_iter()
            .filter(|e| seen_ids.insert(e.id))
            .collect();

        plan.merged_events = events.len();

        for event in events {
            plan.epoch = plan.epoch.max(event.epoch);
            match &event.kind {
                EventKind::PostPublished { .. } | EventKind::PostDeleted { .. } => {
                    plan.purge_all_entries = true;
                }
                EventKind::ThemeChanged => {
                    plan.bump_display_epoch = true;
                }
                EventKind::SettingsSaved { key } => {
                    plan.purge_keys.insert(key.clone());
                }
            }
        }

        if plan.purge_all_entries {
            plan.purge_keys.clear();
        }

        plan
    }

    /// True when the plan would change nothing.
    pub fn is_empty(&self) -> bool {
        !self.bump_display_epoch && !self.purge_all_entries && self.purge_keys.is_empty()
    }
}
