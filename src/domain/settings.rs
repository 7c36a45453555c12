//! Widget settings and their defaults.

use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNT: u32 = 3;

/// Per-instance settings for the recent-posts widget.
///
/// Persisted as JSON by the host's settings store. Missing fields fall
/// back to their defaults on load, so partially saved or legacy records
/// still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    /// Heading shown above the list; empty hides the title block.
    pub title: String,
    /// Maximum number of items to display.
    pub count: u32,
    /// Category slug filter; empty means any category.
    pub category: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            title: String::new(),
            count: DEFAULT_COUNT,
            category: String::new(),
        }
    }
}
