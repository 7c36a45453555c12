//! Repository traits for host-managed state.
//!
//! The widget runtime does not own content or settings storage. These
//! traits describe the two collaborators it needs from the embedding
//! host: a read-only view of published content and a per-instance
//! settings record store. `crate::infra::memory` provides the in-memory
//! host used by the demo binary and the integration tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::items::{CategoryRecord, ItemRecord};
use crate::domain::settings::WidgetSettings;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("query timeout")]
    Timeout,
}

impl RepoError {
    /// Wrap a storage-level failure.
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Read-only access to published content.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// Fetch up to `limit` published items, newest first.
    ///
    /// `category` is a category slug filter; the empty string matches
    /// items in any category.
    async fn recent_published(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<ItemRecord>, RepoError>;

    /// List every category known to the host, sorted by name.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;
}

/// Per-instance widget settings persistence.
///
/// Records are stored as JSON documents keyed by the opaque instance id.
/// Loads return the raw value so callers can deserialize leniently and
/// fall back to defaults when a stored record is malformed.
#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn load_widget_settings(
        &self,
        instance: &str,
    ) -> Result<Option<serde_json::Value>, RepoError>;

    async fn upsert_widget_settings(
        &self,
        instance: &str,
        settings: &WidgetSettings,
    ) -> Result<(), RepoError>;
}
