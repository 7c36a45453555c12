//! Widget capability surface.
//!
//! A widget exposes three capabilities to the host: rendering its admin
//! form, applying a settings submission, and rendering its front-end
//! markup. Implementors register with [`WidgetRegistry`] under a stable
//! slug and the host drives them through the trait object, so no
//! base-type inheritance is involved.

mod recent_posts;
mod registry;

pub use recent_posts::{RECENT_POSTS_SLUG, RecentPostsWidget};
pub use registry::WidgetRegistry;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::application::error::AppError;
use crate::domain::settings::WidgetSettings;

/// Raw field values from an admin form submission.
#[derive(Debug, Clone, Default)]
pub struct FieldValues(HashMap<String, String>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Value for `name`, or the empty string when the field was not
    /// submitted.
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Capabilities a widget exposes to the host.
///
/// One implementor serves every placed instance; the host passes the
/// opaque instance id with each call.
#[async_trait]
pub trait Widget: Send + Sync {
    /// Stable identifier the widget registers under.
    fn slug(&self) -> &'static str;

    /// Human-readable name for admin listings.
    fn name(&self) -> &'static str;

    /// One-line description for admin listings.
    fn description(&self) -> &'static str;

    /// Render the admin settings form for an instance.
    async fn form(&self, instance: &str) -> Result<String, AppError>;

    /// Apply a settings submission for an instance.
    async fn update(
        &self,
        instance: &str,
        fields: &FieldValues,
    ) -> Result<WidgetSettings, AppError>;

    /// Render the front-end markup for an instance.
    async fn render(&self, instance: &str) -> Result<String, AppError>;
}
