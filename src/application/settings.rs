//! Widget settings service.
//!
//! Sits between the admin form and the settings repository. Submitted
//! values arrive as raw strings and are sanitized here; stored records
//! are loaded leniently so a malformed document degrades to defaults
//! instead of failing the render.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::application::repos::{RepoError, SettingsRepo};
use crate::cache::{FlushTrigger, TransientKey};
use crate::domain::settings::WidgetSettings;
use crate::util::text::{coerce_count, sanitize_text};

const SOURCE: &str = "application::settings::WidgetSettingsService";

/// Raw form input for a settings save.
///
/// Every field is a string exactly as submitted; sanitization and
/// coercion happen in [`WidgetSettingsService::update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateSettingsCommand {
    pub title: String,
    pub count: String,
    pub category: String,
}

#[derive(Clone)]
pub struct WidgetSettingsService {
    repo: Arc<dyn SettingsRepo>,
    trigger: Arc<FlushTrigger>,
}

impl WidgetSettingsService {
    pub fn new(repo: Arc<dyn SettingsRepo>, trigger: Arc<FlushTrigger>) -> Self {
        Self { repo, trigger }
    }

    /// Load settings for an instance.
    ///
    /// Absent and malformed records both resolve to
    /// [`WidgetSettings::default`], so callers never see a load-shaped
    /// failure for bad data.
    pub async fn load(&self, instance: &str) -> Result<WidgetSettings, RepoError> {
        let Some(value) = self.repo.load_widget_settings(instance).await? else {
            return Ok(WidgetSettings::default());
        };

        match serde_json::from_value(value) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(
                    source_module = SOURCE,
                    instance,
                    error = %err,
                    "Stored widget settings are malformed, falling back to defaults"
                );
                Ok(WidgetSettings::default())
            }
        }
    }

    /// Sanitize submitted values, persist them, then flush the
    /// instance's transient so the next render reflects the new
    /// settings.
    #[instrument(skip(self, command))]
    pub async fn update(
        &self,
        instance: &str,
        command: UpdateSettingsCommand,
    ) -> Result<WidgetSettings, RepoError> {
        let settings = WidgetSettings {
            title: sanitize_text(&command.title),
            count: coerce_count(&command.count),
            category: sanitize_text(&command.category),
        };

        self.repo.upsert_widget_settings(instance, &settings).await?;
        self.trigger.settings_saved(&TransientKey::new(instance));

        info!(
            source_module = SOURCE,
            instance,
            count = settings.count,
            "Widget settings saved"
        );

        Ok(settings)
    }
}
