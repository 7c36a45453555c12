//! Recent posts widget.
//!
//! Wires the cached item provider, the settings service, and the two
//! templates into the widget capability trait. The transient cache key
//! for an instance is its opaque instance id.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::error::AppError;
use crate::application::provider::RecentItemsProvider;
use crate::application::repos::ContentRepo;
use crate::application::settings::{UpdateSettingsCommand, WidgetSettingsService};
use crate::cache::TransientKey;
use crate::domain::settings::WidgetSettings;
use crate::presentation::views::{
    CategoryOptionView, FormFieldView, ItemView, RecentPostsContext, RecentPostsTemplate,
    SettingsFormContext, SettingsFormTemplate, render_template,
};

use super::{FieldValues, Widget};

pub const RECENT_POSTS_SLUG: &str = "vetrina-recent-posts";

pub struct RecentPostsWidget {
    provider: RecentItemsProvider,
    settings: WidgetSettingsService,
    content: Arc<dyn ContentRepo>,
}

impl RecentPostsWidget {
    pub fn new(
        provider: RecentItemsProvider,
        settings: WidgetSettingsService,
        content: Arc<dyn ContentRepo>,
    ) -> Self {
        Self {
            provider,
            settings,
            content,
        }
    }

    fn field_id(instance: &str, field: &str) -> String {
        format!("widget-{RECENT_POSTS_SLUG}-{instance}-{field}")
    }

    fn field_name(instance: &str, field: &str) -> String {
        format!("widget-{RECENT_POSTS_SLUG}[{instance}][{field}]")
    }
}

#[async_trait]
impl Widget for RecentPostsWidget {
    fn slug(&self) -> &'static str {
        RECENT_POSTS_SLUG
    }

    fn name(&self) -> &'static str {
        "Recent Posts"
    }

    fn description(&self) -> &'static str {
        "Display recent posts in a widget area."
    }

    async fn form(&self, instance: &str) -> Result<String, AppError> {
        let settings = self.settings.load(instance).await?;
        let categories = self.content.list_categories().await?;

        let view = SettingsFormContext {
            title: FormFieldView {
                id: Self::field_id(instance, "title"),
                name: Self::field_name(instance, "title"),
                value: settings.title.clone(),
            },
            count: FormFieldView {
                id: Self::field_id(instance, "count"),
                name: Self::field_name(instance, "count"),
                value: settings.count.to_string(),
            },
            category: FormFieldView {
                id: Self::field_id(instance, "category"),
                name: Self::field_name(instance, "category"),
                value: settings.category.clone(),
            },
            categories: categories
                .into_iter()
                .map(|category| CategoryOptionView {
                    is_selected: category.slug == settings.category,
                    slug: category.slug,
                    name: category.name,
                })
                .collect(),
        };

        Ok(render_template(SettingsFormTemplate { view })?)
    }

    async fn update(
        &self,
        instance: &str,
        fields: &FieldValues,
    ) -> Result<WidgetSettings, AppError> {
        let command = UpdateSettingsCommand {
            title: fields.get("title").to_string(),
            count: fields.get("count").to_string(),
            category: fields.get("category").to_string(),
        };

        Ok(self.settings.update(instance, command).await?)
    }

    async fn render(&self, instance: &str) -> Result<String, AppError> {
        let settings = self.settings.load(instance).await?;
        let key = TransientKey::new(instance);
        let items = self
            .provider
            .fetch(&key, settings.count as usize, &settings.category)
            .await;

        let view = RecentPostsContext::new(
            &settings.title,
            items
                .into_iter()
                .map(|item| ItemView {
                    title: item.title,
                    excerpt: item.excerpt,
                    permalink: item.permalink,
                })
                .collect(),
        );

        Ok(render_template(RecentPostsTemplate { view })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_ids_are_prefixed_with_the_instance() {
        assert_eq!(
            RecentPostsWidget::field_id("w7", "title"),
            "widget-vetrina-recent-posts-w7-title"
        );
    }

    #[test]
    fn field_names_nest_instance_and_field() {
        assert_eq!(
            RecentPostsWidget::field_name("w7", "count"),
            "widget-vetrina-recent-posts[w7][count]"
        );
    }
}
