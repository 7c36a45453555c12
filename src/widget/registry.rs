//! Widget registry.
//!
//! Hosts register widget implementations by slug and resolve them when
//! driving a render or an admin action.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use super::Widget;

const SOURCE: &str = "widget::registry::WidgetRegistry";

pub struct WidgetRegistry {
    widgets: RwLock<HashMap<&'static str, Arc<dyn Widget>>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self {
            widgets: RwLock::new(HashMap::new()),
        }
    }

    /// Register a widget under its slug, replacing any previous
    /// registration for the same slug.
    pub fn register(&self, widget: Arc<dyn Widget>) {
        let slug = widget.slug();
        info!(source_module = SOURCE, widget = slug, "Widget registered");
        self.widgets.write().unwrap().insert(slug, widget);
    }

    pub fn get(&self, slug: &str) -> Option<Arc<dyn Widget>> {
        self.widgets.read().unwrap().get(slug).cloned()
    }

    /// Registered slugs, sorted.
    pub fn slugs(&self) -> Vec<&'static str> {
        let mut slugs: Vec<_> = self.widgets.read().unwrap().keys().copied().collect();
        slugs.sort_unstable();
        slugs
    }

    pub fn len(&self) -> usize {
        self.widgets.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.read().unwrap().is_empty()
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::error::AppError;
    use crate::domain::settings::WidgetSettings;
    use crate::widget::FieldValues;

    struct FixedWidget {
        slug: &'static str,
        output: &'static str,
    }

    #[async_trait]
    impl Widget for FixedWidget {
        fn slug(&self) -> &'static str {
            self.slug
        }

        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn description(&self) -> &'static str {
            "Renders a fixed string."
        }

        async fn form(&self, _instance: &str) -> Result<String, AppError> {
            Ok(String::new())
        }

        async fn update(
            &self,
            _instance: &str,
            _fields: &FieldValues,
        ) -> Result<WidgetSettings, AppError> {
            Ok(WidgetSettings::default())
        }

        async fn render(&self, _instance: &str) -> Result<String, AppError> {
            Ok(self.output.to_string())
        }
    }

    #[tokio::test]
    async fn registered_widgets_resolve_by_slug() {
        let registry = WidgetRegistry::new();
        registry.register(Arc::new(FixedWidget {
            slug: "fixed",
            output: "hello",
        }));

        let widget = registry.get("fixed").expect("registered widget");

        assert_eq!(widget.render("w1").await.expect("render"), "hello");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_slugs_resolve_to_none() {
        let registry = WidgetRegistry::new();

        assert!(registry.get("missing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn re_registration_replaces_the_previous_widget() {
        let registry = WidgetRegistry::new();
        registry.register(Arc::new(FixedWidget {
            slug: "fixed",
            output: "first",
        }));
        registry.register(Arc::new(FixedWidget {
            slug: "fixed",
            output: "second",
        }));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn slugs_are_sorted() {
        let registry = WidgetRegistry::new();
        registry.register(Arc::new(FixedWidget {
            slug: "zeta",
            output: "",
        }));
        registry.register(Arc::new(FixedWidget {
            slug: "alpha",
            output: "",
        }));

        assert_eq!(registry.slugs(), vec!["alpha", "zeta"]);
    }
}
