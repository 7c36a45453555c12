use askama::{Error as AskamaError, Template};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

pub fn render_template<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
    })
}

#[derive(Clone)]
pub struct ItemView {
    pub title: String,
    pub excerpt: String,
    pub permalink: String,
}

pub struct RecentPostsContext {
    pub title: Option<String>,
    pub items: Vec<ItemView>,
    pub has_items: bool,
}

impl RecentPostsContext {
    pub fn new(title: &str, items: Vec<ItemView>) -> Self {
        let has_items = !items.is_empty();
        Self {
            title: (!title.is_empty()).then(|| title.to_string()),
            items,
            has_items,
        }
    }
}

#[derive(Template)]
#[template(path = "recent_posts_widget.html")]
pub struct RecentPostsTemplate {
    pub view: RecentPostsContext,
}

/// Id, submit name, and current value for one admin form input.
#[derive(Clone)]
pub struct FormFieldView {
    pub id: String,
    pub name: String,
    pub value: String,
}

#[derive(Clone)]
pub struct CategoryOptionView {
    pub slug: String,
    pub name: String,
    pub is_selected: bool,
}

pub struct SettingsFormContext {
    pub title: FormFieldView,
    pub count: FormFieldView,
    pub category: FormFieldView,
    pub categories: Vec<CategoryOptionView>,
}

#[derive(Template)]
#[template(path = "recent_posts_form.html")]
pub struct SettingsFormTemplate {
    pub view: SettingsFormContext,
}
