use std::error::Error as StdError;

use thiserror::Error;

use crate::application::repos::RepoError;
use crate::infra::error::InfraError;
use crate::presentation::views::TemplateRenderError;

/// Structured report describing a failure and its cause chain.
///
/// Collected at the outermost layer so operators see every level of the
/// chain in one log line instead of just the top message.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    pub fn from_message(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            messages: vec![message.into()],
        }
    }
}

/// Failures surfaced by widget operations and runtime bootstrap.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Render(#[from] TemplateRenderError),

    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error("unknown widget `{slug}`")]
    UnknownWidget { slug: String },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unknown_widget(slug: impl Into<String>) -> Self {
        Self::UnknownWidget { slug: slug.into() }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
