//! Read-only projections of host-managed content.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRecord {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub permalink: String,
    pub category: String,
    pub published_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub slug: String,
    pub name: String,
}
