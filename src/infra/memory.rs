//! In-memory host adapters.
//!
//! Implements the content and settings repositories over process-local
//! maps. This is the reference host used by the demo binary and the
//! integration tests; a real deployment implements the same traits over
//! its own storage.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use slug::slugify;
use time::{Duration, OffsetDateTime};
use url::Url;
use uuid::Uuid;

use crate::application::repos::{ContentRepo, RepoError, SettingsRepo};
use crate::domain::items::{CategoryRecord, ItemRecord};
use crate::domain::settings::WidgetSettings;

use super::error::InfraError;

pub struct MemoryHost {
    base_url: Url,
    posts: DashMap<Uuid, StoredPost>,
    /// Category slug to display name.
    categories: DashMap<String, String>,
    /// Instance id to stored settings document.
    settings: DashMap<String, serde_json::Value>,
    content_queries: AtomicUsize,
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: Uuid,
    title: String,
    excerpt: String,
    permalink: String,
    category: String,
    published_at: OffsetDateTime,
}

impl MemoryHost {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            posts: DashMap::new(),
            categories: DashMap::new(),
            settings: DashMap::new(),
            content_queries: AtomicUsize::new(0),
        }
    }

    /// Build a host from a TOML seed archive.
    pub fn from_seed_file(base_url: Url, path: &Path) -> Result<Self, InfraError> {
        let data = fs::read_to_string(path)?;
        let archive: SeedArchive = toml::from_str(&data)
            .map_err(|err| InfraError::seed(format!("invalid seed archive: {err}")))?;

        let host = Self::new(base_url);
        for category in &archive.categories {
            host.add_category(&category.slug, &category.name);
        }
        // Earlier archive entries publish later, so the archive reads
        // newest-first like the rendered list will.
        let now = OffsetDateTime::now_utc();
        for (index, post) in archive.posts.iter().enumerate() {
            let published_at = now - Duration::seconds(index as i64);
            host.publish_post_at(&post.title, &post.excerpt, &post.category, published_at)
                .map_err(|err| InfraError::seed(format!("seed post rejected: {err}")))?;
        }
        Ok(host)
    }

    /// Build a host pre-loaded with a handful of sample posts.
    pub fn with_sample_content(base_url: Url) -> Self {
        let host = Self::new(base_url);
        host.add_category("news", "News");
        host.add_category("life", "Life");

        let now = OffsetDateTime::now_utc();
        let samples = [
            ("Hello world", "The first post on this site.", "news"),
            ("Spring cleaning", "Notes from a weekend of tidying.", "life"),
            ("Release notes", "What changed in the latest update.", "news"),
        ];
        for (index, (title, excerpt, category)) in samples.iter().enumerate() {
            let published_at = now - Duration::seconds(index as i64);
            // Sample data is static, so publishing cannot fail.
            let _ = host.publish_post_at(title, excerpt, category, published_at);
        }
        host
    }

    pub fn add_category(&self, slug: &str, name: &str) {
        self.categories.insert(slug.to_string(), name.to_string());
    }

    /// Publish a post dated now. Returns the stored record.
    pub fn publish_post(
        &self,
        title: &str,
        excerpt: &str,
        category: &str,
    ) -> Result<ItemRecord, RepoError> {
        self.publish_post_at(title, excerpt, category, OffsetDateTime::now_utc())
    }

    /// Publish a post with an explicit publication time.
    pub fn publish_post_at(
        &self,
        title: &str,
        excerpt: &str,
        category: &str,
        published_at: OffsetDateTime,
    ) -> Result<ItemRecord, RepoError> {
        if title.trim().is_empty() {
            return Err(RepoError::invalid_input("post title must not be empty"));
        }

        let slug = self.unique_slug(title);
        let permalink = self
            .base_url
            .join(&slug)
            .map_err(RepoError::from_persistence)?
            .to_string();

        let post = StoredPost {
            id: Uuid::new_v4(),
            title: title.to_string(),
            excerpt: excerpt.to_string(),
            permalink,
            category: category.to_string(),
            published_at,
        };
        let record = to_record(&post);
        self.posts.insert(post.id, post);
        Ok(record)
    }

    pub fn delete_post(&self, id: Uuid) -> bool {
        self.posts.remove(&id).is_some()
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Number of `recent_published` queries served so far.
    pub fn content_queries(&self) -> usize {
        self.content_queries.load(Ordering::SeqCst)
    }

    fn unique_slug(&self, title: &str) -> String {
        let mut base = slugify(title);
        if base.is_empty() {
            base = "post".to_string();
        }

        let taken = self
            .posts
            .iter()
            .filter(|entry| {
                let slug = permalink_slug(&entry.permalink);
                slug == base || slug.starts_with(&format!("{base}-"))
            })
            .count();
        if taken == 0 {
            base
        } else {
            format!("{base}-{}", taken + 1)
        }
    }
}

fn permalink_slug(permalink: &str) -> &str {
    permalink.rsplit('/').next().unwrap_or(permalink)
}

fn to_record(post: &StoredPost) -> ItemRecord {
    ItemRecord {
        id: post.id,
        title: post.title.clone(),
        excerpt: post.excerpt.clone(),
        permalink: post.permalink.clone(),
        category: post.category.clone(),
        published_at: post.published_at,
    }
}

#[async_trait]
impl ContentRepo for MemoryHost {
    async fn recent_published(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<ItemRecord>, RepoError> {
        self.content_queries.fetch_add(1, Ordering::SeqCst);

        let mut items: Vec<ItemRecord> = self
            .posts
            .iter()
            .filter(|entry| category.is_empty() || entry.category == category)
            .map(|entry| to_record(entry.value()))
            .collect();
        items.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.title.cmp(&b.title))
        });
        items.truncate(limit);
        Ok(items)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let mut categories: Vec<CategoryRecord> = self
            .categories
            .iter()
            .map(|entry| CategoryRecord {
                slug: entry.key().clone(),
                name: entry.value().clone(),
            })
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[async_trait]
impl SettingsRepo for MemoryHost {
    async fn load_widget_settings(
        &self,
        instance: &str,
    ) -> Result<Option<serde_json::Value>, RepoError> {
        Ok(self.settings.get(instance).map(|entry| entry.clone()))
    }

    async fn upsert_widget_settings(
        &self,
        instance: &str,
        settings: &WidgetSettings,
    ) -> Result<(), RepoError> {
        let value = serde_json::to_value(settings).map_err(RepoError::from_persistence)?;
        self.settings.insert(instance.to_string(), value);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SeedArchive {
    #[serde(default)]
    categories: Vec<SeedCategory>,
    #[serde(default)]
    posts: Vec<SeedPost>,
}

#[derive(Debug, Deserialize)]
struct SeedCategory {
    slug: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SeedPost {
    title: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    category: String,
}
