//! Post model

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Unique id, the table's partition key
    pub id: String,

    /// Post title
    pub title: String,

    /// Raw markdown body
    pub body: String,

    /// Creation time, never changes once stored
    pub created_at: DateTime<Utc>,

    /// URL-friendly form of the id
    pub slug: String,

    /// Post categories
    pub categories: Vec<String>,

    /// Post tags
    pub tags: Vec<String>,

    /// Post author
    pub author: Option<Author>,

    /// Thumbnail image URL
    pub thumbnail: Option<String>,
}

/// Author of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// Which list attribute a facet query looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Category,
    Tag,
}

impl Facet {
    /// Attribute name in the store
    pub fn attribute(&self) -> &'static str {
        match self {
            Facet::Category => "categories",
            Facet::Tag => "tags",
        }
    }

    /// Heading used on listing pages
    pub fn label(&self) -> &'static str {
        match self {
            Facet::Category => "Posts in category",
            Facet::Tag => "Posts tagged as",
        }
    }
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(id: String, title: String, body: String, created_at: DateTime<Utc>) -> Self {
        let slug = slug::slugify(&id);
        Self {
            id,
            title,
            body,
            created_at,
            slug,
            categories: Vec::new(),
            tags: Vec::new(),
            author: None,
            thumbnail: None,
        }
    }

    /// Creation time as Unix epoch seconds
    pub fn created_epoch(&self) -> i64 {
        self.created_at.timestamp()
    }

    /// Build a timestamp from epoch seconds, `None` when out of range
    pub fn timestamp_from_epoch(secs: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(secs, 0).single()
    }

    /// Whether the facet list of this post contains `value`
    pub fn has(&self, facet: Facet, value: &str) -> bool {
        let list = match facet {
            Facet::Category => &self.categories,
            Facet::Tag => &self.tags,
        };
        list.iter().any(|v| v == value)
    }
}

/// Order posts newest first, ties broken by id
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
