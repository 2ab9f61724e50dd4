//! Built-in page templates using the Tera template engine
//!
//! The templates are embedded in the binary. Autoescaping stays on, so
//! only fields piped through `safe` (rendered post HTML) reach the page
//! unescaped.

use anyhow::Result;
use chrono::SecondsFormat;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tera::{Context, Tera};

use crate::config::BlogConfig;
use crate::content::{Author, Post};

/// Characters escaped when a value is placed in a single path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("index.html", include_str!("blog/index.html")),
            ("post.html", include_str!("blog/post.html")),
            ("about.html", include_str!("blog/about.html")),
        ])?;

        tera.register_filter("ctime", ctime_filter);
        tera.register_filter("segment", segment_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Base context shared by every page
pub fn base_context(config: &BlogConfig) -> Context {
    let mut context = Context::new();
    context.insert(
        "config",
        &ConfigData {
            title: config.title.clone(),
            intro: config.intro.clone(),
        },
    );
    context.insert("current_year", &chrono::Utc::now().format("%Y").to_string());
    context
}

/// Percent-encode `value` so it stays one path segment, `/` included
pub fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Tera filter: [`path_segment`] for ids, categories and tags in links
fn segment_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("segment", "value", String, value);
    Ok(tera::Value::String(path_segment(&s)))
}

/// Tera filter: Unix epoch seconds to a `ctime`-style string
fn ctime_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let secs = tera::try_get_value!("ctime", "value", i64, value);
    let formatted = Post::timestamp_from_epoch(secs)
        .map(|dt| dt.format("%a %b %e %H:%M:%S %Y").to_string())
        .ok_or_else(|| tera::Error::msg(format!("ctime: timestamp out of range: {}", secs)))?;
    Ok(tera::Value::String(formatted))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub intro: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub created_epoch: i64,
    pub date_iso: String,
    /// Rendered HTML, full body or preview
    pub content: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub author: Option<Author>,
    pub thumbnail: Option<String>,
}

impl PostData {
    /// Template view of a post with already-rendered content
    pub fn from_post(post: &Post, content: String) -> Self {
        Self {
            id: post.id.clone(),
            slug: post.slug.clone(),
            title: post.title.clone(),
            created_epoch: post.created_epoch(),
            date_iso: post.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            content,
            categories: post.categories.clone(),
            tags: post.tags.clone(),
            author: post.author.clone(),
            thumbnail: post.thumbnail.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Count posts per category, sorted by name
pub fn count_categories(posts: &[Post]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for post in posts {
        for category in &post.categories {
            *counts.entry(category.as_str()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
        })
        .collect()
}
