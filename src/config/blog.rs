//! Blog configuration (blog.yml + environment)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main blog configuration
///
/// Loaded once at start-up and shared read-only with every handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    // Site
    pub title: String,
    pub intro: String,

    // Store
    pub table: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,

    // Listing
    pub preview_posts: usize,
    pub preview_words: usize,
    pub facet_posts: usize,

    // Rendering
    pub highlight_theme: String,
    pub static_dir: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            intro: String::new(),

            table: "blog".to_string(),
            region: None,
            endpoint: None,
            timeout_ms: None,

            preview_posts: 3,
            preview_words: 85,
            facet_posts: 5,

            highlight_theme: "base16-ocean.dark".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

impl BlogConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let config: BlogConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary key lookup
    ///
    /// `TITLE`, `INTRO` and `BLOGTABLE` map onto `title`, `intro` and `table`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(title) = lookup("TITLE") {
            self.title = title;
        }
        if let Some(intro) = lookup("INTRO") {
            self.intro = intro;
        }
        if let Some(table) = lookup("BLOGTABLE") {
            self.table = table;
        }
        if let Some(endpoint) = lookup("BLOG_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(timeout) = lookup("BLOG_TIMEOUT_MS") {
            let timeout = timeout
                .parse()
                .with_context(|| format!("BLOG_TIMEOUT_MS is not a number: {:?}", timeout))?;
            self.timeout_ms = Some(timeout);
        }

        if self.table.trim().is_empty() {
            anyhow::bail!("BLOGTABLE must not be empty");
        }

        Ok(())
    }
}
