//! Content module - post model, front-matter, markdown and previews

pub mod excerpt;
mod frontmatter;
mod markdown;
mod post;

pub use excerpt::truncate_html_words;
pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, MORE_MARKER};
pub use post::{sort_newest_first, Author, Facet, Post};
