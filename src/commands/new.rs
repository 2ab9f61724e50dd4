//! Publish a new post from a markdown file

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::{Author, FrontMatter, Post};
use crate::store::PostStore;
use crate::templates::path_segment;

/// Build a post from a markdown source with front-matter
///
/// The id comes from `id_override`, then the front-matter `id`, then the
/// slugified title. The title falls back to the file stem.
pub fn post_from_source(source: &str, file_stem: &str, id_override: Option<&str>) -> Result<Post> {
    let (fm, body) = FrontMatter::parse(source)?;

    let title = fm
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| file_stem.to_string());

    let id = id_override
        .map(str::to_string)
        .or(fm.id)
        .unwrap_or_else(|| slug::slugify(&title));
    if id.trim().is_empty() {
        anyhow::bail!("Post id is empty; set `id` in the front-matter or pass --id");
    }

    let mut post = Post::new(id, title, body.to_string(), chrono::Utc::now());
    post.categories = fm.categories;
    post.tags = fm.tags;
    post.thumbnail = fm.thumbnail;
    post.author = fm.author.map(|name| Author {
        name,
        email: fm.email.unwrap_or_default(),
    });

    Ok(post)
}

/// Read `path` and store it as a new post
pub async fn create_post(store: &dyn PostStore, path: &Path, id: Option<&str>) -> Result<Post> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading post source {:?}", path))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let post = post_from_source(&source, &stem, id)?;
    store
        .put_post(&post)
        .await
        .with_context(|| format!("storing post {}", post.id))?;

    println!("Created: /post/{}", path_segment(&post.id));

    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryPostStore, StoreError};
    use std::io::Write;

    #[test]
    fn test_id_defaults_to_slugified_title() {
        let post = post_from_source("---\ntitle: Hello Dynamo World\n---\nbody", "file", None).unwrap();
        assert_eq!(post.id, "hello-dynamo-world");
        assert_eq!(post.title, "Hello Dynamo World");
        assert_eq!(post.body, "body");
    }

    #[test]
    fn test_id_precedence() {
        let source = "---\ntitle: T\nid: from-frontmatter\n---\nbody";
        assert_eq!(
            post_from_source(source, "f", None).unwrap().id,
            "from-frontmatter"
        );
        assert_eq!(
            post_from_source(source, "f", Some("cli")).unwrap().id,
            "cli"
        );
    }

    #[test]
    fn test_title_falls_back_to_stem() {
        let post = post_from_source("# plain markdown", "my-notes", None).unwrap();
        assert_eq!(post.title, "my-notes");
        assert_eq!(post.id, "my-notes");
    }

    #[test]
    fn test_author_fields() {
        let source = "---\ntitle: T\nauthor: Sam\nemail: sam@example.com\ntags: rust\n---\nx";
        let post = post_from_source(source, "f", None).unwrap();
        let author = post.author.unwrap();
        assert_eq!(author.name, "Sam");
        assert_eq!(author.email, "sam@example.com");
        assert_eq!(post.tags, vec!["rust"]);
    }

    #[tokio::test]
    async fn test_create_post_stores_once() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "---\ntitle: First Post\n---\n\nHello.").unwrap();

        let store = MemoryPostStore::new();
        let post = create_post(&store, file.path(), None).await.unwrap();
        assert_eq!(store.get_post("first-post").await.unwrap(), post);

        let again = create_post(&store, file.path(), None).await.unwrap_err();
        assert!(matches!(
            again.downcast_ref::<StoreError>(),
            Some(StoreError::AlreadyExists(_))
        ));
    }
}
