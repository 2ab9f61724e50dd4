//! List stored posts

use anyhow::Result;
use std::io::Write;

use crate::content::Post;
use crate::store::PostStore;

/// Print every post, newest first
pub async fn run(store: &dyn PostStore) -> Result<()> {
    let posts = store.list_posts().await?;
    let stdout = std::io::stdout();
    write_listing(&mut stdout.lock(), &posts)?;
    Ok(())
}

/// Write one line per post
pub fn write_listing<W: Write>(out: &mut W, posts: &[Post]) -> Result<()> {
    writeln!(out, "Posts ({}):", posts.len())?;
    for post in posts {
        write!(
            out,
            "  {} - {} [{}]",
            post.created_at.format("%Y-%m-%d"),
            post.title,
            post.id
        )?;
        if !post.categories.is_empty() {
            write!(out, " ({})", post.categories.join(", "))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_listing() {
        let created = Post::timestamp_from_epoch(1_700_000_000).unwrap();
        let mut post = Post::new("hello".into(), "Hello".into(), String::new(), created);
        post.categories = vec!["notes".into()];

        let mut out = Vec::new();
        write_listing(&mut out, &[post]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Posts (1):\n  2023-11-14 - Hello [hello] (notes)\n");
    }
}
