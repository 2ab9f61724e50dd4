//! Route handlers

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
};
use std::sync::Arc;
use tera::Context;

use super::{AppError, AppState};
use crate::content::{truncate_html_words, Facet, MarkdownRenderer, Post};
use crate::templates::{base_context, count_categories, path_segment, CategoryCount, PostData};

type PageResult = Result<Html<String>, AppError>;

/// `GET /` - newest posts as previews, with category counts
pub(super) async fn index(State(state): State<Arc<AppState>>) -> PageResult {
    let posts = state.store.list_posts().await?;
    let categories = count_categories(&posts);
    let previews = state.previews(&posts, state.config.preview_posts);

    state.listing_page(None, previews, categories)
}

/// `GET /post/:id` - a single rendered post
pub(super) async fn post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> PageResult {
    let post = state.store.get_post(&id).await?;
    let content = state.markdown.render(&post.body);

    let mut context = base_context(&state.config);
    context.insert("post", &PostData::from_post(&post, content));
    state.page("post.html", &context)
}

/// `GET /about` - title and intro from configuration
pub(super) async fn about(State(state): State<Arc<AppState>>) -> PageResult {
    state.page("about.html", &base_context(&state.config))
}

/// `GET /latest` - redirect to the newest post
pub(super) async fn latest(State(state): State<Arc<AppState>>) -> Result<Redirect, AppError> {
    let posts = state.store.list_posts().await?;
    let newest = posts.first().ok_or(AppError::NotFound)?;
    let target = format!("/post/{}", path_segment(&newest.id));
    Ok(Redirect::to(&target))
}

/// `GET /categories/:category`
pub(super) async fn category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> PageResult {
    state.facet_page(Facet::Category, &category).await
}

/// `GET /tags/:tag`
pub(super) async fn tag(State(state): State<Arc<AppState>>, Path(tag): Path<String>) -> PageResult {
    state.facet_page(Facet::Tag, &tag).await
}

/// Anything unrouted
pub(super) async fn not_found() -> AppError {
    AppError::NotFound
}

impl AppState {
    fn page(&self, template: &str, context: &Context) -> PageResult {
        Ok(Html(self.templates.render(template, context)?))
    }

    fn listing_page(
        &self,
        subtitle: Option<String>,
        posts: Vec<PostData>,
        categories: Vec<CategoryCount>,
    ) -> PageResult {
        let mut context = base_context(&self.config);
        context.insert("subtitle", &subtitle);
        context.insert("posts", &posts);
        context.insert("categories", &categories);
        self.page("index.html", &context)
    }

    async fn facet_page(&self, facet: Facet, value: &str) -> PageResult {
        let posts = self.store.list_posts_in(facet, value).await?;
        let previews = self.previews(&posts, self.config.facet_posts);
        let subtitle = format!("{}: {}", facet.label(), value);

        self.listing_page(Some(subtitle), previews, Vec::new())
    }

    /// Preview the first `limit` posts
    fn previews(&self, posts: &[Post], limit: usize) -> Vec<PostData> {
        posts
            .iter()
            .take(limit)
            .map(|post| PostData::from_post(post, self.preview(post)))
            .collect()
    }

    /// The `<!-- more -->` excerpt if the body has one, else the whole body,
    /// capped at `preview_words` words either way
    fn preview(&self, post: &Post) -> String {
        let source = MarkdownRenderer::split_excerpt(&post.body).unwrap_or(post.body.as_str());
        truncate_html_words(&self.markdown.render(source), self.config.preview_words)
    }
}
