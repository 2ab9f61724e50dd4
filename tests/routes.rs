use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use dynablog::config::BlogConfig;
use dynablog::content::{Facet, Post};
use dynablog::server::{build_router, AppState};
use dynablog::store::{self, MemoryPostStore, PostStore, StoreError};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

fn post(id: &str, title: &str, secs: i64, body: &str) -> Post {
    let created = Post::timestamp_from_epoch(secs).expect("timestamp");
    Post::new(id.to_string(), title.to_string(), body.to_string(), created)
}

fn test_config() -> BlogConfig {
    BlogConfig {
        title: "Test Blog".to_string(),
        intro: "A blog used in tests".to_string(),
        static_dir: "no-such-static-dir".to_string(),
        ..Default::default()
    }
}

fn app_with(store: Arc<dyn PostStore>) -> axum::Router {
    let state = AppState::new(test_config(), store).expect("AppState::new");
    build_router(Arc::new(state))
}

fn sample_store() -> Arc<dyn PostStore> {
    let mut a = post("a", "Older Post", 1_600_000_000, "first body");
    a.categories = vec!["notes".to_string()];
    a.tags = vec!["rust".to_string()];
    let mut b = post(
        "b",
        "Newer Post",
        1_700_000_000,
        "# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n<script>alert('x')</script>",
    );
    b.categories = vec!["notes".to_string(), "tables".to_string()];
    Arc::new(MemoryPostStore::with_posts(vec![a, b]))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// A store whose backend is always unreachable
struct DownStore;

#[async_trait]
impl PostStore for DownStore {
    async fn list_posts(&self) -> store::Result<Vec<Post>> {
        Err(StoreError::unavailable("connect timeout to 10.0.0.1:443"))
    }

    async fn get_post(&self, _id: &str) -> store::Result<Post> {
        Err(StoreError::unavailable("connect timeout to 10.0.0.1:443"))
    }

    async fn list_posts_in(&self, _facet: Facet, _value: &str) -> store::Result<Vec<Post>> {
        Err(StoreError::unavailable("connect timeout to 10.0.0.1:443"))
    }

    async fn put_post(&self, _post: &Post) -> store::Result<()> {
        Err(StoreError::unavailable("connect timeout to 10.0.0.1:443"))
    }
}

#[tokio::test]
async fn index_lists_newest_first() {
    let (status, html) = get(app_with(sample_store()), "/").await;
    assert_eq!(status, StatusCode::OK);

    let newer = html.find("Newer Post").expect("newer post listed");
    let older = html.find("Older Post").expect("older post listed");
    assert!(newer < older);
    assert!(html.contains("/categories/notes"));
    assert!(html.contains("(2)"));
}

#[tokio::test]
async fn index_on_empty_store() {
    let (status, html) = get(app_with(Arc::new(MemoryPostStore::new())), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No posts yet."));
}

#[tokio::test]
async fn post_page_renders_markdown() {
    let (status, html) = get(app_with(sample_store()), "/post/b").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<table>"));
    assert_eq!(html.matches("<th>").count(), 2);
    assert!(html.contains("<td>1</td>"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn missing_post_is_404() {
    let (status, html) = get(app_with(Arc::new(MemoryPostStore::new())), "/post/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("404"));
}

#[tokio::test]
async fn unknown_path_is_404() {
    let (status, _) = get(app_with(sample_store()), "/nope/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn about_shows_config() {
    let (status, html) = get(app_with(sample_store()), "/about").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Test Blog"));
    assert!(html.contains("A blog used in tests"));
}

#[tokio::test]
async fn latest_redirects_to_newest() {
    let resp = app_with(sample_store())
        .oneshot(Request::builder().uri("/latest").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/post/b");
}

#[tokio::test]
async fn latest_on_empty_store_is_404() {
    let (status, _) = get(app_with(Arc::new(MemoryPostStore::new())), "/latest").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn facet_pages_filter_posts() {
    let (status, html) = get(app_with(sample_store()), "/tags/rust").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Posts tagged as: rust"));
    assert!(html.contains("Older Post"));
    assert!(!html.contains("Newer Post"));

    let (status, html) = get(app_with(sample_store()), "/categories/tables").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Newer Post"));
    assert!(!html.contains("Older Post"));
}

#[tokio::test]
async fn store_outage_is_503_without_detail() {
    for uri in ["/", "/post/a", "/latest", "/tags/rust"] {
        let (status, html) = get(app_with(Arc::new(DownStore)), uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        assert!(!html.contains("10.0.0.1"), "{}", uri);
    }
}

#[tokio::test]
async fn about_does_not_need_store() {
    let (status, _) = get(app_with(Arc::new(DownStore)), "/about").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn post_only_accepts_get() {
    let resp = app_with(sample_store())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/post/a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn long_bodies_are_truncated_in_previews() {
    let body = (1..=200)
        .map(|i| format!("word{}", i))
        .collect::<Vec<_>>()
        .join(" ");
    let store = Arc::new(MemoryPostStore::with_posts(vec![post("long", "Long", 1, &body)]));

    let (_, index) = get(app_with(store.clone()), "/").await;
    assert!(index.contains("word85 …"));
    assert!(!index.contains("word86"));

    let (_, full) = get(app_with(store), "/post/long").await;
    assert!(full.contains("word200"));
}

#[tokio::test]
async fn more_marker_sets_preview() {
    let store = Arc::new(MemoryPostStore::with_posts(vec![post(
        "m",
        "Marked",
        1,
        "Intro paragraph.\n\n<!-- more -->\n\nHidden rest.",
    )]));
    let (_, index) = get(app_with(store), "/").await;
    assert!(index.contains("Intro paragraph."));
    assert!(!index.contains("Hidden rest."));
}

#[tokio::test]
async fn index_links_reach_posts_with_slash_ids() {
    let store: Arc<dyn PostStore> = Arc::new(MemoryPostStore::with_posts(vec![post(
        "2024/hello",
        "Hello 2024",
        1,
        "body",
    )]));

    let (_, index) = get(app_with(store.clone()), "/").await;
    let start = index.find("href=\"/post/").expect("post link") + "href=\"".len();
    let end = start + index[start..].find('"').expect("closing quote");
    let link = &index[start..end];
    assert_eq!(link, "/post/2024%2Fhello");

    let (status, html) = get(app_with(store), link).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Hello 2024"));
}

#[tokio::test]
async fn more_marker_preview_is_still_word_capped() {
    let excerpt = (1..=300)
        .map(|i| format!("word{}", i))
        .collect::<Vec<_>>()
        .join(" ");
    let body = format!("{}\n\n<!-- more -->\n\nHidden rest.", excerpt);
    let store = Arc::new(MemoryPostStore::with_posts(vec![post("m", "Marked", 1, &body)]));

    let (_, index) = get(app_with(store), "/").await;
    assert!(index.contains("word85 …"));
    assert!(!index.contains("word86"));
    assert!(!index.contains("Hidden rest."));
}
