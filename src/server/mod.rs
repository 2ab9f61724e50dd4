//! HTTP server: routes post reads through the store, renderer and templates

mod error;
mod routes;

pub use error::AppError;

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::BlogConfig;
use crate::content::MarkdownRenderer;
use crate::store::PostStore;
use crate::templates::TemplateRenderer;

/// Shared, read-only state handed to every request
pub struct AppState {
    pub config: BlogConfig,
    pub store: Arc<dyn PostStore>,
    pub markdown: MarkdownRenderer,
    pub templates: TemplateRenderer,
}

impl AppState {
    pub fn new(config: BlogConfig, store: Arc<dyn PostStore>) -> Result<Self> {
        let markdown = MarkdownRenderer::with_theme(&config.highlight_theme);
        let templates = TemplateRenderer::new()?;
        Ok(Self {
            config,
            store,
            markdown,
            templates,
        })
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/", get(routes::index))
        .route("/post/:id", get(routes::post))
        .route("/about", get(routes::about))
        .route("/latest", get(routes::latest))
        .route("/categories/:category", get(routes::category))
        .route("/tags/:tag", get(routes::tag));

    let static_dir = Path::new(&state.config.static_dir);
    if static_dir.is_dir() {
        app = app.nest_service("/static", ServeDir::new(static_dir));
    } else {
        tracing::debug!("No static directory at {:?}", static_dir);
    }

    app.fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn start(state: Arc<AppState>, ip: &str, port: u16) -> Result<()> {
    let app = build_router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
