//! HTTP server: serves generated pages, generates missing post pages on
//! first request, regenerates stale pages in the background, and answers
//! the list page's "load more" requests.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{ContentSource, PostSummary};
use crate::error::BlogError;
use crate::generator::Generator;
use crate::helpers::uid_from_path;
use crate::pages::ListPage;
use crate::Blog;

/// Server state
pub struct ServerState {
    blog: Blog,
    generator: Generator,
    /// Post uids whose first generation is running
    pending: Mutex<HashSet<String>>,
    /// Pages being regenerated in the background
    revalidating: Mutex<HashSet<PathBuf>>,
}

impl ServerState {
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Arc<Self>> {
        Ok(Arc::new(Self {
            blog: blog.clone(),
            generator: Generator::new(blog, source)?,
            pending: Mutex::new(HashSet::new()),
            revalidating: Mutex::new(HashSet::new()),
        }))
    }
}

/// Removes its key from a claim set when dropped, even if the task holding
/// it is cancelled
struct Claim<'a, T: std::hash::Hash + Eq> {
    set: &'a Mutex<HashSet<T>>,
    key: Option<T>,
}

impl<'a, T: std::hash::Hash + Eq + Clone> Claim<'a, T> {
    fn acquire(set: &'a Mutex<HashSet<T>>, key: &T) -> Option<Self> {
        let mut claimed = set.lock().unwrap_or_else(|e| e.into_inner());
        claimed.insert(key.clone()).then(|| Self {
            set,
            key: Some(key.clone()),
        })
    }
}

impl<T: std::hash::Hash + Eq> Drop for Claim<'_, T> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.set
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&key);
        }
    }
}

/// A page that can be regenerated
#[derive(Debug, Clone)]
enum Route {
    Index,
    Post(String),
}

/// Start the server
pub async fn start(
    blog: &Blog,
    source: Arc<dyn ContentSource>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let state = ServerState::new(blog, source)?;
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/posts", get(api_posts))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CursorQuery {
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize)]
struct MorePosts {
    results: Vec<RenderedPost>,
    next_page: Option<String>,
}

#[derive(Debug, Serialize)]
struct RenderedPost {
    #[serde(flatten)]
    post: PostSummary,
    html: String,
}

/// One "load more" step for the list page
async fn api_posts(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<CursorQuery>,
) -> Response {
    let cursor = query.cursor.unwrap_or_default();
    let messages = &state.blog.config.messages;

    if !cursor.trim().is_empty() && !same_origin(&state.blog.config.cms.endpoint, &cursor) {
        tracing::warn!("Rejected cursor outside the content backend: {}", cursor);
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": messages.load_error })),
        )
            .into_response();
    }

    let mut list = ListPage::resume(&cursor);
    if let Err(e) = list.load_more(state.generator.source()).await {
        tracing::warn!("Load more failed for {}: {}", cursor, e);
        return (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": messages.load_error })),
        )
            .into_response();
    }

    let next_page = list.next_page().map(str::to_string);
    let posts = list.into_posts();
    let rendered = match state.generator.render_post_items(&posts) {
        Ok(rendered) => rendered,
        Err(e) => return server_error(e),
    };

    Json(MorePosts {
        results: posts
            .into_iter()
            .zip(rendered)
            .map(|(post, html)| RenderedPost { post, html })
            .collect(),
        next_page,
    })
    .into_response()
}

/// Serve pages, generating and revalidating them as needed
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path().to_string();

    if path == "/" || path == "/index.html" {
        return serve_index(&state).await;
    }
    if path.starts_with("/post/") {
        return match uid_from_path(&path) {
            Some(uid) => serve_post(&state, uid).await,
            None => not_found(&state),
        };
    }

    let mut service = ServeDir::new(&state.blog.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state),
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

async fn serve_index(state: &Arc<ServerState>) -> Response {
    let path = state.generator.index_path();

    if !path.exists() {
        if let Err(e) = state.generator.generate_index().await {
            return server_error(e);
        }
    } else {
        let max_age = Duration::from_secs(state.blog.config.revalidate.index);
        revalidate_if_stale(state, &path, max_age, Route::Index).await;
    }

    serve_file(state, &path).await
}

/// Serve `/post/{uid}`, generating it on first request
async fn serve_post(state: &Arc<ServerState>, uid: String) -> Response {
    let path = state.generator.post_path(&uid);

    if path.exists() {
        let max_age = Duration::from_secs(state.blog.config.revalidate.post);
        revalidate_if_stale(state, &path, max_age, Route::Post(uid)).await;
        return serve_file(state, &path).await;
    }

    let Some(_claim) = Claim::acquire(&state.pending, &uid) else {
        // Someone else is generating this page; show the placeholder
        return match state.generator.render_loading() {
            Ok(html) => Html(html).into_response(),
            Err(e) => server_error(e),
        };
    };

    tracing::info!("Generating post {} on first request", uid);
    match state.generator.generate_post(&uid).await {
        Ok(path) => serve_file(state, &path).await,
        Err(e) if e.is_not_found() => {
            tracing::debug!("{}", e);
            not_found(state)
        }
        Err(e) => server_error(e),
    }
}

/// Regenerate `path` in the background when older than `max_age`; the
/// current file keeps being served meanwhile
async fn revalidate_if_stale(state: &Arc<ServerState>, path: &Path, max_age: Duration, route: Route) {
    let age = match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => modified.elapsed().unwrap_or_default(),
        Err(e) => {
            tracing::debug!("Cannot read age of {:?}: {}", path, e);
            return;
        }
    };
    if age < max_age {
        return;
    }

    let state = Arc::clone(state);
    let path = path.to_path_buf();
    tokio::spawn(async move {
        let Some(_claim) = Claim::acquire(&state.revalidating, &path) else {
            return;
        };
        tracing::debug!("Revalidating {:?}", path);

        let result = match &route {
            Route::Index => state.generator.generate_index().await.map(|_| ()),
            Route::Post(uid) => state.generator.generate_post(uid).await.map(|_| ()),
        };

        match result {
            Ok(()) => tracing::info!("Revalidated {:?}", route),
            Err(e) if e.is_not_found() => {
                tracing::info!("{:?} no longer exists, removing {:?}", route, path);
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    tracing::error!("Failed to remove {:?}: {}", path, e);
                }
            }
            Err(e) => tracing::error!("Revalidating {:?} failed, keeping stale page: {}", route, e),
        }
    });
}

async fn serve_file(state: &ServerState, path: &Path) -> Response {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Html(content).into_response(),
        Err(_) => not_found(state),
    }
}

fn not_found(state: &ServerState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn server_error(error: BlogError) -> Response {
    tracing::error!("Request failed: {}", error);
    (error_status(&error), "Failed to build page").into_response()
}

/// 502 when the content backend misbehaved, 500 for local failures
fn error_status(error: &BlogError) -> StatusCode {
    match error {
        BlogError::Transport(_)
        | BlogError::Status { .. }
        | BlogError::NotFound { .. }
        | BlogError::Projection { .. } => StatusCode::BAD_GATEWAY,
        BlogError::Config(_) | BlogError::Render(_) | BlogError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Whether `url` points at the same scheme and host as `base`
fn same_origin(base: &str, url: &str) -> bool {
    fn origin(url: &str) -> Option<&str> {
        let scheme_end = url.find("://")? + 3;
        let host_end = url[scheme_end..]
            .find(['/', '?', '#'])
            .map_or(url.len(), |i| scheme_end + i);
        (host_end > scheme_end).then(|| &url[..host_end])
    }

    match (origin(base), origin(url)) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
