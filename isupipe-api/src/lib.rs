//! isupipe-api library - livestream backend HTTP API
//!
//! Tags, reactions, viewer/creator statistics and streamer themes over SQLite.

use std::sync::Arc;

use axum::Router;
use isupipe_common::config::DEFAULT_SESSION_COOKIE;
use isupipe_common::TagCache;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod assemble;
pub mod db;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Process-lifetime mirror of the tags table
    pub tags: Arc<TagCache>,
    /// Name of the cookie carrying the session id
    pub session_cookie: Arc<str>,
}

impl AppState {
    /// Create new application state with the default session cookie name
    pub fn new(db: SqlitePool, tags: Arc<TagCache>) -> Self {
        Self::with_session_cookie(db, tags, DEFAULT_SESSION_COOKIE)
    }

    pub fn with_session_cookie(db: SqlitePool, tags: Arc<TagCache>, session_cookie: &str) -> Self {
        Self {
            db,
            tags,
            session_cookie: Arc::from(session_cookie),
        }
    }
}

/// Build application router
///
/// Endpoints under `protected` require a live session cookie.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/user/:username/theme", get(api::get_streamer_theme))
        .route("/api/user/:username/statistics", get(api::get_user_statistics))
        .route(
            "/api/livestream/:livestream_id/reaction",
            get(api::get_reactions).post(api::post_reaction),
        )
        .route(
            "/api/livestream/:livestream_id/statistics",
            get(api::get_livestream_statistics),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session_middleware,
        ));

    let public = Router::new()
        .route("/api/initialize", post(api::initialize))
        .route("/api/tag", get(api::get_tags))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
