//! lf-board library - Lost & Found board service
//!
//! Public listing board (tabs, search, report form) plus the admin review
//! page, served over HTTP from one in-memory item set.

use axum::Router;
use lf_common::events::EventBus;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod board;
pub mod db;
pub mod error;
pub mod source;

use board::Board;
use source::DocumentStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Board controller owning the public item set
    pub board: Arc<Board>,
    /// Document store, when it is the configured backing store
    pub store: Option<DocumentStore>,
    pub events: EventBus,
    /// Token admin requests must carry, when configured
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(board: Arc<Board>, events: EventBus) -> Self {
        Self {
            board,
            store: None,
            events,
            admin_token: None,
        }
    }

    pub fn with_store(mut self, store: DocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token.filter(|t| !t.trim().is_empty());
        self
    }
}

/// Build application router
///
/// Admin API routes sit behind the admin gate; everything else is public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let admin = Router::new()
        .route("/admin/api/pending", get(api::pending_list))
        .route("/admin/api/counts", get(api::review_counts))
        .route("/admin/api/items/:id/approve", post(api::approve_item))
        .route("/admin/api/items/:id/deny", post(api::deny_item))
        .route("/admin/api/events", get(api::admin_event_stream))
        .layer(middleware::from_fn_with_state(state.clone(), api::admin_gate));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/admin", get(api::serve_admin))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/static/admin.js", get(api::serve_admin_js))
        .route("/static/style.css", get(api::serve_style_css))
        .route("/api/items", get(api::items_fragment).post(api::submit_item))
        .route("/api/items.json", get(api::items_json))
        .route("/api/refresh", post(api::refresh))
        .route("/api/status", get(api::board_status))
        .route("/api/events", get(api::board_event_stream))
        .merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
