//! Admin review endpoints
//!
//! All routes here run behind [`crate::api::admin_gate`].

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use lf_common::render::render_pending_list;
use lf_common::ReviewStatus;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::source::DocumentStore;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ReviewCounts {
    pub pending: i64,
    pub approved: i64,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub status: ReviewStatus,
}

fn store(state: &AppState) -> ApiResult<&DocumentStore> {
    state
        .store
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Review requires the document store backend".to_string()))
}

/// GET /admin/api/pending
///
/// Pending list fragment for the `pending-list` container.
pub async fn pending_list(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let items = store(&state)?.pending_items().await?;
    Ok(Html(render_pending_list(&items)))
}

/// GET /admin/api/counts
pub async fn review_counts(State(state): State<AppState>) -> ApiResult<Json<ReviewCounts>> {
    let store = store(&state)?;
    Ok(Json(ReviewCounts {
        pending: store.count_by_review(ReviewStatus::Pending).await?,
        approved: store.count_by_review(ReviewStatus::Approved).await?,
    }))
}

async fn review(state: &AppState, id: String, decision: ReviewStatus) -> ApiResult<Json<ReviewResponse>> {
    store(state)?.set_review_status(&id, decision).await?;
    Ok(Json(ReviewResponse { id, status: decision }))
}

/// POST /admin/api/items/:id/approve
pub async fn approve_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReviewResponse>> {
    review(&state, id, ReviewStatus::Approved).await
}

/// POST /admin/api/items/:id/deny
pub async fn deny_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReviewResponse>> {
    review(&state, id, ReviewStatus::Denied).await
}
