//! Public board endpoints
//!
//! Tab and search changes only re-filter the in-memory item set; the
//! backing store is contacted by `/api/refresh`, the poll timer or the
//! store's change feed.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use lf_common::filter::ItemFilter;
use lf_common::{Item, ItemStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{BoardStatus, ReloadTrigger};
use crate::error::{ApiError, ApiResult};
use crate::source::NewItem;
use crate::AppState;

/// Query parameters selecting the view
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    /// "lost" or "found" (default "found")
    #[serde(default)]
    pub tab: Option<String>,
    /// Free-text search
    #[serde(default)]
    pub q: String,
}

impl ViewQuery {
    pub fn filter(&self) -> ApiResult<ItemFilter> {
        let tab = match self.tab.as_deref().map(str::trim) {
            Some(tab) if !tab.is_empty() => tab.parse::<ItemStatus>()?,
            _ => ItemStatus::Found,
        };
        Ok(ItemFilter::new(tab, &self.q))
    }
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub tab: ItemStatus,
    pub query: String,
    pub count: usize,
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub count: usize,
}

/// GET /api/items?tab=found&q=
///
/// Grid fragment for the `items-grid` container.
pub async fn items_fragment(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Html<String>> {
    let filter = query.filter()?;
    debug!(tab = %filter.tab, query = %filter.query, "Rendering items");
    Ok(Html(state.board.render(&filter, &query.q).await))
}

/// GET /api/items.json?tab=found&q=
pub async fn items_json(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Json<ItemsResponse>> {
    let filter = query.filter()?;
    let items = state.board.visible_items(&filter).await;
    Ok(Json(ItemsResponse {
        tab: filter.tab,
        query: filter.query,
        count: items.len(),
        items,
    }))
}

/// POST /api/items
///
/// Stores a new report as pending review. Only the document store accepts
/// submissions; sheet boards take reports through their external form.
pub async fn submit_item(
    State(state): State<AppState>,
    Json(new_item): Json<NewItem>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let store = state.store.as_ref().ok_or_else(|| {
        ApiError::NotSupported("This board takes reports through its external form".to_string())
    })?;

    let id = store.create_item(&new_item).await?;
    info!(id = %id, "Report submitted for review");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id,
            status: "pending".to_string(),
        }),
    ))
}

/// POST /api/refresh
pub async fn refresh(State(state): State<AppState>) -> ApiResult<Json<RefreshResponse>> {
    let count = state.board.reload(ReloadTrigger::Manual).await?;
    Ok(Json(RefreshResponse { count }))
}

/// GET /api/status
pub async fn board_status(State(state): State<AppState>) -> Json<BoardStatus> {
    Json(state.board.status().await)
}
