//! Server-Sent Events endpoints

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use lf_common::events::BoardEvent;
use std::convert::Infallible;

use crate::AppState;

fn is_board_update(event: &BoardEvent) -> bool {
    matches!(
        event,
        BoardEvent::ItemsReloaded { .. } | BoardEvent::LoadFailed { .. }
    )
}

/// GET /api/events
///
/// Tells public pages when to re-fetch their grid fragment.
pub async fn board_event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    lf_common::sse::board_event_stream(&state.events, "board", is_board_update)
}

/// GET /admin/api/events
///
/// Store writes, for the admin page's live counts and pending list.
pub async fn admin_event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    lf_common::sse::board_event_stream(&state.events, "admin", BoardEvent::is_store_change)
}
