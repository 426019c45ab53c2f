//! Board events and the broadcast event bus
//!
//! The document store emits change events on the bus (its live
//! subscription feed); the board controller emits reload results. SSE
//! handlers forward both to browsers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::ReviewStatus;

/// Events flowing through the board service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoardEvent {
    /// Item set replaced after a load
    ItemsReloaded {
        count: usize,
        /// Whether the item count changed compared to the previous load
        changed: bool,
        timestamp: DateTime<Utc>,
    },

    /// Loading the item source failed
    LoadFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A report was written to the document store
    ItemSubmitted {
        id: String,
        timestamp: DateTime<Utc>,
    },

    /// An administrator approved or denied a submission
    ItemReviewed {
        id: String,
        decision: ReviewStatus,
        timestamp: DateTime<Utc>,
    },
}

impl BoardEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            BoardEvent::ItemsReloaded { .. } => "ItemsReloaded",
            BoardEvent::LoadFailed { .. } => "LoadFailed",
            BoardEvent::ItemSubmitted { .. } => "ItemSubmitted",
            BoardEvent::ItemReviewed { .. } => "ItemReviewed",
        }
    }

    /// Whether this event reports a document store write
    pub fn is_store_change(&self) -> bool {
        matches!(
            self,
            BoardEvent::ItemSubmitted { .. } | BoardEvent::ItemReviewed { .. }
        )
    }
}

/// Central event distribution bus
///
/// Wraps a `tokio::sync::broadcast` channel: publishing never blocks and
/// slow subscribers observe `Lagged` instead of stalling producers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.tx.subscribe()
    }

    /// Emit an event; `Err` when nobody is listening
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: BoardEvent) -> Result<usize, broadcast::error::SendError<BoardEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: BoardEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
