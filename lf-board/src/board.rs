//! Board controller
//!
//! Single owner of the public board's application state. Handlers only read
//! the state and hand it to the pure filter/render functions; the item set
//! is replaced wholesale by [`Board::reload`].
//!
//! Load state machine: `Idle -> Loading -> {Loaded, LoadError}`. View
//! changes (tab, search) never re-fetch. Manual refreshes, poll ticks and
//! store change events go back through `Loading`.

use chrono::{DateTime, Utc};
use lf_common::events::{BoardEvent, EventBus};
use lf_common::filter::{filter_items, ItemFilter};
use lf_common::normalize::normalize_records;
use lf_common::render::{render_grid, GridView};
use lf_common::Item;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::source::{ItemSource, SourceError};

/// Load phase of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    LoadError,
}

/// What started a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    Startup,
    Manual,
    Timer,
    StoreChange,
}

impl ReloadTrigger {
    /// Poll ticks only announce a re-render when the item count changed
    fn announces_unchanged(&self) -> bool {
        !matches!(self, ReloadTrigger::Timer)
    }
}

/// Application state owned by the board
#[derive(Debug)]
pub struct BoardState {
    pub phase: LoadPhase,
    pub items: Vec<Item>,
    pub last_error: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
    /// Generation of the load whose result is currently applied
    applied_generation: u64,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            phase: LoadPhase::Idle,
            items: Vec::new(),
            last_error: None,
            loaded_at: None,
            applied_generation: 0,
        }
    }
}

/// Status snapshot for `/api/status`
#[derive(Debug, Clone, Serialize)]
pub struct BoardStatus {
    pub source: &'static str,
    pub phase: LoadPhase,
    pub item_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub struct Board {
    source: Arc<dyn ItemSource>,
    events: EventBus,
    state: RwLock<BoardState>,
    next_generation: AtomicU64,
}

impl Board {
    pub fn new(source: Arc<dyn ItemSource>, events: EventBus) -> Self {
        Self {
            source,
            events,
            state: RwLock::new(BoardState::default()),
            next_generation: AtomicU64::new(1),
        }
    }

    pub async fn phase(&self) -> LoadPhase {
        self.state.read().await.phase
    }

    pub async fn status(&self) -> BoardStatus {
        let state = self.state.read().await;
        BoardStatus {
            source: self.source.name(),
            phase: state.phase,
            item_count: state.items.len(),
            loaded_at: state.loaded_at,
            last_error: state.last_error.clone(),
        }
    }

    /// Fetch, normalize and replace the item set
    ///
    /// Returns the new item count. A result belonging to a load issued
    /// before the currently applied one is discarded.
    pub async fn reload(&self, trigger: ReloadTrigger) -> Result<usize, SourceError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        self.state.write().await.phase = LoadPhase::Loading;
        debug!(?trigger, generation, "Loading items from {}", self.source.name());

        let fetched = self.source.fetch().await;

        let mut state = self.state.write().await;
        if generation < state.applied_generation {
            debug!(generation, applied = state.applied_generation, "Discarding stale load result");
            return fetched.map(|_| state.items.len());
        }
        state.applied_generation = generation;

        match fetched {
            Ok(records) => {
                let items = normalize_records(
                    &records,
                    self.source.column_mapping(),
                    self.source.record_order(),
                );
                let count = items.len();
                let changed = state.display_changes(count);

                state.items = items;
                state.phase = LoadPhase::Loaded;
                state.last_error = None;
                state.loaded_at = Some(Utc::now());
                drop(state);

                info!(count, ?trigger, "Loaded {} items from {}", count, self.source.name());
                if changed || trigger.announces_unchanged() {
                    self.events.emit_lossy(BoardEvent::ItemsReloaded {
                        count,
                        changed,
                        timestamp: Utc::now(),
                    });
                }
                Ok(count)
            }
            Err(e) => {
                state.phase = LoadPhase::LoadError;
                state.last_error = Some(e.to_string());
                drop(state);

                warn!("Failed to load items from {}: {}", self.source.name(), e);
                self.events.emit_lossy(BoardEvent::LoadFailed {
                    message: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Items visible under `filter`, cloned out of the state
    pub async fn visible_items(&self, filter: &ItemFilter) -> Vec<Item> {
        let state = self.state.read().await;
        filter_items(&state.items, filter).into_iter().cloned().collect()
    }

    /// Render the grid fragment for the given view selection
    ///
    /// A board that has never loaded shows the loading indicator; a failed
    /// load shows the error message; otherwise the (possibly stale while
    /// reloading) items are filtered and rendered.
    pub async fn render(&self, filter: &ItemFilter, raw_query: &str) -> String {
        let state = self.state.read().await;
        match state.phase {
            LoadPhase::LoadError => render_grid(&GridView::Failed),
            LoadPhase::Idle => render_grid(&GridView::Loading),
            LoadPhase::Loading if state.loaded_at.is_none() => render_grid(&GridView::Loading),
            LoadPhase::Loading | LoadPhase::Loaded => render_grid(&GridView::Items {
                items: filter_items(&state.items, filter),
                tab: filter.tab,
                query: raw_query,
            }),
        }
    }

    /// Start the background refresh driver
    ///
    /// Sources with a live change feed reload on every store change; other
    /// sources are polled every `poll_interval`.
    pub fn spawn_refresh_task(self: Arc<Self>, poll_interval: Duration) -> JoinHandle<()> {
        match self.source.subscribe() {
            Some(mut rx) => {
                info!("Board following live changes from {}", self.source.name());
                tokio::spawn(async move {
                    loop {
                        match rx.recv().await {
                            Ok(event) if event.is_store_change() => {
                                let _ = self.reload(ReloadTrigger::StoreChange).await;
                            }
                            Ok(_) => {}
                            Err(RecvError::Lagged(skipped)) => {
                                warn!("Missed {} store events, reloading", skipped);
                                let _ = self.reload(ReloadTrigger::StoreChange).await;
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                })
            }
            None => {
                info!(
                    "Board polling {} every {}s",
                    self.source.name(),
                    poll_interval.as_secs()
                );
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(poll_interval);
                    // first tick completes immediately; startup load already ran
                    ticker.tick().await;
                    loop {
                        ticker.tick().await;
                        let _ = self.reload(ReloadTrigger::Timer).await;
                    }
                })
            }
        }
    }
}

impl BoardState {
    /// Whether applying `count` items changes what pages show: a first load,
    /// a recovery from a failed load, or a different item count
    fn display_changes(&self, count: usize) -> bool {
        self.loaded_at.is_none() || self.last_error.is_some() || self.items.len() != count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lf_common::config::ColumnMapping;
    use lf_common::normalize::RecordOrder;
    use lf_common::{ItemStatus, RawRecord};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Source returning scripted results in order (the last one repeats)
    struct ScriptedSource {
        mapping: ColumnMapping,
        results: Mutex<Vec<Result<Vec<RawRecord>, u16>>>,
        /// Holds the first fetch until notified
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(results: Vec<Result<Vec<RawRecord>, u16>>) -> Self {
            Self {
                mapping: ColumnMapping::spreadsheet(),
                results: Mutex::new(results),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(results: Vec<Result<Vec<RawRecord>, u16>>, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(results)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ItemSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }
        fn column_mapping(&self) -> &ColumnMapping {
            &self.mapping
        }
        fn record_order(&self) -> RecordOrder {
            RecordOrder::OldestFirst
        }
        async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let next = {
                let mut results = self.results.lock().unwrap();
                if results.len() > 1 {
                    results.remove(0)
                } else {
                    results[0].clone()
                }
            };
            if call == 0 {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
            }
            next.map_err(SourceError::HttpStatus)
        }
    }

    fn drain_event_types(rx: &mut tokio::sync::broadcast::Receiver<BoardEvent>) -> Vec<&'static str> {
        let mut types = Vec::new();
        while let Ok(event) = rx.try_recv() {
            types.push(event.event_type());
        }
        types
    }

    fn row(status: &str, name: &str) -> RawRecord {
        RawRecord::from([
            ("Status".to_string(), status.to_string()),
            ("Item Name".to_string(), name.to_string()),
        ])
    }

    #[tokio::test]
    async fn test_idle_renders_loading() {
        let board = Board::new(Arc::new(ScriptedSource::new(vec![])), EventBus::new(8));
        assert_eq!(board.phase().await, LoadPhase::Idle);
        let html = board.render(&ItemFilter::new(ItemStatus::Found, ""), "").await;
        assert!(html.contains("state-loading"));
    }

    #[tokio::test]
    async fn test_reload_then_error_state() {
        let source = ScriptedSource::new(vec![Ok(vec![row("Found", "Blue Jacket")]), Err(503)]);
        let board = Board::new(Arc::new(source), EventBus::new(8));

        assert_eq!(board.reload(ReloadTrigger::Startup).await.unwrap(), 1);
        assert_eq!(board.phase().await, LoadPhase::Loaded);

        assert!(board.reload(ReloadTrigger::Manual).await.is_err());
        assert_eq!(board.phase().await, LoadPhase::LoadError);
        let status = board.status().await;
        assert!(status.last_error.unwrap().contains("503"));

        let html = board.render(&ItemFilter::new(ItemStatus::Found, ""), "").await;
        assert!(html.contains("state-error"));
    }

    #[tokio::test]
    async fn test_timer_reload_announces_only_changes() {
        let source = ScriptedSource::new(vec![
            Ok(vec![row("Found", "Keys")]),
            Ok(vec![row("Found", "Keys")]),
            Ok(vec![row("Found", "Keys"), row("Lost", "Pen")]),
        ]);
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let board = Board::new(Arc::new(source), bus);

        board.reload(ReloadTrigger::Startup).await.unwrap();
        board.reload(ReloadTrigger::Timer).await.unwrap();
        board.reload(ReloadTrigger::Timer).await.unwrap();

        let mut counts = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let BoardEvent::ItemsReloaded { count, .. } = event {
                counts.push(count);
            }
        }
        assert_eq!(counts, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_timer_reload_after_error_announces_recovery() {
        let source = ScriptedSource::new(vec![
            Ok(vec![row("Found", "Keys")]),
            Err(503),
            Ok(vec![row("Found", "Keys")]),
        ]);
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let board = Board::new(Arc::new(source), bus);

        board.reload(ReloadTrigger::Startup).await.unwrap();
        assert!(board.reload(ReloadTrigger::Timer).await.is_err());
        assert_eq!(board.reload(ReloadTrigger::Timer).await.unwrap(), 1);

        assert_eq!(
            drain_event_types(&mut rx),
            vec!["ItemsReloaded", "LoadFailed", "ItemsReloaded"]
        );
        assert_eq!(board.phase().await, LoadPhase::Loaded);
        assert!(board.status().await.last_error.is_none());
    }

    #[tokio::test]
    async fn test_older_load_finishing_last_is_discarded() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(ScriptedSource::gated(
            vec![
                Ok(vec![row("Found", "Old Scarf")]),
                Ok(vec![row("Found", "New Scarf"), row("Found", "Newer Scarf")]),
            ],
            Arc::clone(&gate),
        ));
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let board = Arc::new(Board::new(source.clone(), bus));

        let slow = tokio::spawn({
            let board = Arc::clone(&board);
            async move { board.reload(ReloadTrigger::Manual).await }
        });
        while source.calls() < 1 {
            tokio::task::yield_now().await;
        }

        assert_eq!(board.reload(ReloadTrigger::Manual).await.unwrap(), 2);
        gate.notify_one();
        assert_eq!(slow.await.unwrap().unwrap(), 2);

        let names: Vec<String> = board
            .visible_items(&ItemFilter::new(ItemStatus::Found, ""))
            .await
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Newer Scarf", "New Scarf"]);
        assert_eq!(board.phase().await, LoadPhase::Loaded);
        assert_eq!(drain_event_types(&mut rx), vec!["ItemsReloaded"]);
    }

    #[tokio::test]
    async fn test_poll_task_reloads_on_interval() {
        let source = ScriptedSource::new(vec![
            Ok(vec![row("Found", "Keys")]),
            Ok(vec![row("Found", "Keys"), row("Lost", "Pen")]),
        ]);
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let board = Arc::new(Board::new(Arc::new(source), bus));
        board.reload(ReloadTrigger::Startup).await.unwrap();

        let task = Arc::clone(&board).spawn_refresh_task(Duration::from_millis(20));
        let reloaded = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Ok(BoardEvent::ItemsReloaded { count: 2, .. }) = rx.recv().await {
                    break;
                }
            }
        })
        .await;
        task.abort();

        assert!(reloaded.is_ok(), "poll task never reloaded");
        assert_eq!(board.status().await.item_count, 2);
    }

    #[tokio::test]
    async fn test_view_changes_do_not_refetch() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(vec![
            row("Found", "Keys"),
            row("Lost", "Pen"),
        ])]));
        let board = Board::new(source.clone(), EventBus::new(8));
        board.reload(ReloadTrigger::Startup).await.unwrap();

        let found = board.visible_items(&ItemFilter::new(ItemStatus::Found, "")).await;
        let lost = board.visible_items(&ItemFilter::new(ItemStatus::Lost, "")).await;
        let searched = board.visible_items(&ItemFilter::new(ItemStatus::Lost, "pen")).await;
        assert_eq!(found.len(), 1);
        assert_eq!(lost.len(), 1);
        assert_eq!(searched.len(), 1);
        assert_eq!(source.calls(), 1);
    }
}
