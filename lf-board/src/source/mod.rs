//! Data-source adapters
//!
//! The board is parameterised by one [`ItemSource`]: a polled CSV export of
//! a published spreadsheet ([`SheetSource`]) or the local document store
//! with a live change feed ([`DocumentStore`]).

use async_trait::async_trait;
use lf_common::config::ColumnMapping;
use lf_common::events::BoardEvent;
use lf_common::normalize::RecordOrder;
use lf_common::RawRecord;
use thiserror::Error;
use tokio::sync::broadcast;

pub mod sheet;
pub mod store;

pub use sheet::{parse_sheet_csv, SheetSource};
pub use store::{DocumentStore, NewItem};

/// Failure while loading records from a backing store
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Source responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Backing store feeding the public board
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Short name for logs and status output
    fn name(&self) -> &'static str;

    /// How this source's records map onto item fields
    fn column_mapping(&self) -> &ColumnMapping;

    fn record_order(&self) -> RecordOrder;

    /// Load the full current record set
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError>;

    /// Live change feed; `None` means the source has to be polled
    fn subscribe(&self) -> Option<broadcast::Receiver<BoardEvent>> {
        None
    }
}
