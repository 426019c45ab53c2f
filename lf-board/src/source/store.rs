//! Document store source
//!
//! SQLite-backed store of submitted reports. The public board reads
//! approved documents; the admin review reads pending ones and flips their
//! review status. Every write is announced on the event bus, which serves
//! as the store's live subscription feed.

use async_trait::async_trait;
use chrono::Utc;
use lf_common::config::ColumnMapping;
use lf_common::events::{BoardEvent, EventBus};
use lf_common::normalize::{normalize_records, RecordOrder};
use lf_common::{Error, Item, ItemStatus, RawRecord, Result, ReviewStatus};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::path::Path;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use super::{ItemSource, SourceError};

const SELECT_COLUMNS: &str =
    "SELECT id, title, type, description, location, user_email, date, status, approved, created_at FROM items";

type DocumentRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    bool,
    String,
);

fn to_record(row: DocumentRow) -> RawRecord {
    let (id, title, kind, description, location, user_email, date, status, approved, created_at) = row;
    RawRecord::from([
        ("id".to_string(), id),
        ("title".to_string(), title),
        ("type".to_string(), kind),
        ("description".to_string(), description),
        ("location".to_string(), location),
        ("user_email".to_string(), user_email),
        ("date".to_string(), date),
        ("status".to_string(), status),
        ("approved".to_string(), approved.to_string()),
        ("created_at".to_string(), created_at),
    ])
}

/// A report submitted through the board's form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewItem {
    pub title: String,
    /// "lost" or "found"
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub location: String,
    pub email: String,
    pub date: String,
}

impl NewItem {
    /// Emptiness checks only; returns the normalized lost/found status
    pub fn validate(&self) -> Result<ItemStatus> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("Item name is required".to_string()));
        }
        if self.kind.trim().is_empty() {
            return Err(Error::InvalidInput("Item type (lost or found) is required".to_string()));
        }
        Ok(ItemStatus::from_source(&self.kind))
    }
}

/// SQLite document store
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
    events: EventBus,
    mapping: ColumnMapping,
}

impl DocumentStore {
    pub fn new(pool: SqlitePool, events: EventBus) -> Self {
        Self {
            pool,
            events,
            mapping: ColumnMapping::document(),
        }
    }

    /// Open the database file (creating schema as needed)
    pub async fn open(db_path: &Path, events: EventBus) -> Result<Self> {
        let pool = crate::db::init_database(db_path).await?;
        Ok(Self::new(pool, events))
    }

    /// Publicly visible documents, newest first, optionally of one type
    pub async fn approved_documents(
        &self,
        kind: Option<ItemStatus>,
    ) -> std::result::Result<Vec<RawRecord>, sqlx::Error> {
        let rows: Vec<DocumentRow> = match kind {
            Some(kind) => {
                sqlx::query_as(&format!(
                    "{} WHERE approved = 1 AND type = ? ORDER BY created_at DESC",
                    SELECT_COLUMNS
                ))
                .bind(kind.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "{} WHERE approved = 1 ORDER BY created_at DESC",
                    SELECT_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(to_record).collect())
    }

    /// Documents awaiting review, newest first
    pub async fn pending_documents(&self) -> std::result::Result<Vec<RawRecord>, sqlx::Error> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "{} WHERE status = 'pending' ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(to_record).collect())
    }

    /// Pending documents normalized for the admin review list
    pub async fn pending_items(&self) -> std::result::Result<Vec<Item>, sqlx::Error> {
        let records = self.pending_documents().await?;
        Ok(normalize_records(&records, &self.mapping, RecordOrder::NewestFirst))
    }

    pub async fn count_by_review(&self, status: ReviewStatus) -> std::result::Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
    }

    /// Insert a new unapproved report; returns its id
    pub async fn create_item(&self, new: &NewItem) -> Result<String> {
        let kind = new.validate()?;
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO items (id, title, type, description, location, user_email, date, status, approved, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', 0, ?)",
        )
        .bind(&id)
        .bind(new.title.trim())
        .bind(kind.as_str())
        .bind(new.description.trim())
        .bind(new.location.trim())
        .bind(new.email.trim())
        .bind(new.date.trim())
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        info!(id = %id, kind = %kind, "Stored new report");
        self.events.emit_lossy(BoardEvent::ItemSubmitted {
            id: id.clone(),
            timestamp: Utc::now(),
        });

        Ok(id)
    }

    /// Approve or deny a submission
    pub async fn set_review_status(&self, id: &str, decision: ReviewStatus) -> Result<()> {
        let approved = match decision {
            ReviewStatus::Approved => true,
            ReviewStatus::Denied => false,
            ReviewStatus::Pending => {
                return Err(Error::InvalidInput(
                    "Review decision must be approved or denied".to_string(),
                ))
            }
        };

        let result = sqlx::query("UPDATE items SET status = ?, approved = ? WHERE id = ?")
            .bind(decision.as_str())
            .bind(approved)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Item {}", id)));
        }

        info!(id = %id, decision = %decision, "Reviewed report");
        self.events.emit_lossy(BoardEvent::ItemReviewed {
            id: id.to_string(),
            decision,
            timestamp: Utc::now(),
        });

        Ok(())
    }
}

#[async_trait]
impl ItemSource for DocumentStore {
    fn name(&self) -> &'static str {
        "store"
    }

    fn column_mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    fn record_order(&self) -> RecordOrder {
        RecordOrder::NewestFirst
    }

    async fn fetch(&self) -> std::result::Result<Vec<RawRecord>, SourceError> {
        Ok(self.approved_documents(None).await?)
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<BoardEvent>> {
        Some(self.events.subscribe())
    }
}
