//! Published spreadsheet source
//!
//! Fetches the spreadsheet's CSV export over HTTP and parses it with the
//! header row defining column names. Read-only: submissions for sheet
//! boards happen through an external form.

use async_trait::async_trait;
use lf_common::config::ColumnMapping;
use lf_common::normalize::RecordOrder;
use lf_common::RawRecord;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::debug;

use super::{ItemSource, SourceError};

const USER_AGENT: &str = concat!("lf-board/", env!("CARGO_PKG_VERSION"));

/// Polled CSV export of a published spreadsheet
pub struct SheetSource {
    http_client: Client,
    url: String,
    mapping: ColumnMapping,
}

impl SheetSource {
    pub fn new(url: impl Into<String>, mapping: ColumnMapping, timeout: Duration) -> Result<Self, SourceError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            url: url.into(),
            mapping,
        })
    }
}

#[async_trait]
impl ItemSource for SheetSource {
    fn name(&self) -> &'static str {
        "sheet"
    }

    fn column_mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    // Form responses are appended at the bottom
    fn record_order(&self) -> RecordOrder {
        RecordOrder::OldestFirst
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let response = self.http_client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let records = parse_sheet_csv(&body)?;
        debug!(rows = records.len(), "Fetched sheet CSV");
        Ok(records)
    }
}

/// Parse CSV text with a header row into records
///
/// Rows may be shorter or longer than the header; cells without a header
/// are ignored and rows whose cells are all blank are skipped.
pub fn parse_sheet_csv(text: &str) -> Result<Vec<RawRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, cell)| (name.to_string(), cell.to_string()))
            .collect();
        records.push(record);
    }

    Ok(records)
}
