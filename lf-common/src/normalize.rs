//! Row normalizer
//!
//! Converts heterogeneous [`RawRecord`]s into canonical [`Item`]s using a
//! declared [`ColumnMapping`]. Normalization never fails: missing text
//! fields stay empty (the renderer shows a placeholder), unparsable dates get
//! a placeholder, and records without a name are dropped.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::classify::classify;
use crate::config::ColumnMapping;
use crate::item::NOT_SPECIFIED;
use crate::{Item, ItemStatus, RawRecord};

/// Shown when a date is present but cannot be parsed
pub const DATE_UNKNOWN: &str = "Date unknown";

const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"];

/// Order in which a source delivers its records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrder {
    /// Append-only sources (spreadsheet responses)
    OldestFirst,
    /// Sources already sorted newest first (document store queries)
    NewestFirst,
}

/// Look up the first declared column with a non-blank value
fn lookup<'a>(record: &'a RawRecord, candidates: &[String]) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        let candidate = candidate.trim();
        record
            .iter()
            .find(|(key, value)| {
                key.trim().eq_ignore_ascii_case(candidate) && !value.trim().is_empty()
            })
            .map(|(_, value)| value.trim())
    })
}

/// Whether an approval cell reads as approved
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "x" | "approved"
    )
}

/// Parse the date and time formats seen in sheets and documents
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn format_display_date(dt: &NaiveDateTime) -> String {
    dt.format("%b %-d, %Y").to_string()
}

/// Display date: the date field, else the timestamp, else a placeholder
fn display_date(date: Option<&str>, timestamp: Option<&NaiveDateTime>) -> String {
    match date {
        Some(text) => match parse_datetime(text) {
            Some(dt) => format_display_date(&dt),
            None => DATE_UNKNOWN.to_string(),
        },
        None => timestamp
            .map(format_display_date)
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
    }
}

fn text_or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Normalize one record; `None` when it has no name
pub fn normalize_record(index: usize, record: &RawRecord, mapping: &ColumnMapping) -> Option<Item> {
    let name = lookup(record, &mapping.name)?.to_string();

    let id = lookup(record, &mapping.id)
        .map(str::to_string)
        .unwrap_or_else(|| index.to_string());
    let status = ItemStatus::from_source(lookup(record, &mapping.status).unwrap_or(""));
    let approved = lookup(record, &mapping.approved)
        .map(is_truthy)
        .unwrap_or(mapping.approved_by_default);
    let timestamp = lookup(record, &mapping.timestamp).and_then(parse_datetime);
    let date = display_date(lookup(record, &mapping.date), timestamp.as_ref());
    let category = classify(&name);

    Some(Item {
        id,
        status,
        approved,
        name,
        location: text_or_empty(lookup(record, &mapping.location)),
        description: text_or_empty(lookup(record, &mapping.description)),
        contact: text_or_empty(lookup(record, &mapping.contact)),
        date,
        timestamp,
        category,
    })
}

/// Normalize a batch and order it newest first
///
/// Nameless records are dropped. Oldest-first batches are reversed, then a
/// stable sort puts dated items newest first ahead of undated ones.
pub fn normalize_records(
    records: &[RawRecord],
    mapping: &ColumnMapping,
    order: RecordOrder,
) -> Vec<Item> {
    let mut items: Vec<Item> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| normalize_record(index, record, mapping))
        .collect();

    if order == RecordOrder::OldestFirst {
        items.reverse();
    }

    items.sort_by(|a, b| match (&a.timestamp, &b.timestamp) {
        (Some(ta), Some(tb)) => tb.cmp(ta),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    fn row(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_full_row() {
        let record = row(&[
            ("Timestamp", "9/14/2025 8:03:12"),
            ("Status", " Found "),
            ("Item Name", "Blue Jacket"),
            ("Location", "Gym"),
            ("Date", "9/13/2025"),
            ("Contact Email", "student@school.org"),
        ]);
        let item = normalize_record(3, &record, &ColumnMapping::spreadsheet()).unwrap();

        assert_eq!(item.id, "3");
        assert_eq!(item.status, ItemStatus::Found);
        assert!(item.approved);
        assert_eq!(item.name, "Blue Jacket");
        assert_eq!(item.location, "Gym");
        assert_eq!(item.date, "Sep 13, 2025");
        assert_eq!(item.contact, "student@school.org");
        assert_eq!(item.category, Category::Clothing);
        assert!(item.timestamp.is_some());
    }

    #[test]
    fn test_missing_name_is_dropped() {
        let record = row(&[("Status", "Lost"), ("Item Name", "   "), ("Location", "Gym")]);
        assert!(normalize_record(0, &record, &ColumnMapping::spreadsheet()).is_none());
    }

    #[test]
    fn test_missing_fields_stay_empty() {
        let record = row(&[("Item Name", "Umbrella")]);
        let item = normalize_record(0, &record, &ColumnMapping::spreadsheet()).unwrap();

        assert_eq!(item.status, ItemStatus::Found);
        assert_eq!(item.location, "");
        assert_eq!(item.description, "");
        assert_eq!(item.contact, "");
        assert_eq!(item.date, NOT_SPECIFIED);
    }

    #[test]
    fn test_unparsable_date_uses_placeholder() {
        let record = row(&[("Item Name", "Keys"), ("Date", "last tuesday-ish")]);
        let item = normalize_record(0, &record, &ColumnMapping::spreadsheet()).unwrap();
        assert_eq!(item.date, DATE_UNKNOWN);
    }

    #[test]
    fn test_date_falls_back_to_timestamp() {
        let record = row(&[("Item Name", "Keys"), ("Timestamp", "2025-10-01 12:00:00")]);
        let item = normalize_record(0, &record, &ColumnMapping::spreadsheet()).unwrap();
        assert_eq!(item.date, "Oct 1, 2025");
    }

    #[test]
    fn test_column_names_case_and_whitespace_insensitive() {
        let record = row(&[(" item name ", "Water Bottle"), ("STATUS", "lost")]);
        let item = normalize_record(0, &record, &ColumnMapping::spreadsheet()).unwrap();
        assert_eq!(item.name, "Water Bottle");
        assert_eq!(item.status, ItemStatus::Lost);
    }

    #[test]
    fn test_first_declared_candidate_wins() {
        let record = row(&[("Item", "Second choice"), ("Item Name", "First choice")]);
        let item = normalize_record(0, &record, &ColumnMapping::spreadsheet()).unwrap();
        assert_eq!(item.name, "First choice");
    }

    #[test]
    fn test_blank_candidate_falls_through() {
        let record = row(&[("Item Name", ""), ("Title", "Fallback title")]);
        let item = normalize_record(0, &record, &ColumnMapping::spreadsheet()).unwrap();
        assert_eq!(item.name, "Fallback title");
    }

    #[test]
    fn test_approval_column() {
        let mapping = ColumnMapping::spreadsheet();
        let yes = normalize_record(0, &row(&[("Item Name", "Pen"), ("Approved", "Yes")]), &mapping);
        let no = normalize_record(0, &row(&[("Item Name", "Pen"), ("Approved", "no")]), &mapping);
        assert!(yes.unwrap().approved);
        assert!(!no.unwrap().approved);

        let doc = normalize_record(0, &row(&[("title", "Pen")]), &ColumnMapping::document());
        assert!(!doc.unwrap().approved);
    }

    #[test]
    fn test_document_mapping() {
        let record = row(&[
            ("id", "abc-123"),
            ("title", "Chromebook"),
            ("type", "lost"),
            ("approved", "true"),
            ("created_at", "2025-10-02T14:30:00+00:00"),
            ("user_email", "kid@school.org"),
        ]);
        let item = normalize_record(7, &record, &ColumnMapping::document()).unwrap();
        assert_eq!(item.id, "abc-123");
        assert_eq!(item.status, ItemStatus::Lost);
        assert!(item.approved);
        assert_eq!(item.date, "Oct 2, 2025");
        assert_eq!(item.category, Category::Electronics);
    }

    #[test]
    fn test_oldest_first_is_reversed() {
        let records = vec![
            row(&[("Item Name", "First")]),
            row(&[("Item Name", "Second")]),
            row(&[("Item Name", "Third")]),
        ];
        let items = normalize_records(&records, &ColumnMapping::spreadsheet(), RecordOrder::OldestFirst);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[test]
    fn test_sorted_newest_first_by_timestamp() {
        let records = vec![
            row(&[("Item Name", "Undated")]),
            row(&[("Item Name", "Older"), ("Timestamp", "9/1/2025 10:00:00")]),
            row(&[("Item Name", "Newer"), ("Timestamp", "9/20/2025 10:00:00")]),
        ];
        let items = normalize_records(&records, &ColumnMapping::spreadsheet(), RecordOrder::NewestFirst);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "Older", "Undated"]);
    }
}
