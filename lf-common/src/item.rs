//! Canonical item model
//!
//! Every backing store (published spreadsheet rows, document store records)
//! is converted into [`RawRecord`]s and then normalized into [`Item`]s.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// One external record: column (or field) name to raw string value
pub type RawRecord = BTreeMap<String, String>;

/// Placeholder shown for any optional text field that is missing
pub const NOT_SPECIFIED: &str = "Not specified";

/// Lost/found classification of an item
///
/// Also used as the tab selector of the public board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Lost,
    Found,
}

impl ItemStatus {
    /// Normalize free source text into a status
    ///
    /// Only "lost" (any case, surrounding whitespace ignored) maps to
    /// [`ItemStatus::Lost`]; empty or unrecognized text is treated as found.
    pub fn from_source(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("lost") {
            ItemStatus::Lost
        } else {
            ItemStatus::Found
        }
    }

    /// Lower-case identifier ("lost" / "found"), used in CSS classes and URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Lost => "lost",
            ItemStatus::Found => "found",
        }
    }

    /// Capitalized display label ("Lost" / "Found")
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Lost => "Lost",
            ItemStatus::Found => "Found",
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Found
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse for tab selection (request parameters)
impl FromStr for ItemStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lost" => Ok(ItemStatus::Lost),
            "found" => Ok(ItemStatus::Found),
            other => Err(Error::InvalidInput(format!(
                "Unknown tab '{}' (expected 'lost' or 'found')",
                other
            ))),
        }
    }
}

/// Coarse category inferred from the item name, used for icon selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Clothing,
    Accessories,
    School,
    Sports,
    Other,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Clothing => "clothing",
            Category::Accessories => "accessories",
            Category::School => "school",
            Category::Sports => "sports",
            Category::Other => "other",
        }
    }

    /// Font Awesome icon class for the category
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Electronics => "fa-solid fa-laptop",
            Category::Clothing => "fa-solid fa-shirt",
            Category::Accessories => "fa-solid fa-glasses",
            Category::School => "fa-solid fa-book",
            Category::Sports => "fa-solid fa-basketball",
            Category::Other => "fa-solid fa-box",
        }
    }
}

/// Administrative review state of a document store submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Denied,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Denied => "denied",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "denied" => Ok(ReviewStatus::Denied),
            other => Err(Error::InvalidInput(format!("Unknown review status '{}'", other))),
        }
    }
}

/// One lost-or-found report in canonical shape
///
/// Items are rebuilt wholesale on every load; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: String,
    pub status: ItemStatus,
    /// Cleared by an administrator for public display
    pub approved: bool,
    pub name: String,
    pub location: String,
    pub description: String,
    pub contact: String,
    /// Display date (already formatted or a placeholder)
    pub date: String,
    /// Submission instant, when the source provided a parsable one
    pub timestamp: Option<NaiveDateTime>,
    pub category: Category,
}

impl Item {
    /// Contact address if it looks like an e-mail address
    pub fn contact_email(&self) -> Option<&str> {
        let contact = self.contact.trim();
        if contact.contains('@') && !contact.contains(char::is_whitespace) {
            Some(contact)
        } else {
            None
        }
    }
}
