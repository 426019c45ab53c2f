//! Filter engine
//!
//! Narrows the in-memory item set by tab, approval and free-text query.
//! Order is preserved, so a newest-first input stays newest first.

use crate::{Item, ItemStatus};

/// View selection applied to the item set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFilter {
    pub tab: ItemStatus,
    /// Trimmed, lower-cased query; empty matches everything
    pub query: String,
    pub require_approval: bool,
}

impl ItemFilter {
    /// Public-board filter (approval required)
    pub fn new(tab: ItemStatus, query: &str) -> Self {
        Self {
            tab,
            query: query.trim().to_lowercase(),
            require_approval: true,
        }
    }

    pub fn with_approval(mut self, require_approval: bool) -> Self {
        self.require_approval = require_approval;
        self
    }

    fn matches_query(&self, item: &Item) -> bool {
        if self.query.is_empty() {
            return true;
        }
        [
            item.name.as_str(),
            item.location.as_str(),
            item.description.as_str(),
            item.category.label(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.query))
    }

    pub fn matches(&self, item: &Item) -> bool {
        item.status == self.tab
            && (!self.require_approval || item.approved)
            && self.matches_query(item)
    }
}

/// Stable subsequence of `items` accepted by `filter`
pub fn filter_items<'a>(items: &'a [Item], filter: &ItemFilter) -> Vec<&'a Item> {
    items.iter().filter(|item| filter.matches(item)).collect()
}
