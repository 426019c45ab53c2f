//! # Lost & Found Common Library
//!
//! Shared code for the lost & found board service:
//! - Canonical item model
//! - Row normalization with declared column mappings
//! - Keyword classifier
//! - Tab/approval/search filter engine
//! - HTML fragment renderer
//! - Configuration loading
//! - Event bus and SSE helpers

pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod item;
pub mod normalize;
pub mod render;
pub mod sse;

pub use error::{Error, Result};
pub use item::{Category, Item, ItemStatus, RawRecord, ReviewStatus};
