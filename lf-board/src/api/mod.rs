//! HTTP API handlers for lf-board

pub mod admin;
pub mod auth;
pub mod health;
pub mod items;
pub mod sse;
pub mod ui;

pub use admin::{approve_item, deny_item, pending_list, review_counts};
pub use auth::admin_gate;
pub use health::health_routes;
pub use items::{board_status, items_fragment, items_json, refresh, submit_item};
pub use sse::{admin_event_stream, board_event_stream};
pub use ui::{serve_admin, serve_admin_js, serve_app_js, serve_index, serve_style_css};
