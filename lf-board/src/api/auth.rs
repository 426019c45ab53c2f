//! Admin gate middleware
//!
//! Review actions need the document store to be present. When an admin
//! token is configured, requests must also present it, either in the
//! `x-admin-token` header or (for `EventSource`, which cannot set headers)
//! in the `token` query parameter.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Decoded `token` query parameter
fn query_token(request: &Request) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.token)
}

fn presented_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| query_token(request))
}

/// Admin gate middleware
pub async fn admin_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.store.is_none() {
        return Err(ApiError::Unavailable(
            "Review requires the document store backend".to_string(),
        ));
    }

    if let Some(expected) = &state.admin_token {
        if presented_token(&request).as_deref() != Some(expected.as_str()) {
            warn!("Rejected admin request to {}", request.uri().path());
            return Err(ApiError::Unauthorized);
        }
    }

    Ok(next.run(request).await)
}
