//! UI serving routes
//!
//! Serves the static page shells; item markup comes from the fragment
//! endpoints.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

const INDEX_HTML: &str = include_str!("../ui/index.html");
const ADMIN_HTML: &str = include_str!("../ui/admin.html");
const APP_JS: &str = include_str!("../ui/app.js");
const ADMIN_JS: &str = include_str!("../ui/admin.js");
const STYLE_CSS: &str = include_str!("../ui/style.css");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /admin
pub async fn serve_admin() -> Html<&'static str> {
    Html(ADMIN_HTML)
}

fn asset(content_type: &'static str, body: &'static str) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    asset("application/javascript", APP_JS)
}

/// GET /static/admin.js
pub async fn serve_admin_js() -> Response {
    asset("application/javascript", ADMIN_JS)
}

/// GET /static/style.css
pub async fn serve_style_css() -> Response {
    asset("text/css", STYLE_CSS)
}
