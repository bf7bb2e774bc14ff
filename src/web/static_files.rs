//! Embedded dashboard assets served via rust-embed

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use rust_embed::RustEmbed;

/// Dashboard assets embedded at build time from src/web/assets/
#[derive(RustEmbed)]
#[folder = "src/web/assets/"]
pub struct Assets;

/// Look up an embedded asset and build a response with its MIME type
fn respond_with_asset(path: &str) -> Response<Body> {
    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(content.data.into_owned()))
                .unwrap()
        }
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Not Found"))
            .unwrap(),
    }
}

/// Handler for the dashboard root
pub async fn index() -> impl IntoResponse {
    respond_with_asset("index.html")
}

/// Handler for the remaining static assets
pub async fn asset(axum::extract::Path(path): axum::extract::Path<String>) -> impl IntoResponse {
    respond_with_asset(path.trim_start_matches('/'))
}
