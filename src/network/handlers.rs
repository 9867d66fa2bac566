//! Request handlers
//!
//! Turn an HTTP request into a protocol [`Request`], run it through the
//! engine and render the XML document.

use std::sync::Arc;

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;

use crate::cursor::Scope;
use crate::engine::Engine;
use crate::protocol::{ErrorKind, Request};
use crate::render;

type Pairs = Vec<(String, String)>;

pub(super) async fn global_get(
    State(engine): State<Arc<Engine>>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(pairs): Query<Pairs>,
) -> Response {
    harvest(&engine, Scope::Global, pairs, &base_url(&headers, uri.path())).await
}

pub(super) async fn global_post(
    State(engine): State<Arc<Engine>>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Form(pairs): Form<Pairs>,
) -> Response {
    harvest(&engine, Scope::Global, pairs, &base_url(&headers, uri.path())).await
}

pub(super) async fn repository_get(
    State(engine): State<Arc<Engine>>,
    Path(repo_id): Path<String>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Query(pairs): Query<Pairs>,
) -> Response {
    let scope = Scope::Repository(repo_id);
    harvest(&engine, scope, pairs, &base_url(&headers, uri.path())).await
}

pub(super) async fn repository_post(
    State(engine): State<Arc<Engine>>,
    Path(repo_id): Path<String>,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    Form(pairs): Form<Pairs>,
) -> Response {
    let scope = Scope::Repository(repo_id);
    harvest(&engine, scope, pairs, &base_url(&headers, uri.path())).await
}

pub(super) async fn health() -> &'static str {
    "ok"
}

/// Run one protocol request and render it
///
/// Protocol errors are ordinary 200 documents; only backend failure
/// changes the status.
async fn harvest(engine: &Engine, scope: Scope, pairs: Pairs, base_url: &str) -> Response {
    let response = engine.handle(Request::from_pairs(scope, pairs)).await;

    let status = match &response.outcome {
        Err(err) if err.kind == ErrorKind::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    match render::render(&response, base_url) {
        Ok(xml) => (status, [(header::CONTENT_TYPE, "text/xml; charset=utf-8")], xml).into_response(),
        Err(e) => {
            tracing::error!("Failed to render response: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render response").into_response()
        }
    }
}

/// Endpoint URL as the harvester addressed it
fn base_url(headers: &HeaderMap, path: &str) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}{path}")
}
