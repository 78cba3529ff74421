//! HTTP route table and handlers

use axum::{
    extract::State,
    http::header,
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use tutor_core::api::{build_summary, read_raw};

use super::{auth::require_bearer, sse::events_handler, AppState, HttpServerError};

const OPENAPI_YAML: &str = include_str!("openapi.yaml");

/// `/health` stays open; everything else sits behind the bearer check.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/status", get(status_handler))
        .route("/summary", get(summary_handler))
        .route("/events", get(events_handler))
        .route("/openapi.yaml", get(openapi_handler))
        .route("/docs-lite", get(docs_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected)
        .fallback(not_found_handler)
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// GET /status - the snapshot file exactly as written
async fn status_handler(State(state): State<AppState>) -> Result<Response, HttpServerError> {
    let raw = read_raw(&state.status_path)
        .ok_or_else(|| HttpServerError::NotFound("no status".into()))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], raw).into_response())
}

/// GET /summary
async fn summary_handler(State(state): State<AppState>) -> Result<Response, HttpServerError> {
    let summary = build_summary(&state.status_path, &state.events_path);
    let value =
        serde_json::to_value(&summary).map_err(|e| HttpServerError::Internal(e.to_string()))?;
    Ok(Json(value).into_response())
}

async fn openapi_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/yaml")], OPENAPI_YAML)
}

async fn docs_handler() -> Html<String> {
    Html(docs_page())
}

async fn not_found_handler() -> HttpServerError {
    HttpServerError::NotFound("not found".into())
}

fn docs_page() -> String {
    let escaped = OPENAPI_YAML
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Tutor Serve API (Lite)</title></head>\n\
         <body><h1>Tutor Serve API (Lite)</h1>\n\
         <ul>\n\
         <li><code>GET /health</code> liveness, no token required</li>\n\
         <li><code>GET /status</code> current status snapshot</li>\n\
         <li><code>GET /summary</code> failure summary of the last run</li>\n\
         <li><code>GET /events</code> server-sent events: status first, then each new record</li>\n\
         <li><code>GET /openapi.yaml</code> machine-readable description</li>\n\
         </ul>\n\
         <p>Send <code>Authorization: Bearer &lt;token&gt;</code>; the token is in <code>.tutor/serve.token</code>.</p>\n\
         <pre>{escaped}</pre>\n</body></html>\n"
    )
}
