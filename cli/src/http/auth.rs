use std::io::Write;
use std::path::Path;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AppState, HttpServerError};

/// Fresh opaque token for one server lifetime.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Persist the token so local clients can read it; owner-only on Unix.
pub fn write_token_file(path: &Path, token: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut opts = std::fs::OpenOptions::new();
    opts.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;
    file.write_all(token.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()
}

/// Exact `Authorization: Bearer <token>` match, unless auth is disabled.
pub fn is_authorized(state: &AppState, req: &Request) -> bool {
    let Some(token) = state.token.as_deref() else {
        return true;
    };
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|presented| presented == token)
        .unwrap_or(false)
}

pub async fn require_bearer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if is_authorized(&state, &req) {
        return next.run(req).await;
    }
    tracing::debug!(target: "tutor.serve", uri = %req.uri(), "rejected request without valid bearer token");
    HttpServerError::Unauthorized.into_response()
}
