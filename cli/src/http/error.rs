use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

#[derive(Debug)]
pub enum HttpServerError {
    Unauthorized,
    NotFound(String),
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            HttpServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            HttpServerError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            HttpServerError::Internal(m) => {
                tracing::error!(target: "tutor.serve", error = %m, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}
