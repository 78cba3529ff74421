//! Cross-cutting layers: localhost-only CORS, request timeout, access log.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};
use tracing::{info, warn};

pub fn create_middleware_stack(
    request_timeout: Duration,
) -> tower::layer::util::Stack<CorsLayer, TimeoutLayer> {
    tower::layer::util::Stack::new(create_cors_layer(), TimeoutLayer::new(request_timeout))
}

/// Browser dashboards on localhost may read the API; nothing else.
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            |origin: &HeaderValue, _| {
                origin
                    .to_str()
                    .map(is_local_origin)
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::ACCEPT, header::CACHE_CONTROL])
        .max_age(Duration::from_secs(3600))
}

fn is_local_origin(origin: &str) -> bool {
    ["http://localhost", "https://localhost", "http://127.0.0.1", "https://127.0.0.1"]
        .iter()
        .any(|p| origin.starts_with(p))
}

pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis();
    if status.is_client_error() || status.is_server_error() {
        warn!(
            target: "tutor.serve",
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            "request failed"
        );
    } else {
        info!(
            target: "tutor.serve",
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            "request completed"
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        middleware,
        response::IntoResponse,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn ok_handler() -> impl IntoResponse {
        "OK"
    }

    async fn slow_handler() -> impl IntoResponse {
        tokio::time::sleep(Duration::from_millis(500)).await;
        "late"
    }

    fn request(method: Method, origin: Option<&str>) -> Request<Body> {
        let mut b = Request::builder().method(method).uri("/test");
        if let Some(o) = origin {
            b = b.header("Origin", o);
        }
        b.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn cors_allows_localhost_origins() {
        let app = Router::new()
            .route("/test", get(ok_handler))
            .layer(create_cors_layer());
        let resp = app
            .oneshot(request(Method::GET, Some("http://localhost:3000")))
            .await
            .unwrap();
        let allowed = resp
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok());
        assert_eq!(allowed, Some("http://localhost:3000"));
    }

    #[tokio::test]
    async fn cors_ignores_remote_origins() {
        let app = Router::new()
            .route("/test", get(ok_handler))
            .layer(create_cors_layer());
        let resp = app
            .oneshot(request(Method::GET, Some("https://evil.example")))
            .await
            .unwrap();
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn preflight_lists_get() {
        let app = Router::new()
            .route("/test", get(ok_handler))
            .layer(create_cors_layer());
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/test")
            .header("Origin", "http://127.0.0.1:8080")
            .header("Access-Control-Request-Method", "GET")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.status().is_success());
        let methods = resp
            .headers()
            .get("access-control-allow-methods")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(methods.contains("GET"));
    }

    #[tokio::test]
    async fn request_logger_passes_responses_through() {
        let app = Router::new()
            .route("/test", get(ok_handler))
            .layer(middleware::from_fn(request_logger));
        let resp = app.oneshot(request(Method::GET, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn slow_handlers_time_out() {
        let app = Router::new()
            .route("/test", get(slow_handler))
            .layer(create_middleware_stack(Duration::from_millis(50)));
        let resp = app.oneshot(request(Method::GET, None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
