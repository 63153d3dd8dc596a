//! Security headers middleware
//!
//! The API only ever returns JSON, so the policy is locked down: nothing may
//! be loaded or framed, and no response (tokens included) is cached.
//! Strict-Transport-Security is only sent when cookies are marked `Secure`,
//! which is the signal that the service sits behind HTTPS.

use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

pub async fn security_headers_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if state.config.auth.cookie_secure {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use axum::{
        http::StatusCode, middleware, response::IntoResponse, routing::get, Router,
    };
    use recicla_core::AppConfig;
    use tower::ServiceExt;

    async fn app(cookie_secure: bool) -> Router {
        let mut config = AppConfig::default();
        config.auth.cookie_secure = cookie_secure;
        let pool = db::connect_in_memory().await.unwrap();
        let state = Arc::new(AppState::new(config, pool).unwrap());

        async fn failing() -> impl IntoResponse {
            (StatusCode::NOT_FOUND, "missing")
        }

        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/missing", get(failing))
            .layer(middleware::from_fn_with_state(
                state,
                security_headers_middleware,
            ))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_security_headers_added() {
        let response = app(false).await.oneshot(get_request("/ok")).await.unwrap();
        let headers = response.headers();

        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
    }

    #[tokio::test]
    async fn test_hsts_follows_secure_cookies() {
        let response = app(true).await.oneshot(get_request("/ok")).await.unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::STRICT_TRANSPORT_SECURITY)
                .unwrap(),
            "max-age=31536000; includeSubDomains"
        );
    }

    #[tokio::test]
    async fn test_security_headers_on_error_response() {
        let response = app(false)
            .await
            .oneshot(get_request("/missing"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::X_FRAME_OPTIONS).is_some());
    }
}
