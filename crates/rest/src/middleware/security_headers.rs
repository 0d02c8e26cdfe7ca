//! Security headers middleware.
//!
//! Adds browser hardening headers to every response, errors included.

use axum::{extract::Request, middleware::Next, response::Response};
use http::{HeaderName, HeaderValue};

/// `X-Frame-Options` header name.
pub static X_FRAME_OPTIONS: HeaderName = HeaderName::from_static("x-frame-options");

/// `X-Content-Type-Options` header name.
pub static X_CONTENT_TYPE_OPTIONS: HeaderName = HeaderName::from_static("x-content-type-options");

/// `X-XSS-Protection` header name.
pub static X_XSS_PROTECTION: HeaderName = HeaderName::from_static("x-xss-protection");

/// `Referrer-Policy` header name.
pub static REFERRER_POLICY: HeaderName = HeaderName::from_static("referrer-policy");

/// `Permissions-Policy` header name.
pub static PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Header names and values applied by [`security_headers_middleware`].
pub fn security_headers() -> [(&'static HeaderName, HeaderValue); 5] {
    [
        (&X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (&X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (&X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")),
        (
            &REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            &PERMISSIONS_POLICY,
            HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
        ),
    ]
}

/// Middleware function adding the security headers.
///
/// This can be used with `axum::middleware::from_fn`.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    for (name, value) in security_headers() {
        headers.insert(name.clone(), value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_headers_added() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(security_headers_middleware));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[&X_FRAME_OPTIONS], "DENY");
        assert_eq!(response.headers()[&X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[&X_XSS_PROTECTION], "1; mode=block");
        assert_eq!(
            response.headers()[&REFERRER_POLICY],
            "strict-origin-when-cross-origin"
        );
        assert_eq!(
            response.headers()[&PERMISSIONS_POLICY],
            "geolocation=(), microphone=(), camera=()"
        );
    }

    #[tokio::test]
    async fn test_headers_on_not_found() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(security_headers_middleware));

        let response = app
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[&X_FRAME_OPTIONS], "DENY");
    }
}
