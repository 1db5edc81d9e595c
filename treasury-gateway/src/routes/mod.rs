//! HTTP route handlers and shared response builders.

pub mod health;
pub mod proxy;
pub mod views;

pub use health::health_check;
pub use proxy::handle_passthrough;
pub use views::handle_view;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Serialize `body` as a JSON response with permissive CORS.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"Serialization failed"}"#.to_vec(),
            )
        }
    };

    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// `{ "message", "error" }` body used for upstream and cache failures.
pub fn failure_response(
    status: StatusCode,
    message: &str,
    error: impl std::fmt::Display,
) -> Response<Full<Bytes>> {
    json_response(
        status,
        &serde_json::json!({
            "message": message,
            "error": error.to_string(),
        }),
    )
}

/// Attach a `Cache-Control` directive.
pub fn with_cache_control(
    mut response: Response<Full<Bytes>>,
    directive: &'static str,
) -> Response<Full<Bytes>> {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(directive));
    response
}

/// CORS preflight response
pub fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    response
}

/// Not found response
pub fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not Found",
            "path": path,
        }),
    )
}

/// Method not allowed response
pub fn method_not_allowed_response(method: &hyper::Method, path: &str) -> Response<Full<Bytes>> {
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({
            "error": "Method Not Allowed",
            "method": method.as_str(),
            "path": path,
        }),
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, OPTIONS"));
    response
}

/// Bad request response
pub fn bad_request_response(message: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::BAD_REQUEST,
        &serde_json::json!({
            "error": "Bad Request",
            "message": message,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_failure_body_shape() {
        let response = failure_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unable to load treasury data",
            "boom",
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = body_json(response).await;
        assert_eq!(body["message"], "Unable to load treasury data");
        assert_eq!(body["error"], "boom");
    }

    #[test]
    fn test_preflight_headers() {
        let response = preflight_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
    }

    #[test]
    fn test_method_not_allowed_lists_allowed_methods() {
        let response = method_not_allowed_response(&hyper::Method::POST, "/health");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, OPTIONS");
    }
}
