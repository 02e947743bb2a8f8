// ABOUTME: Assigns or propagates x-request-id and wraps each request in a tracing span
// ABOUTME: The id is stored as a request extension and echoed on the response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id that is propagated as-is
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request id available to handlers as an extension
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Reuse a sane client request id or mint a new one
fn request_id_for(request: &Request<Body>) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        })
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned)
}

/// Attach a request id, run the request inside a span and echo the id back
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request_id_for(&request);
    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_is_reused_when_sane() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id_for(&request), "abc-123");
    }

    #[test]
    fn test_bad_client_id_is_replaced() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "has spaces")
            .body(Body::empty())
            .unwrap();
        let id = request_id_for(&request);
        assert_ne!(id, "has spaces");
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
