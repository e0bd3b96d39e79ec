//! Response writing.
//!
//! # Responsibilities
//! - Wrap a handler's payload string into the final HTTP response
//!
//! # Design Decisions
//! - The payload is already the final representation; it is never re-encoded
//! - Exactly two fixed headers: permissive CORS origin and JSON content type
//! - Error responses are produced by `DispatchError`, not here

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Build the success response for a handler payload.
pub fn write_response(payload: String) -> Response {
    (
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::CONTENT_TYPE, "application/json"),
        ],
        payload,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_write_response() {
        let response = write_response("hello".to_string());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().len(), 2);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }
}
