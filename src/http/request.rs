//! Request parsing.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Turn the URL path into a `ControllerRequest` descriptor
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The path is percent-decoded before it is split, so `%2F` separates segments
//! - Path segments are positional: `/{controller}/{id}/{action}/{filter}`
//! - Segments beyond the fourth are ignored

use axum::http::{HeaderValue, Request};
use percent_encoding::percent_decode_str;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::routing::naming::title_case;
use crate::security::identity::Identity;

/// Header carrying the request ID, in and out.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Makes a fresh UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Routing-relevant view of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerRequest {
    /// First segment, Title-cased. Never empty for parsed requests.
    pub controller_name: String,
    /// Second segment as given.
    pub item_id: String,
    /// Third segment, Title-cased.
    pub action: String,
    /// Fourth segment as given.
    pub action_filter: String,
    pub identity: Identity,
}

impl ControllerRequest {
    /// Parse the raw (still percent-encoded) URL `path` into a descriptor.
    pub fn from_path(path: &str, identity: Identity) -> Result<Self, DispatchError> {
        let decoded = percent_decode_str(path).decode_utf8().map_err(|e| {
            DispatchError::MalformedRequest(format!("Malformed URL. Invalid encoding: {e}"))
        })?;
        let path = remove_trailing_slash(&decoded);
        let mut segments = path.split('/').skip(1);

        let controller = segments.next().unwrap_or_default();
        if controller.is_empty() {
            return Err(DispatchError::MalformedRequest(
                "Malformed URL. Expected: /{controller}".to_string(),
            ));
        }

        Ok(Self {
            controller_name: title_case(controller),
            item_id: segments.next().unwrap_or_default().to_string(),
            action: segments.next().map(title_case).unwrap_or_default(),
            action_filter: segments.next().unwrap_or_default().to_string(),
            identity,
        })
    }
}

/// Strip one trailing `/`, leaving the root path alone.
pub fn remove_trailing_slash(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    path.strip_suffix('/').unwrap_or(path)
}
