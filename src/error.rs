//! Request-time error types.
//!
//! Every terminal dispatch condition surfaces the same way: a plain-text
//! `500 Internal Server Error` whose body is the error message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::security::identity::IdentityError;

/// Terminal conditions of a dispatched request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The path does not fit `/{controller}/{id}/{action}/{filter}`.
    #[error("{0}")]
    MalformedRequest(String),

    /// Identity headers were present but unusable.
    #[error(transparent)]
    Unauthorized(#[from] IdentityError),

    /// No route is registered for the resolved method name.
    #[error("Method \"{0}\" not found")]
    RouteNotFound(String),

    /// The body could not be read or decoded into the handler's payload.
    #[error("Failed to read JSON data: {0}")]
    MalformedBody(String),

    /// The handler ran and returned an error.
    #[error("Internal error calling controller method: {0}")]
    HandlerFailure(String),
}

impl DispatchError {
    /// All dispatch failures share one status class.
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "malformed_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::RouteNotFound(_) => "route_not_found",
            Self::MalformedBody(_) => "malformed_body",
            Self::HandlerFailure(_) => "handler_failure",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
