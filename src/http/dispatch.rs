//! Request dispatch.
//!
//! # Responsibilities
//! - Build the `ControllerRequest` for each inbound request
//! - Resolve the method name from the HTTP verb and descriptor
//! - Look up the registered route and invoke it
//! - Turn every terminal condition into a `DispatchError` response
//!
//! # Design Decisions
//! - Stateless across requests; the registry is shared read-only
//! - The body is read only for PUT and POST, at most once
//! - Raw routes get the untouched request and own the whole response
//! - No retries: one decode attempt, one invocation

use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};

use crate::error::DispatchError;
use crate::http::request::{ControllerRequest, X_REQUEST_ID};
use crate::http::response::write_response;
use crate::observability::metrics;
use crate::routing::method::Invoker;
use crate::routing::naming::title_case;
use crate::routing::registry::RouteRegistry;
use crate::security::identity::{HeaderIdentity, IdentityExtractor};

/// Default cap on request bodies read for JSON decoding.
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Resolves requests against a frozen `RouteRegistry`.
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
    identity: Arc<dyn IdentityExtractor>,
    max_body_size: usize,
    strict_paths: bool,
}

impl Dispatcher {
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self {
            registry,
            identity: Arc::new(HeaderIdentity::default()),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            strict_paths: false,
        }
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityExtractor>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Reject URLs whose shape does not fit the resolved method before
    /// looking the route up.
    pub fn with_strict_paths(mut self, strict_paths: bool) -> Self {
        self.strict_paths = strict_paths;
        self
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Handle one request end to end.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let verb = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!(
            request_id = %request_id,
            method = %verb,
            path = %path,
            "Dispatching request"
        );

        match self.try_dispatch(request).await {
            Ok(response) => {
                metrics::record_dispatch(verb.as_str(), "ok", start);
                response
            }
            Err(err) => {
                match &err {
                    DispatchError::HandlerFailure(_) => tracing::error!(
                        request_id = %request_id,
                        method = %verb,
                        path = %path,
                        error = %err,
                        "Controller method failed"
                    ),
                    _ => tracing::warn!(
                        request_id = %request_id,
                        method = %verb,
                        path = %path,
                        outcome = err.outcome(),
                        error = %err,
                        "Request rejected"
                    ),
                }
                metrics::record_dispatch(verb.as_str(), err.outcome(), start);
                err.into_response()
            }
        }
    }

    async fn try_dispatch(&self, request: Request<Body>) -> Result<Response, DispatchError> {
        let identity = self.identity.extract(request.headers())?;
        let cr = ControllerRequest::from_path(request.uri().path(), identity)?;
        let method_name = resolve_method_name(request.method(), &cr);

        if self.strict_paths {
            check_path(request.method(), &method_name, &cr)?;
        }

        let route = self
            .registry
            .lookup(&cr.controller_name, &method_name)
            .ok_or_else(|| DispatchError::RouteNotFound(method_name.clone()))?;

        tracing::debug!(route = %route.key(), raw = route.is_raw(), "Route resolved");

        match route.invoker() {
            Invoker::Raw(call) => Ok(call(cr, request).await),
            Invoker::Payload(call) => {
                let body = if takes_body(request.method()) {
                    read_body(request, self.max_body_size).await?
                } else {
                    Bytes::new()
                };
                let payload = call(cr, body).await?;
                Ok(write_response(payload))
            }
        }
    }
}

/// Method name a request resolves to: `Index`, a bare verb, or verb + action.
pub fn resolve_method_name(verb: &Method, cr: &ControllerRequest) -> String {
    let mut method_name = title_case(verb.as_str());
    if method_name == "Get"
        && cr.item_id.is_empty()
        && cr.action.is_empty()
        && cr.action_filter.is_empty()
    {
        method_name = "Index".to_string();
    }
    if method_name != "Index" && !cr.action.is_empty() {
        method_name.push_str(&cr.action);
    }
    method_name
}

/// URL shape check applied when strict paths are enabled.
pub fn check_path(verb: &Method, method_name: &str, cr: &ControllerRequest) -> Result<(), DispatchError> {
    if method_name == "Index" {
        return Ok(());
    }
    let controller = &cr.controller_name;
    let with_action = || {
        DispatchError::MalformedRequest(format!(
            "Malformed URL. Expected: /{}/{{id}}/{}/{{optional filter}}",
            controller, cr.action
        ))
    };

    if *verb == Method::GET || *verb == Method::DELETE || *verb == Method::PUT {
        if cr.item_id.is_empty() && cr.action.is_empty() {
            return Err(DispatchError::MalformedRequest(format!(
                "Malformed URL. Expected: /{}/{{id}}",
                controller
            )));
        }
        if cr.item_id.is_empty() {
            return Err(with_action());
        }
    } else if *verb == Method::POST {
        if !cr.item_id.is_empty() && cr.action.is_empty() {
            return Err(DispatchError::MalformedRequest(format!(
                "Malformed URL. Expected: /{}",
                controller
            )));
        }
        if cr.item_id.is_empty() && !cr.action.is_empty() {
            return Err(with_action());
        }
    }
    Ok(())
}

fn takes_body(verb: &Method) -> bool {
    *verb == Method::PUT || *verb == Method::POST
}

async fn read_body(request: Request<Body>, limit: usize) -> Result<Bytes, DispatchError> {
    axum::body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| DispatchError::MalformedBody(e.to_string()))
}
