//! Controller methods and their callable bodies.
//!
//! # Responsibilities
//! - Pair a method name with its declared `MethodSignature`
//! - Wrap typed handler closures into uniformly-typed invokers
//!
//! # Design Decisions
//! - Each typed constructor records the exact signature of the closure it
//!   wraps, so classification never inspects types at runtime
//! - JSON decoding happens inside the payload invoker, which is the only
//!   place that statically knows the payload type

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;

use crate::error::DispatchError;
use crate::http::request::ControllerRequest;
use crate::routing::signature::{MethodSignature, PayloadShape};

/// Invoker for `(cr)` and `(cr, json)` handlers. The body is ignored by
/// context-only handlers.
pub(crate) type PayloadFn =
    Arc<dyn Fn(ControllerRequest, Bytes) -> BoxFuture<'static, Result<String, DispatchError>> + Send + Sync>;

/// Invoker for raw passthrough handlers.
pub(crate) type RawFn =
    Arc<dyn Fn(ControllerRequest, Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Invoker {
    Payload(PayloadFn),
    Raw(RawFn),
}

/// A group of related handlers registered under one controller name.
///
/// ```ignore
/// impl Controller for Projects {
///     fn methods(self: Arc<Self>) -> Vec<ControllerMethod> {
///         let this = self.clone();
///         vec![ControllerMethod::context("GetStatus", move |cr| {
///             let this = this.clone();
///             async move { this.status(&cr).await }
///         })]
///     }
/// }
/// ```
pub trait Controller: Send + Sync + 'static {
    /// Every method the controller exposes, conforming or not.
    fn methods(self: Arc<Self>) -> Vec<ControllerMethod>;
}

/// A named controller method: its declared shape plus, when it has one,
/// the body the dispatcher calls.
pub struct ControllerMethod {
    name: String,
    signature: MethodSignature,
    invoker: Option<Invoker>,
}

impl ControllerMethod {
    /// `(cr) -> Result<String, E>`, for `Index`, `Get*` and `Delete*`.
    pub fn context<F, Fut, E>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ControllerRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let call: PayloadFn = Arc::new(move |cr: ControllerRequest, _body: Bytes| {
            let fut = handler(cr);
            async move { fut.await.map_err(handler_failure) }.boxed()
        });
        Self {
            name: name.into(),
            signature: MethodSignature::context(),
            invoker: Some(Invoker::Payload(call)),
        }
    }

    /// `(cr, T) -> Result<String, E>`, for `Put*` and `Post*` taking one
    /// JSON object.
    pub fn json<T, F, Fut, E>(name: impl Into<String>, handler: F) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(ControllerRequest, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        Self::payload::<T, F, Fut, E>(name.into(), PayloadShape::Struct, handler)
    }

    /// `(cr, Vec<T>) -> Result<String, E>`, for `Put*` and `Post*` taking
    /// a JSON array.
    pub fn json_list<T, F, Fut, E>(name: impl Into<String>, handler: F) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(ControllerRequest, Vec<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        Self::payload::<Vec<T>, F, Fut, E>(name.into(), PayloadShape::Slice, handler)
    }

    /// `(cr, raw request) -> response`. The handler owns status, headers
    /// and body; the router never touches the request body for it.
    pub fn raw<F, Fut, R>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ControllerRequest, Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        let call: RawFn = Arc::new(move |cr: ControllerRequest, request: Request<Body>| {
            let fut = handler(cr, request);
            async move { fut.await.into_response() }.boxed()
        });
        Self {
            name: name.into(),
            signature: MethodSignature::raw(),
            invoker: Some(Invoker::Raw(call)),
        }
    }

    /// A method the controller exposes without a convention-compatible
    /// body. Registration reports why it was skipped.
    pub fn unbound(name: impl Into<String>, signature: MethodSignature) -> Self {
        Self {
            name: name.into(),
            signature,
            invoker: None,
        }
    }

    fn payload<P, F, Fut, E>(name: String, shape: PayloadShape, handler: F) -> Self
    where
        P: DeserializeOwned + Send + 'static,
        F: Fn(ControllerRequest, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let call: PayloadFn = Arc::new(move |cr: ControllerRequest, body: Bytes| {
            match serde_json::from_slice::<P>(&body) {
                Ok(payload) => {
                    let fut = handler(cr, payload);
                    async move { fut.await.map_err(handler_failure) }.boxed()
                }
                Err(e) => future::ready(Err(DispatchError::MalformedBody(e.to_string()))).boxed(),
            }
        });
        Self {
            name,
            signature: MethodSignature::payload(shape),
            invoker: Some(Invoker::Payload(call)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Methods starting with a lower-case letter are private to the
    /// controller and never registered.
    pub fn is_private(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_lowercase)
    }

    pub(crate) fn into_parts(self) -> (String, MethodSignature, Option<Invoker>) {
        (self.name, self.signature, self.invoker)
    }
}

impl fmt::Debug for ControllerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerMethod")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("callable", &self.invoker.is_some())
            .finish()
    }
}

fn handler_failure<E: fmt::Display>(err: E) -> DispatchError {
    DispatchError::HandlerFailure(err.to_string())
}
