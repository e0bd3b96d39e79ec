//! Controller method signature classification.
//!
//! # Responsibilities
//! - Describe the parameter and return shape of a controller method
//! - Decide whether a method may be registered, and under which verb/action
//! - Produce a stable, human-readable reason for every rejection
//!
//! # Design Decisions
//! - Classification is a pure function of (method name, signature)
//! - Raw passthrough methods skip every shape check after the verb
//! - Exactly one outcome per method: a `HandlerSignature` or a `Rejection`

use thiserror::Error;

use crate::routing::naming::{parse_method_name, Verb};

/// One declared parameter of a controller method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// The parsed request descriptor (`ControllerRequest`).
    Request,
    /// The untouched inbound HTTP request.
    RawRequest,
    /// A plain string argument.
    Str,
    /// A JSON body decoded into a single struct.
    JsonStruct,
    /// A JSON body decoded into a list of structs.
    JsonSlice,
    /// Anything else, named for diagnostics.
    Other(&'static str),
}

/// One declared return value of a controller method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    /// The serialized payload.
    Str,
    /// The error-or-nothing half of a fallible result.
    Error,
    /// A complete HTTP response built by the handler.
    Response,
    /// Anything else, named for diagnostics.
    Other(&'static str),
}

/// Parameter and return shape of a controller method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodSignature {
    pub params: Vec<ParamType>,
    pub returns: Vec<ReturnType>,
}

impl MethodSignature {
    pub fn new(
        params: impl IntoIterator<Item = ParamType>,
        returns: impl IntoIterator<Item = ReturnType>,
    ) -> Self {
        Self {
            params: params.into_iter().collect(),
            returns: returns.into_iter().collect(),
        }
    }

    /// `(cr) -> (String, error)`
    pub fn context() -> Self {
        Self::new([ParamType::Request], [ReturnType::Str, ReturnType::Error])
    }

    /// `(cr, json) -> (String, error)`
    pub fn payload(shape: PayloadShape) -> Self {
        let json = match shape {
            PayloadShape::Struct => ParamType::JsonStruct,
            PayloadShape::Slice => ParamType::JsonSlice,
        };
        Self::new([ParamType::Request, json], [ReturnType::Str, ReturnType::Error])
    }

    /// `(cr, raw request) -> response`
    pub fn raw() -> Self {
        Self::new([ParamType::Request, ParamType::RawRequest], [ReturnType::Response])
    }

    fn is_raw(&self) -> bool {
        self.params == [ParamType::Request, ParamType::RawRequest]
            && self.returns == [ReturnType::Response]
    }

    fn returns_payload(&self) -> bool {
        self.returns == [ReturnType::Str, ReturnType::Error]
    }
}

/// How a JSON body is materialized for `Put`/`Post` handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Struct,
    Slice,
}

/// Arguments a validated handler is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    ContextOnly,
    ContextAndPayload(PayloadShape),
}

/// What a validated handler hands back to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// `(String, error)`: the dispatcher writes the response.
    Payload,
    /// The handler produced the whole response itself.
    Response,
}

/// Accepted classification of one controller method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSignature {
    pub verb: Verb,
    pub action: String,
    pub is_raw: bool,
    pub arg_shape: ArgShape,
    pub return_shape: ReturnShape,
}

/// Why a method was not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("Unsupported http verb: \"\"")]
    UnsupportedVerb,

    #[error("Internal error validating method")]
    NotCallable,

    #[error("Unsupported return type.  Expected (string, error)")]
    UnsupportedReturnType,

    #[error("Requires 1 input arg (cr *ControllerRequest)")]
    ContextArgs,

    #[error("Requires 2 input args (cr *ControllerRequest, json *YourStruct or []YourStruct)")]
    PayloadArgs,
}

/// A method that failed classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Method \"{method}\" error: {reason}")]
pub struct Rejection {
    pub method: String,
    /// Parsed verb, absent when the name carries no verb prefix.
    pub verb: Option<Verb>,
    pub action: String,
    pub reason: RejectionReason,
}

impl Rejection {
    pub(crate) fn new(
        method: &str,
        verb: Option<Verb>,
        action: impl Into<String>,
        reason: RejectionReason,
    ) -> Self {
        Self {
            method: method.to_string(),
            verb,
            action: action.into(),
            reason,
        }
    }
}

/// Classify one controller method.
pub fn classify(method_name: &str, signature: &MethodSignature) -> Result<HandlerSignature, Rejection> {
    let Some((verb, action)) = parse_method_name(method_name) else {
        return Err(Rejection::new(method_name, None, "", RejectionReason::UnsupportedVerb));
    };

    if signature.is_raw() {
        return Ok(HandlerSignature {
            verb,
            action,
            is_raw: true,
            arg_shape: ArgShape::ContextOnly,
            return_shape: ReturnShape::Response,
        });
    }

    if !signature.returns_payload() {
        return Err(Rejection::new(
            method_name,
            Some(verb),
            action,
            RejectionReason::UnsupportedReturnType,
        ));
    }

    let arg_shape = if verb.takes_payload() {
        match signature.params.as_slice() {
            [ParamType::Request, ParamType::JsonStruct] => {
                ArgShape::ContextAndPayload(PayloadShape::Struct)
            }
            [ParamType::Request, ParamType::JsonSlice] => {
                ArgShape::ContextAndPayload(PayloadShape::Slice)
            }
            _ => {
                return Err(Rejection::new(
                    method_name,
                    Some(verb),
                    action,
                    RejectionReason::PayloadArgs,
                ))
            }
        }
    } else {
        match signature.params.as_slice() {
            [ParamType::Request] => ArgShape::ContextOnly,
            _ => {
                return Err(Rejection::new(
                    method_name,
                    Some(verb),
                    action,
                    RejectionReason::ContextArgs,
                ))
            }
        }
    };

    Ok(HandlerSignature {
        verb,
        action,
        is_raw: false,
        arg_shape,
        return_shape: ReturnShape::Payload,
    })
}
