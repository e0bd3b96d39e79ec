//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (bootstrap, once per controller):
//!     Controller::methods()
//!     → naming.rs (verb + action from the method name)
//!     → signature.rs (accept or reject the declared shape)
//!     → registry.rs (install under Controller+Verb+Action)
//!     → Freeze as immutable RouteRegistry
//!
//! Request time:
//!     ControllerRequest + HTTP verb → method name
//!     → RouteRegistry::lookup → Route or no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - One naming convention, one URL segmentation scheme
//! - Lookups are exact key matches (no patterns, no regex)

pub mod method;
pub mod naming;
pub mod registry;
pub mod signature;

pub use method::{Controller, ControllerMethod};
pub use naming::{title_case, Verb};
pub use registry::{RegistrationError, RegistryBuilder, Route, RouteRegistry};
pub use signature::{
    classify, ArgShape, HandlerSignature, MethodSignature, ParamType, PayloadShape, Rejection,
    RejectionReason, ReturnShape, ReturnType,
};
