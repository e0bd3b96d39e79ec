//! Convention-over-configuration HTTP request router.
//!
//! Controllers expose methods named `Index`, `Get*`, `Put*`, `Post*` and
//! `Delete*`. Registration validates each method's declared shape and
//! installs it under `{Controller}{Verb}{Action}`; requests to
//! `/{controller}/{id}/{action}/{filter}` are dispatched to the matching
//! method.

pub mod admin;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::RouterConfig;
pub use error::DispatchError;
pub use http::{ControllerRequest, Dispatcher, HttpServer};
pub use lifecycle::Shutdown;
pub use routing::{Controller, ControllerMethod, RegistryBuilder, RouteRegistry};
pub use security::Identity;
