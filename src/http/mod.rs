//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout, request ID)
//!     → dispatch.rs (identity, descriptor, route lookup, invoke)
//!     → request.rs (path → ControllerRequest)
//!     → response.rs (payload → JSON response)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::Dispatcher;
pub use request::{ControllerRequest, X_REQUEST_ID};
pub use response::write_response;
pub use server::{HttpServer, ServerError};
