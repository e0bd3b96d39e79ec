//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request headers (set by the upstream auth layer)
//!     → identity.rs (user ids, user document)
//!     → Identity attached to the ControllerRequest
//! ```
//!
//! # Design Decisions
//! - Authentication is upstream; this layer only extracts
//! - Extraction is a trait so other auth schemes can be plugged in

pub mod identity;

pub use identity::{HeaderIdentity, Identity, IdentityError, IdentityExtractor, User};
