//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → in-flight requests drain → exit
//! ```
//!
//! # Design Decisions
//! - Startup is ordered in main: config, logging, metrics, registry, listener
//! - Shutdown is a broadcast so more than one task can observe it

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{trigger_on_signal, wait_for_signal};
