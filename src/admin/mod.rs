pub mod handlers;

pub use handlers::StatusController;
