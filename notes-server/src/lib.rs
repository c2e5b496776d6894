//! Learning Notes API - HTTP service over the notes document store

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod routes;
pub mod store;

// Re-export main types
pub use config::{Config, ConfigError};
pub use diagnostics::DiagnosticsReport;
pub use error::{ApiError, Result};
pub use routes::{router, AppState};
pub use store::DocumentStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
