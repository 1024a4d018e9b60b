//! Terminal Relay Server Library
//!
//! Exports the modules used by the server binary and by integration tests.

pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod stripe_types;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AppSettings;
pub use error::AppError;
