//! meshwork Database Layer
//!
//! PostgreSQL persistence for the admin application: users, their networks,
//! and the reconciled member rows written by the peer sync job.
//!
//! # Modules
//!
//! - [`pool`] - Connection pool ([`DbPool`])
//! - [`migrations`] - Embedded SQL migrations ([`run_migrations`])
//! - [`models`] - Row models and query functions
//! - [`error`] - Database error type ([`DbError`])

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

// Re-export main types for convenient access
pub use error::DbError;
pub use migrations::run_migrations;
pub use pool::DbPool;
