//! Reconciliation error types.

use thiserror::Error;

/// Errors surfaced by [`ReconciliationStore`](crate::store::ReconciliationStore)
/// implementations.
///
/// Deliberately backend-agnostic so in-memory test stores can construct
/// every variant; the PostgreSQL implementation maps `sqlx` errors into it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query against the backing store failed.
    #[error("Store query failed: {message}")]
    Query {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The addressed row does not exist.
    #[error("{what} not found")]
    NotFound { what: String },

    /// A stored row holds data the domain model rejects.
    #[error("Invalid row: {message}")]
    InvalidRow { message: String },
}

impl StoreError {
    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            source: None,
        }
    }

    /// Create a query error with an underlying source.
    pub fn query_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Query {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an invalid row error.
    pub fn invalid_row(message: impl Into<String>) -> Self {
        Self::InvalidRow {
            message: message.into(),
        }
    }
}

/// Errors from scheduling, configuration, and cycle-fatal job failures.
///
/// Per-unit failures inside a job cycle (one controller call, one row write)
/// never surface here; they are logged and counted in the cycle summary.
#[derive(Debug, Error)]
pub enum ReconError {
    /// Store error that aborts a whole cycle (e.g. the initial enumeration).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Cadence expression could not be parsed.
    #[error("Invalid cadence '{expr}': {message}")]
    InvalidCadence { expr: String, message: String },

    /// A job with the same name is already registered.
    #[error("Job '{name}' is already registered")]
    DuplicateJob { name: String },

    /// The scheduler has already been started.
    #[error("Scheduler already started")]
    AlreadyStarted,

    /// The scheduler has not been started.
    #[error("Scheduler not started")]
    NotStarted,
}

impl ReconError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid cadence error.
    pub fn invalid_cadence(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCadence {
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate job error.
    pub fn duplicate_job(name: impl Into<String>) -> Self {
        Self::DuplicateJob { name: name.into() }
    }
}

/// Result type for reconciliation operations.
pub type ReconResult<T> = Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::query("connection reset");
        assert!(err.to_string().contains("connection reset"));

        let err = StoreError::not_found("user 42");
        assert_eq!(err.to_string(), "user 42 not found");

        let err = StoreError::invalid_row("empty network id");
        assert!(err.to_string().contains("empty network id"));
    }

    #[test]
    fn test_store_error_source_is_preserved() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = StoreError::query_with_source("fetch users", io);
        assert!(err.source().is_some());

        let err = StoreError::query("fetch users");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_recon_error_display() {
        let err = ReconError::invalid_cadence("* * *", "expected six fields");
        assert!(err.to_string().contains("* * *"));
        assert!(err.to_string().contains("expected six fields"));

        let err = ReconError::duplicate_job("peer_sync");
        assert!(err.to_string().contains("peer_sync"));

        assert_eq!(
            ReconError::AlreadyStarted.to_string(),
            "Scheduler already started"
        );
        assert_eq!(ReconError::NotStarted.to_string(), "Scheduler not started");
    }

    #[test]
    fn test_store_error_converts_to_recon_error() {
        let err: ReconError = StoreError::query("listing users").into();
        assert!(matches!(err, ReconError::Store(_)));
        assert!(err.to_string().contains("listing users"));
    }
}
