//! Controller client error types
//!
//! Error definitions with transient/permanent classification. Reconciliation
//! jobs skip a failed unit either way; the classification feeds log fields so
//! operators can tell a flaky controller from a misconfigured one.

use thiserror::Error;

/// Error that can occur talking to the network controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    // Transport errors (usually transient)
    /// Failed to reach the controller.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Request exceeded the configured timeout.
    #[error("request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Controller is temporarily unavailable (502/503/504, rate limited).
    #[error("controller unavailable: {message}")]
    Unavailable { message: String },

    // Authentication errors (permanent)
    /// The configured API token was rejected.
    #[error("authentication failed: controller rejected the API token")]
    AuthenticationFailed,

    // Protocol errors
    /// Controller answered with a non-success HTTP status.
    #[error("controller returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Controller response did not match the expected shape.
    #[error("invalid controller response: {message}")]
    InvalidResponse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Configuration errors (permanent)
    /// Client configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ControllerError {
    /// Check if this error is transient and the unit may succeed next cycle.
    ///
    /// Transient errors are caused by temporary conditions such as network
    /// issues or controller restarts.
    pub fn is_transient(&self) -> bool {
        match self {
            ControllerError::ConnectionFailed { .. }
            | ControllerError::Timeout { .. }
            | ControllerError::Unavailable { .. } => true,
            ControllerError::Http { status, .. } => *status >= 500,
            ControllerError::AuthenticationFailed
            | ControllerError::InvalidResponse { .. }
            | ControllerError::InvalidConfig { .. } => false,
        }
    }

    /// Check if this error is permanent and will not resolve on its own.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for log classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ControllerError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ControllerError::Timeout { .. } => "TIMEOUT",
            ControllerError::Unavailable { .. } => "UNAVAILABLE",
            ControllerError::AuthenticationFailed => "AUTH_FAILED",
            ControllerError::Http { .. } => "HTTP_ERROR",
            ControllerError::InvalidResponse { .. } => "INVALID_RESPONSE",
            ControllerError::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        ControllerError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ControllerError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        ControllerError::Unavailable {
            message: message.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        ControllerError::InvalidResponse {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid response error with source.
    pub fn invalid_response_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ControllerError::InvalidResponse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ControllerError::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type for controller operations.
pub type ControllerResult<T> = Result<T, ControllerError>;
