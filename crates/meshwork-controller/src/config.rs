//! Controller client configuration.

use crate::error::{ControllerError, ControllerResult};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default connect timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Configuration for [`ControllerClient`](crate::ControllerClient).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Base URL of the controller API (e.g., "http://127.0.0.1:9993").
    pub base_url: String,

    /// API token sent as a bearer Authorization header, when set.
    pub api_token: Option<String>,

    /// Per-request timeout in seconds. Every controller call carries this.
    pub timeout_secs: u64,

    /// Connection-establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl ControllerConfig {
    /// Create a configuration with default timeouts and no token.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Set the API token.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ControllerResult<()> {
        if self.base_url.is_empty() {
            return Err(ControllerError::invalid_config("base_url is required"));
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ControllerError::invalid_config(format!("invalid base_url: {e}")))?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ControllerError::invalid_config(format!(
                "unsupported base_url scheme: {scheme}"
            )));
        }
        if url.host_str().is_none() {
            return Err(ControllerError::invalid_config("base_url has no host"));
        }

        if self.timeout_secs == 0 {
            return Err(ControllerError::invalid_config(
                "timeout_secs must be at least 1",
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ControllerError::invalid_config(
                "connect_timeout_secs must be at least 1",
            ));
        }

        Ok(())
    }

    /// Return a copy safe for logging, with the token masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.api_token.is_some() {
            config.api_token = Some("***".to_string());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_default_timeouts() {
        let config = ControllerConfig::new("http://127.0.0.1:9993");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
        assert!(config.api_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders_set_fields() {
        let config = ControllerConfig::new("https://controller.example.com")
            .with_api_token("s3cr3t")
            .with_timeout_secs(30)
            .with_connect_timeout_secs(3);
        assert_eq!(config.api_token.as_deref(), Some("s3cr3t"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let config = ControllerConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = ControllerConfig::new("ftp://controller.example.com");
        let err = config.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_validate_rejects_unparseable_url() {
        let config = ControllerConfig::new("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let config = ControllerConfig::new("http://127.0.0.1:9993").with_timeout_secs(0);
        assert!(config.validate().is_err());

        let config = ControllerConfig::new("http://127.0.0.1:9993").with_connect_timeout_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted_masks_token() {
        let config = ControllerConfig::new("http://127.0.0.1:9993").with_api_token("s3cr3t");
        let redacted = config.redacted();
        assert_eq!(redacted.api_token.as_deref(), Some("***"));
        // Original is untouched.
        assert_eq!(config.api_token.as_deref(), Some("s3cr3t"));
    }

    #[test]
    fn test_redacted_without_token_is_identity() {
        let config = ControllerConfig::new("http://127.0.0.1:9993");
        assert!(config.redacted().api_token.is_none());
    }
}
