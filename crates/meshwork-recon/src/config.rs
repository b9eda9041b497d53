//! Reconciliation configuration.

use std::time::Duration;

use chrono_tz::Tz;

use crate::error::{ReconError, ReconResult};
use crate::scheduler::Cadence;

/// Minimum peer sync interval in seconds.
pub const MIN_SYNC_INTERVAL_SECS: u64 = 5;
/// Maximum peer sync interval in seconds.
pub const MAX_SYNC_INTERVAL_SECS: u64 = 3600;
/// Maximum cross-user sync concurrency.
pub const MAX_SYNC_CONCURRENCY: usize = 16;

/// Tuning for the reconciliation jobs.
#[derive(Debug, Clone)]
pub struct ReconConfig {
    /// Peer sync interval in seconds.
    pub sync_interval_secs: u64,

    /// Maximum users synced concurrently (1 = fully sequential).
    pub sync_concurrency: usize,

    /// Six-field cron expression for the expiry sweep.
    pub expiry_cron: String,

    /// Timezone cron expressions are evaluated in.
    pub timezone: Tz,
}

impl ReconConfig {
    /// Peer sync interval as a [`Duration`].
    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Cadence for the peer sync job.
    pub fn sync_cadence(&self) -> ReconResult<Cadence> {
        Cadence::every(self.sync_interval())
    }

    /// Cadence for the expiry sweep job.
    pub fn expiry_cadence(&self) -> ReconResult<Cadence> {
        Cadence::cron(&self.expiry_cron, self.timezone)
    }

    /// Check that every knob is inside its valid range and the cron
    /// expression parses.
    pub fn validate(&self) -> ReconResult<()> {
        if !(MIN_SYNC_INTERVAL_SECS..=MAX_SYNC_INTERVAL_SECS).contains(&self.sync_interval_secs) {
            return Err(ReconError::configuration(format!(
                "Sync interval must be between {MIN_SYNC_INTERVAL_SECS} and {MAX_SYNC_INTERVAL_SECS} seconds"
            )));
        }
        if self.sync_concurrency < 1 || self.sync_concurrency > MAX_SYNC_CONCURRENCY {
            return Err(ReconError::configuration(format!(
                "Sync concurrency must be between 1 and {MAX_SYNC_CONCURRENCY}"
            )));
        }
        self.expiry_cadence()?;
        Ok(())
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            sync_interval_secs: 300,
            sync_concurrency: 1,
            expiry_cron: "0 0 4 * * *".to_string(),
            timezone: chrono_tz::UTC,
        }
    }
}
