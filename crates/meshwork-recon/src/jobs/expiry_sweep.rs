//! Expiry sweep job.
//!
//! Daily sweep that deactivates accounts whose expiry has passed: every
//! currently-authorized member on every network the account owns is
//! deauthorized at the controller, then the account is marked inactive.
//! ADMIN accounts are excluded by the store enumeration contract.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use meshwork_controller::ControllerApi;
use meshwork_core::RequestContext;

use crate::error::{ReconResult, StoreError};
use crate::scheduler::{CycleSummary, Job};
use crate::store::{ReconciliationStore, User};

/// Name the expiry sweep is registered under.
pub const EXPIRY_SWEEP_JOB: &str = "expiry_sweep";

/// Deactivates expired accounts after revoking their members' authorization.
pub struct ExpirySweepJob {
    controller: Arc<dyn ControllerApi>,
    store: Arc<dyn ReconciliationStore>,
}

impl ExpirySweepJob {
    /// Create the job over the capability seams.
    #[must_use]
    pub fn new(controller: Arc<dyn ControllerApi>, store: Arc<dyn ReconciliationStore>) -> Self {
        Self { controller, store }
    }

    /// Run one sweep against the current clock.
    pub async fn sweep(&self) -> ReconResult<CycleSummary> {
        self.sweep_at(Utc::now()).await
    }

    /// Run one sweep treating `now` as the current instant.
    ///
    /// Split out so tests can pin the expiry boundary.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> ReconResult<CycleSummary> {
        let users = self.store.find_expired_active_users(now).await?;
        if users.is_empty() {
            return Ok(CycleSummary::new());
        }

        info!(count = users.len(), "Sweeping expired accounts");

        let mut summary = CycleSummary::new();
        for user in &users {
            match self.sweep_user(user).await {
                Ok(()) => summary.record_success(),
                Err(e) => {
                    warn!(user_id = %user.id, error = %e, "Expiry sweep failed for user");
                    summary.record_failure();
                }
            }
        }
        Ok(summary)
    }

    /// Deauthorize one user's members, then mark the account inactive.
    ///
    /// Controller failures never abort the user: a network whose detail
    /// cannot be fetched is skipped for this cycle, a member whose
    /// revocation fails is left for the peer sync to surface, and the
    /// account is deactivated regardless. Store failures do abort, leaving
    /// the user for the next sweep.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn sweep_user(&self, user: &User) -> Result<(), StoreError> {
        let ctx = RequestContext::new(user.id);
        let networks = self.store.find_networks_by_owner(user.id).await?;

        let mut deauthorized = 0usize;
        for network in &networks {
            match self.controller.network_detail(&ctx, &network.nwid).await {
                Ok(Some(detail)) => {
                    for member in detail.members.iter().filter(|m| m.authorized) {
                        match self
                            .controller
                            .set_authorized(&ctx, &network.nwid, &member.id, false)
                            .await
                        {
                            Ok(()) => deauthorized += 1,
                            Err(e) => {
                                warn!(
                                    nwid = %network.nwid,
                                    node_id = %member.id,
                                    error = %e,
                                    "Failed to deauthorize member"
                                );
                            }
                        }
                    }
                }
                Ok(None) => {
                    warn!(
                        nwid = %network.nwid,
                        "Controller has no detail for network, skipping"
                    );
                }
                Err(e) => {
                    warn!(
                        nwid = %network.nwid,
                        error = %e,
                        "Failed to fetch network detail, skipping"
                    );
                }
            }
        }

        self.store.set_user_active(user.id, false).await?;
        info!(
            networks = networks.len(),
            deauthorized = deauthorized,
            "Deactivated expired account"
        );
        Ok(())
    }
}

#[async_trait]
impl Job for ExpirySweepJob {
    async fn run(&self) -> ReconResult<CycleSummary> {
        self.sweep().await
    }
}
