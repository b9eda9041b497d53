//! Peer sync job.
//!
//! Refreshes stored member rows from controller state on a short cadence:
//! for each active user, each owned network, fetch the member list, resolve
//! peer connectivity in one batched call per network, enrich, and upsert.
//! Upsert-only: rows for members the controller stops reporting keep their
//! last-synced state.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

use meshwork_controller::ControllerApi;
use meshwork_core::RequestContext;

use crate::enrich::enrich_members;
use crate::error::ReconResult;
use crate::scheduler::{CycleSummary, Job};
use crate::store::{ReconciliationStore, User};

/// Name the peer sync is registered under.
pub const PEER_SYNC_JOB: &str = "peer_sync";

/// Reconciles stored member state with the controller's current view.
pub struct PeerSyncJob {
    controller: Arc<dyn ControllerApi>,
    store: Arc<dyn ReconciliationStore>,
    concurrency: usize,
}

impl PeerSyncJob {
    /// Create a fully sequential sync job.
    #[must_use]
    pub fn new(controller: Arc<dyn ControllerApi>, store: Arc<dyn ReconciliationStore>) -> Self {
        Self {
            controller,
            store,
            concurrency: 1,
        }
    }

    /// Sync up to `concurrency` users in parallel (clamped to at least 1).
    ///
    /// A user's own networks are always processed sequentially, whatever
    /// the cap.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// One full sync cycle over all active users.
    ///
    /// The summary counts networks: `processed` synced cleanly, `failed`
    /// hit a controller or store error, `skipped` had no usable member
    /// collection. A user whose network list cannot be read counts as one
    /// failure.
    pub async fn sync_all(&self) -> ReconResult<CycleSummary> {
        let users = self.store.find_active_users().await?;
        if users.is_empty() {
            return Ok(CycleSummary::new());
        }

        debug!(
            users = users.len(),
            concurrency = self.concurrency,
            "Starting peer sync cycle"
        );

        if self.concurrency <= 1 {
            let mut summary = CycleSummary::new();
            for user in users {
                let user_summary =
                    Self::sync_user(self.controller.clone(), self.store.clone(), user).await;
                summary.merge(&user_summary);
            }
            return Ok(summary);
        }

        Ok(self.sync_concurrent(users).await)
    }

    /// Fan users out across spawned tasks gated by a semaphore.
    async fn sync_concurrent(&self, users: Vec<User>) -> CycleSummary {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(users.len());

        for user in users {
            let semaphore = semaphore.clone();
            let controller = self.controller.clone();
            let store = self.store.clone();
            tasks.push(tokio::spawn(async move {
                // Held until the task completes; the semaphore is never closed.
                let _permit = semaphore.acquire_owned().await;
                Self::sync_user(controller, store, user).await
            }));
        }

        let mut summary = CycleSummary::new();
        for task in tasks {
            match task.await {
                Ok(user_summary) => summary.merge(&user_summary),
                Err(e) => {
                    if e.is_panic() {
                        warn!("Peer sync task panicked for one user");
                    }
                    summary.record_failure();
                }
            }
        }
        summary
    }

    /// Sync one user's networks, in order.
    ///
    /// Never fails: per-unit outcomes are recorded in the summary and
    /// sibling networks always proceed.
    #[instrument(skip_all, fields(user_id = %user.id))]
    async fn sync_user(
        controller: Arc<dyn ControllerApi>,
        store: Arc<dyn ReconciliationStore>,
        user: User,
    ) -> CycleSummary {
        let mut summary = CycleSummary::new();
        let ctx = RequestContext::new(user.id);

        let networks = match store.find_networks_by_owner(user.id).await {
            Ok(networks) => networks,
            Err(e) => {
                warn!(error = %e, "Failed to list networks for user");
                summary.record_failure();
                return summary;
            }
        };

        for network in &networks {
            let detail = match controller.network_detail(&ctx, &network.nwid).await {
                Ok(Some(detail)) => detail,
                Ok(None) => {
                    debug!(
                        nwid = %network.nwid,
                        "Controller has no member collection for network, skipping"
                    );
                    summary.record_skip();
                    continue;
                }
                Err(e) => {
                    warn!(nwid = %network.nwid, error = %e, "Failed to fetch network detail");
                    summary.record_failure();
                    continue;
                }
            };

            let peers = if detail.members.is_empty() {
                Vec::new()
            } else {
                match controller.peers(&ctx, &network.nwid, &detail.members).await {
                    Ok(peers) => peers,
                    Err(e) => {
                        warn!(nwid = %network.nwid, error = %e, "Failed to fetch peers for network");
                        summary.record_failure();
                        continue;
                    }
                }
            };

            let enriched = enrich_members(&network.nwid, &detail.members, &peers);

            let mut write_failed = false;
            for member in &enriched {
                if let Err(e) = store.upsert_member(member).await {
                    warn!(
                        nwid = %network.nwid,
                        node_id = %member.node_id,
                        error = %e,
                        "Failed to upsert member"
                    );
                    write_failed = true;
                }
            }

            if write_failed {
                summary.record_failure();
            } else {
                summary.record_success();
            }
        }

        summary
    }
}

#[async_trait]
impl Job for PeerSyncJob {
    async fn run(&self) -> ReconResult<CycleSummary> {
        self.sync_all().await
    }
}
