//! meshwork Reconciliation
//!
//! Periodic reconciliation between the admin database and the network
//! controller. A [`JobScheduler`] drives two recurring jobs:
//!
//! - [`ExpirySweepJob`] - daily sweep that deauthorizes and deactivates
//!   expired accounts
//! - [`PeerSyncJob`] - short-cadence refresh of stored member rows from
//!   controller state
//!
//! Jobs depend on two capability seams, [`ControllerApi`] from
//! `meshwork-controller` and [`ReconciliationStore`] defined here, so every
//! behavior is testable against in-memory fakes.
//!
//! [`ControllerApi`]: meshwork_controller::ControllerApi

pub mod config;
pub mod enrich;
pub mod error;
pub mod jobs;
pub mod scheduler;
pub mod store;

// Re-export main types for convenient access
pub use config::ReconConfig;
pub use enrich::{enrich_members, Connectivity, EnrichedMember};
pub use error::{ReconError, ReconResult, StoreError};
pub use jobs::{ExpirySweepJob, PeerSyncJob, EXPIRY_SWEEP_JOB, PEER_SYNC_JOB};
pub use scheduler::{Cadence, CycleSummary, Job, JobHandle, JobScheduler};
pub use store::{Network, PgReconciliationStore, ReconciliationStore, User};
