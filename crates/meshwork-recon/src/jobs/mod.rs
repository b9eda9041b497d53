//! Reconciliation jobs.

pub mod expiry_sweep;
pub mod peer_sync;

pub use expiry_sweep::{ExpirySweepJob, EXPIRY_SWEEP_JOB};
pub use peer_sync::{PeerSyncJob, PEER_SYNC_JOB};
