//! Meshwork reconciliation daemon.
//!
//! Long-running background process for the admin application: connects to
//! the database and the network controller, then drives two scheduled jobs.
//! The expiry sweep deactivates expired accounts and revokes their members'
//! network access; the peer sync refreshes stored member connectivity from
//! live controller state.

mod config;
mod logging;

use std::sync::Arc;

use config::AppConfig;
use meshwork_controller::{ControllerApi, ControllerClient};
use meshwork_db::DbPool;
use meshwork_recon::{
    ExpirySweepJob, JobScheduler, PeerSyncJob, PgReconciliationStore, EXPIRY_SWEEP_JOB,
    PEER_SYNC_JOB,
};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        controller = %config.controller.base_url,
        sync_interval_secs = config.recon.sync_interval_secs,
        sync_concurrency = config.recon.sync_concurrency,
        expiry_cron = %config.recon.expiry_cron,
        timezone = %config.recon.timezone,
        "Starting meshwork-syncd"
    );

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration rejected");
        eprintln!("FATAL: {e}");
        std::process::exit(1);
    }

    // Create database connection pool
    let pool = match DbPool::connect(&config.database_url).await {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if config.auto_migrate {
        if let Err(e) = meshwork_db::run_migrations(&pool).await {
            eprintln!("FATAL: Database migration failed: {e}");
            std::process::exit(1);
        }
        info!("Database migrations applied");
    }

    // Create controller client
    let controller = match ControllerClient::new(config.controller.clone()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to create controller client: {e}");
            std::process::exit(1);
        }
    };

    // Startup reachability probe. Failure is not fatal: jobs retry on their
    // cadence, and the controller may simply not be up yet.
    match controller.status().await {
        Ok(status) => info!(
            online = status.online,
            controller_version = status.version.as_deref().unwrap_or("unknown"),
            "Controller reachable"
        ),
        Err(e) => warn!(
            error = %e,
            "Controller status probe failed, jobs will retry on their cadence"
        ),
    }

    let store = Arc::new(PgReconciliationStore::new(pool));

    let expiry_sweep = ExpirySweepJob::new(controller.clone(), store.clone());
    let peer_sync = PeerSyncJob::new(controller.clone(), store.clone())
        .with_concurrency(config.recon.sync_concurrency);

    let expiry_cadence = match config.recon.expiry_cadence() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };
    let sync_cadence = match config.recon.sync_cadence() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    let mut scheduler = JobScheduler::new();
    if let Err(e) = scheduler.schedule(EXPIRY_SWEEP_JOB, expiry_cadence, Arc::new(expiry_sweep)) {
        eprintln!("FATAL: Failed to schedule expiry sweep: {e}");
        std::process::exit(1);
    }
    if let Err(e) = scheduler.schedule(PEER_SYNC_JOB, sync_cadence, Arc::new(peer_sync)) {
        eprintln!("FATAL: Failed to schedule peer sync: {e}");
        std::process::exit(1);
    }
    if let Err(e) = scheduler.start() {
        eprintln!("FATAL: Failed to start scheduler: {e}");
        std::process::exit(1);
    }

    shutdown_signal().await;

    if let Err(e) = scheduler.stop().await {
        tracing::error!(error = %e, "Scheduler stop failed");
    }
    info!("Shutdown complete");
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                // Wait forever if we can't install the handler
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
