//! Job scheduling.
//!
//! Runs named recurring jobs on cron or fixed-interval cadences, one tokio
//! task per job. A job never has two invocations running concurrently: the
//! next fire time is computed after the previous invocation completes, so
//! overrun firings are skipped, not queued. A failing or panicking
//! invocation is logged and the cadence continues; nothing propagates.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{ReconError, ReconResult};

/// When a job fires.
#[derive(Debug, Clone)]
pub enum Cadence {
    /// Six-field cron expression (seconds first) evaluated in a fixed
    /// timezone.
    Cron {
        expr: String,
        schedule: Schedule,
        timezone: Tz,
    },

    /// Fixed interval, measured from the end of the previous invocation.
    Every(Duration),
}

impl Cadence {
    /// Parse a six-field cron expression evaluated in `timezone`.
    ///
    /// Invalid expressions are rejected here, at registration time, never
    /// at fire time.
    pub fn cron(expr: &str, timezone: Tz) -> ReconResult<Self> {
        let schedule = Schedule::from_str(expr)
            .map_err(|e| ReconError::invalid_cadence(expr, e.to_string()))?;
        Ok(Self::Cron {
            expr: expr.to_string(),
            schedule,
            timezone,
        })
    }

    /// Fire `interval` after registration, then `interval` after each
    /// completion.
    pub fn every(interval: Duration) -> ReconResult<Self> {
        if interval.is_zero() {
            return Err(ReconError::invalid_cadence(
                "every 0s",
                "interval must be non-zero",
            ));
        }
        Ok(Self::Every(interval))
    }

    /// Next fire time strictly after `after`, or `None` when the cadence
    /// yields no further times.
    #[must_use]
    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Cadence::Cron {
                schedule, timezone, ..
            } => schedule
                .after(&after.with_timezone(timezone))
                .next()
                .map(|t| t.with_timezone(&Utc)),
            Cadence::Every(interval) => {
                Some(after + chrono::Duration::from_std(*interval).ok()?)
            }
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cadence::Cron { expr, timezone, .. } => write!(f, "cron '{expr}' ({timezone})"),
            Cadence::Every(interval) => write!(f, "every {}s", interval.as_secs()),
        }
    }
}

/// Outcome counts for one job invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Units processed successfully.
    pub processed: usize,
    /// Units that failed and were left for a later cycle.
    pub failed: usize,
    /// Units skipped without attempting work.
    pub skipped: usize,
}

impl CycleSummary {
    /// Create an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one unit as processed.
    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    /// Count one unit as failed.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Count one unit as skipped.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Fold another summary's counts into this one.
    pub fn merge(&mut self, other: &CycleSummary) {
        self.processed += other.processed;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// A recurring unit of background work.
#[async_trait]
pub trait Job: Send + Sync {
    /// Run one invocation.
    ///
    /// Per-unit failures are expected to be handled inside the job and
    /// reflected in the summary; an `Err` marks the whole invocation failed
    /// (e.g. the initial store enumeration was unavailable).
    async fn run(&self) -> ReconResult<CycleSummary>;
}

/// Handle to one registered job.
///
/// Cancelling stops future firings; an in-flight invocation always runs to
/// completion. Dropping the handle does not affect the job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    name: Arc<str>,
    cancel: CancellationToken,
    finished: CancellationToken,
}

impl JobHandle {
    /// Name the job was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop this job's cadence.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the job's driver task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.is_cancelled()
    }

    /// Wait until the job's driver task has exited.
    ///
    /// Completes only after the in-flight invocation, if any, has finished.
    pub async fn stopped(&self) {
        self.finished.cancelled().await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Stopped,
}

struct Registration {
    name: String,
    cadence: Cadence,
    job: Arc<dyn Job>,
    handle: JobHandle,
}

/// Runs registered jobs on their cadences.
///
/// Lifecycle: register jobs with [`schedule`](Self::schedule) while idle,
/// [`start`](Self::start) once, [`stop`](Self::stop) once. A stopped
/// scheduler stays stopped; tests instantiate a fresh one per case.
pub struct JobScheduler {
    jobs: Vec<Registration>,
    root: CancellationToken,
    state: State,
}

impl JobScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            root: CancellationToken::new(),
            state: State::Idle,
        }
    }

    /// Register `job` to run under `name` on `cadence`.
    ///
    /// Returns the job's cancellation handle. Fails once the scheduler has
    /// started, or when the name is already taken.
    pub fn schedule(
        &mut self,
        name: impl Into<String>,
        cadence: Cadence,
        job: Arc<dyn Job>,
    ) -> ReconResult<JobHandle> {
        if self.state != State::Idle {
            return Err(ReconError::AlreadyStarted);
        }
        let name = name.into();
        if self.jobs.iter().any(|j| j.name == name) {
            return Err(ReconError::duplicate_job(name));
        }

        let handle = JobHandle {
            name: Arc::from(name.as_str()),
            cancel: self.root.child_token(),
            finished: CancellationToken::new(),
        };
        self.jobs.push(Registration {
            name,
            cadence,
            job,
            handle: handle.clone(),
        });
        Ok(handle)
    }

    /// Spawn one driver task per registered job.
    pub fn start(&mut self) -> ReconResult<()> {
        if self.state != State::Idle {
            return Err(ReconError::AlreadyStarted);
        }
        self.state = State::Running;

        for registration in &self.jobs {
            info!(
                job = %registration.name,
                cadence = %registration.cadence,
                "Scheduling job"
            );
            tokio::spawn(drive_job(
                registration.name.clone(),
                registration.cadence.clone(),
                registration.job.clone(),
                registration.handle.clone(),
            ));
        }
        Ok(())
    }

    /// Cancel every job and wait for in-flight invocations to finish.
    pub async fn stop(&mut self) -> ReconResult<()> {
        if self.state != State::Running {
            return Err(ReconError::NotStarted);
        }
        self.state = State::Stopped;

        info!("Stopping scheduler");
        self.root.cancel();
        for registration in &self.jobs {
            registration.handle.stopped().await;
        }
        info!("Scheduler stopped");
        Ok(())
    }

    /// Handles for every registered job, in registration order.
    #[must_use]
    pub fn handles(&self) -> Vec<JobHandle> {
        self.jobs.iter().map(|j| j.handle.clone()).collect()
    }
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-job driver loop: sleep until the next fire time, run, repeat.
async fn drive_job(name: String, cadence: Cadence, job: Arc<dyn Job>, handle: JobHandle) {
    // Wakes `JobHandle::stopped` waiters when the driver exits, even by panic.
    let _finished = handle.finished.clone().drop_guard();

    loop {
        let now = Utc::now();
        let Some(next) = cadence.next_fire(now) else {
            warn!(job = %name, "Cadence yields no further fire times, stopping job");
            break;
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

        tokio::select! {
            () = handle.cancel.cancelled() => {
                info!(job = %name, "Job cancelled");
                break;
            }
            () = tokio::time::sleep(wait) => {}
        }

        run_once(&name, &job).await;
    }
}

/// Run one invocation with failure and panic containment.
async fn run_once(name: &str, job: &Arc<dyn Job>) {
    let started = std::time::Instant::now();

    let invocation = tokio::spawn({
        let job = job.clone();
        async move { job.run().await }
    });

    let outcome = invocation.await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(summary)) => {
            info!(
                job = %name,
                duration_ms = duration_ms,
                processed = summary.processed,
                failed = summary.failed,
                skipped = summary.skipped,
                "Job invocation finished"
            );
        }
        Ok(Err(e)) => {
            error!(
                job = %name,
                duration_ms = duration_ms,
                error = %e,
                "Job invocation failed"
            );
        }
        Err(e) if e.is_panic() => {
            error!(
                job = %name,
                duration_ms = duration_ms,
                "Job invocation panicked"
            );
        }
        Err(_) => {
            // Aborted join: only at runtime shutdown.
            warn!(job = %name, "Job invocation was aborted");
        }
    }
}
