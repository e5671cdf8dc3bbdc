//! Daemon supervision: probe, launch, poll until ready, owned cleanup.
//!
//! The sequence runs on one thread and blocks between polls; callers that
//! answer to a UI run it on a worker thread and watch the progress stream.

pub mod progress;
pub mod shutdown;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::backend::WalletBackend;
use crate::core::config::SupervisorConfig;
use crate::core::errors::{Result, WdhError};
use crate::logger::EventLog;

pub use progress::{ProgressReporter, ProgressStream, progress_pair};
pub use shutdown::CleanupGuard;

/// Slice used for cancellation-aware sleeping.
const CANCEL_CHECK_SLICE: Duration = Duration::from_millis(10);

/// Where the supervision sequence currently stands. Transitions are linear;
/// `AlreadyRunning`, `Ready` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No probe has run yet.
    Unchecked,
    /// The first probe answered; somebody else runs the daemon.
    AlreadyRunning,
    /// We spawned the daemon and are polling for readiness.
    Starting,
    /// The daemon we spawned answered without the reserved code.
    Ready,
    /// Startup was cancelled, timed out, or errored.
    Failed,
}

/// Result of [`DaemonSupervisor::ensure_running`].
pub struct StartupOutcome {
    /// True when this supervisor spawned the daemon.
    pub owns_process: bool,
    /// Cleanup token, present exactly when `owns_process` is true.
    pub guard: Option<CleanupGuard>,
}

// Manual impl: CleanupGuard holds trait objects, so only its presence is
// printable.
impl fmt::Debug for StartupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartupOutcome")
            .field("owns_process", &self.owns_process)
            .field("has_guard", &self.guard.is_some())
            .finish()
    }
}

/// Ensures exactly one reachable daemon instance, spawning one if needed.
pub struct DaemonSupervisor {
    backend: Arc<dyn WalletBackend>,
    config: SupervisorConfig,
    progress: ProgressReporter,
    log: Arc<EventLog>,
    cancel: Arc<AtomicBool>,
    state: SupervisorState,
}

impl DaemonSupervisor {
    /// Build a supervisor over the given backend.
    #[must_use]
    pub fn new(
        backend: Arc<dyn WalletBackend>,
        config: SupervisorConfig,
        progress: ProgressReporter,
        log: Arc<EventLog>,
    ) -> Self {
        Self {
            backend,
            config,
            progress,
            log,
            cancel: Arc::new(AtomicBool::new(false)),
            state: SupervisorState::Unchecked,
        }
    }

    /// Shared flag that aborts the sequence when set from another thread.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Current supervision state.
    #[must_use]
    pub const fn state(&self) -> SupervisorState {
        self.state
    }

    /// Ensure a reachable daemon instance exists.
    ///
    /// Probes once; a reachable daemon short-circuits with
    /// `owns_process = false`. Otherwise spawns the daemon, waits one grace
    /// period, then polls at the configured period until a response without
    /// the reserved "still starting" code arrives, reporting each progress
    /// message on the way. On success the returned [`CleanupGuard`] owns the
    /// spawned process; if the sequence fails after the spawn, the guard is
    /// released in place so the process is not orphaned.
    pub fn ensure_running(&mut self) -> Result<StartupOutcome> {
        if self.state != SupervisorState::Unchecked {
            return Err(WdhError::Runtime {
                details: format!("supervision sequence already ran (state {:?})", self.state),
            });
        }

        self.log.info("probe", "checking if the daemon is already running");
        if self.backend.query_status().is_ok() {
            self.state = SupervisorState::AlreadyRunning;
            self.log.info("already_running", "daemon is reachable, not starting another");
            return Ok(StartupOutcome {
                owns_process: false,
                guard: None,
            });
        }

        self.log.info("spawning", "daemon not reachable, starting it");
        let handle = match self.backend.start_daemon() {
            Ok(handle) => handle,
            Err(error) => {
                self.state = SupervisorState::Failed;
                self.log.error("spawn_failed", &error.to_string());
                return Err(error);
            }
        };
        self.state = SupervisorState::Starting;
        self.log
            .info("spawned", &format!("daemon running as pid {}", handle.pid()));

        let mut guard = CleanupGuard::new(
            Arc::clone(&self.backend),
            handle,
            self.config.shutdown_wait(),
            Arc::clone(&self.log),
        );

        match self.poll_until_ready() {
            Ok(polls) => {
                self.state = SupervisorState::Ready;
                self.log
                    .info("ready", &format!("daemon ready after {polls} polls"));
                Ok(StartupOutcome {
                    owns_process: true,
                    guard: Some(guard),
                })
            }
            Err(error) => {
                self.state = SupervisorState::Failed;
                self.log.error("startup_failed", &error.to_string());
                guard.release();
                Err(error)
            }
        }
    }

    /// Grace period, then the fixed-period poll loop. Returns the number of
    /// status queries it took to see readiness.
    fn poll_until_ready(&self) -> Result<u64> {
        self.sleep_checked(self.config.grace_period())?;

        let started = Instant::now();
        let mut polls: u64 = 0;
        loop {
            polls += 1;
            let response = self.backend.query_status()?;
            if !response.is_still_starting(self.config.reserved_code) {
                if self.config.strict_readiness
                    && let Some(code) = response.code
                {
                    return Err(WdhError::NotReady {
                        code,
                        message: response.progress_text().to_string(),
                    });
                }
                return Ok(polls);
            }

            self.progress.report(response.progress_text());

            if let Some(limit) = self.config.startup_timeout()
                && started.elapsed() >= limit
            {
                return Err(WdhError::StartupTimeout {
                    waited_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                });
            }
            self.sleep_checked(self.config.poll_period())?;
        }
    }

    /// Sleep for `duration`, waking early with [`WdhError::Cancelled`] when
    /// the cancel flag is raised.
    fn sleep_checked(&self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(WdhError::Cancelled);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            std::thread::sleep(remaining.min(CANCEL_CHECK_SLICE));
        }
    }
}
