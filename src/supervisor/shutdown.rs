//! Owned cleanup token for a daemon this supervisor started.
//!
//! Replaces an ambient process-exit hook with an explicit guard: the caller
//! decides when shutdown runs, and `Drop` covers the paths that forget.
//! Shutdown failures are logged and swallowed; by the time this runs the
//! host process is exiting anyway.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{ProcessHandle, WalletBackend};
use crate::logger::EventLog;

/// Owns the spawned daemon and stops it exactly once.
pub struct CleanupGuard {
    backend: Arc<dyn WalletBackend>,
    handle: Option<Box<dyn ProcessHandle>>,
    shutdown_wait: Duration,
    log: Arc<EventLog>,
}

impl CleanupGuard {
    pub(crate) fn new(
        backend: Arc<dyn WalletBackend>,
        handle: Box<dyn ProcessHandle>,
        shutdown_wait: Duration,
        log: Arc<EventLog>,
    ) -> Self {
        Self {
            backend,
            handle: Some(handle),
            shutdown_wait,
            log,
        }
    }

    /// Process id of the owned daemon, until released.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.handle.as_ref().map(|handle| handle.pid())
    }

    /// Whether shutdown has already run.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    /// Stop the daemon: graceful stop request, bounded wait, then forceful
    /// kill if it is still alive. Idempotent; subsequent calls are no-ops.
    pub fn release(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };
        let pid = handle.pid();
        self.log
            .info("daemon_stopping", &format!("stopping pid {pid} because we started it"));

        if let Err(error) = self.backend.stop_daemon() {
            self.log
                .warn("stop_request_failed", &format!("pid {pid}: {error}"));
        }

        match handle.wait_timeout(self.shutdown_wait) {
            Ok(true) => {
                self.log
                    .info("daemon_stopped", &format!("pid {pid} shut down voluntarily"));
                return;
            }
            Ok(false) => {
                self.log
                    .warn("daemon_still_alive", &format!("pid {pid} outlived the shutdown wait"));
            }
            Err(error) => {
                self.log
                    .warn("shutdown_wait_failed", &format!("pid {pid}: {error}"));
            }
        }

        if let Err(error) = handle.kill() {
            self.log
                .warn("force_kill_failed", &format!("pid {pid}: {error}"));
        } else {
            self.log
                .info("daemon_killed", &format!("pid {pid} terminated forcefully"));
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.release();
    }
}
