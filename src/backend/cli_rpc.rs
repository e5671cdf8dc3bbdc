//! Concrete backend that shells out to the wallet node's companion CLI.
//!
//! Status and stop requests run `<cli> getinfo` / `<cli> stop` as short
//! subprocesses; the daemon itself is spawned directly with detached stdio.
//! While the daemon is warming up, the companion CLI exits non-zero and
//! prints the `error code: -28` text form on stderr; that is decoded into a
//! "still starting" [`StatusResponse`] rather than treated as unreachable.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::backend::{ProcessHandle, WalletBackend};
use crate::core::config::SupervisorConfig;
use crate::core::errors::{Result, WdhError};
use crate::status::StatusResponse;

/// Sleep slice used while waiting on a child inside `wait_timeout`.
const WAIT_SLICE: Duration = Duration::from_millis(25);

// ---------------------------------------------------------------------------
// ChildHandle
// ---------------------------------------------------------------------------

/// [`ProcessHandle`] backed by an owned `std::process::Child`.
pub struct ChildHandle {
    child: Child,
}

impl ChildHandle {
    #[must_use]
    pub const fn new(child: Child) -> Self {
        Self { child }
    }
}

impl ProcessHandle for ChildHandle {
    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn is_alive(&mut self) -> bool {
        // try_wait errors leave the status unknown; assume alive so the
        // shutdown path still attempts a forceful kill.
        !matches!(self.child.try_wait(), Ok(Some(_)))
    }

    fn wait_timeout(&mut self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return Ok(true),
                Ok(None) => {}
                Err(source) => {
                    return Err(WdhError::Runtime {
                        details: format!("wait on pid {} failed: {source}", self.child.id()),
                    });
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(WAIT_SLICE.min(deadline.saturating_duration_since(Instant::now())));
        }
    }

    fn kill(&mut self) -> Result<()> {
        self.child.kill().map_err(|source| WdhError::Shutdown {
            details: format!("kill pid {} failed: {source}", self.child.id()),
        })?;
        // reap, so a force-killed daemon does not linger as a zombie
        self.child.wait().map_err(|source| WdhError::Shutdown {
            details: format!("reap pid {} failed: {source}", self.child.id()),
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CliBackend
// ---------------------------------------------------------------------------

/// Backend that reaches the daemon through its companion CLI binary.
#[derive(Debug, Clone)]
pub struct CliBackend {
    daemon_bin: PathBuf,
    daemon_args: Vec<String>,
    cli_bin: PathBuf,
    cli_args: Vec<String>,
}

impl CliBackend {
    /// Build a backend from the supervisor configuration.
    #[must_use]
    pub fn from_config(config: &SupervisorConfig) -> Self {
        Self {
            daemon_bin: config.daemon_bin.clone(),
            daemon_args: config.daemon_args.clone(),
            cli_bin: config.cli_bin.clone(),
            cli_args: config.cli_args.clone(),
        }
    }

    /// Run one companion CLI command, capturing output.
    fn run_cli(&self, command: &str) -> Result<std::process::Output> {
        Command::new(&self.cli_bin)
            .args(&self.cli_args)
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| WdhError::wallet_call(format!(
                "failed to run {}: {source}",
                self.cli_bin.display()
            )))
    }
}

impl WalletBackend for CliBackend {
    fn query_status(&self) -> Result<StatusResponse> {
        let output = self.run_cli("getinfo")?;
        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            return StatusResponse::from_json(stdout.trim());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        // A non-zero exit with the structured error text means the daemon
        // answered; anything else means it is not reachable.
        StatusResponse::from_error_text(stderr.trim()).map_or_else(
            || {
                Err(WdhError::wallet_call(format!(
                    "getinfo failed ({}): {}",
                    output.status,
                    stderr.trim()
                )))
            },
            Ok,
        )
    }

    fn start_daemon(&self) -> Result<Box<dyn ProcessHandle>> {
        let child = Command::new(&self.daemon_bin)
            .args(&self.daemon_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| WdhError::Spawn {
                binary: self.daemon_bin.clone(),
                source,
            })?;
        Ok(Box::new(ChildHandle::new(child)))
    }

    fn stop_daemon(&self) -> Result<()> {
        let output = self.run_cli("stop")?;
        if output.status.success() {
            Ok(())
        } else {
            Err(WdhError::wallet_call(format!(
                "stop failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
