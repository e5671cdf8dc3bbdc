//! Supervisor configuration: binaries, timing knobs, readiness policy.
//!
//! Loaded from TOML or built from `Default`. Durations are stored as
//! millisecond fields so the TOML surface stays flat.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, WdhError};

/// Reserved "still starting" status code reported by the wallet daemon
/// while it is initializing (loading the block index, verifying the wallet).
pub const STILL_STARTING_CODE: i64 = -28;

/// Configuration for a [`DaemonSupervisor`](crate::supervisor::DaemonSupervisor).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupervisorConfig {
    /// Daemon executable to launch when no instance is reachable.
    pub daemon_bin: PathBuf,
    /// Extra arguments passed to the daemon executable.
    pub daemon_args: Vec<String>,
    /// Companion CLI executable used for status and stop requests.
    pub cli_bin: PathBuf,
    /// Arguments prepended to every companion CLI invocation
    /// (e.g. `-datadir=...`).
    pub cli_args: Vec<String>,
    /// Status code meaning "still starting"; anything else means ready.
    pub reserved_code: i64,
    /// Fixed delay between status polls.
    pub poll_period_ms: u64,
    /// Delay between spawning the daemon and the first poll.
    pub grace_period_ms: u64,
    /// How long to wait for voluntary exit before killing forcefully.
    pub shutdown_wait_ms: u64,
    /// Overall startup deadline. `None` polls without bound.
    pub startup_timeout_ms: Option<u64>,
    /// When true, a non-reserved error code fails startup instead of
    /// being treated as ready.
    pub strict_readiness: bool,
    /// Optional first-run script executed before supervision begins.
    pub bootstrap_script: Option<PathBuf>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            daemon_bin: PathBuf::from("walletd"),
            daemon_args: Vec::new(),
            cli_bin: PathBuf::from("wallet-cli"),
            cli_args: Vec::new(),
            reserved_code: STILL_STARTING_CODE,
            poll_period_ms: 250,
            grace_period_ms: 250,
            shutdown_wait_ms: 1000,
            startup_timeout_ms: None,
            strict_readiness: false,
            bootstrap_script: None,
        }
    }
}

impl SupervisorConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WdhError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| WdhError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the supervisor cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.poll_period_ms == 0 {
            return Err(WdhError::InvalidConfig {
                details: "poll_period_ms must be greater than zero".to_string(),
            });
        }
        if self.daemon_bin.as_os_str().is_empty() {
            return Err(WdhError::InvalidConfig {
                details: "daemon_bin must not be empty".to_string(),
            });
        }
        if self.cli_bin.as_os_str().is_empty() {
            return Err(WdhError::InvalidConfig {
                details: "cli_bin must not be empty".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    #[must_use]
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    #[must_use]
    pub fn shutdown_wait(&self) -> Duration {
        Duration::from_millis(self.shutdown_wait_ms)
    }

    #[must_use]
    pub fn startup_timeout(&self) -> Option<Duration> {
        self.startup_timeout_ms.map(Duration::from_millis)
    }
}
