//! Backend collaborator seam: status queries, daemon launch, stop requests.
//!
//! The supervisor never talks to a process or an RPC transport directly; it
//! goes through [`WalletBackend`], and owns the daemon it launches through
//! [`ProcessHandle`]. Tests substitute scripted doubles for both.

pub mod bootstrap;
pub mod cli_rpc;

use std::time::Duration;

use crate::core::errors::Result;
use crate::status::StatusResponse;

pub use cli_rpc::{ChildHandle, CliBackend};

/// Handle to a daemon process this supervisor spawned.
pub trait ProcessHandle: Send {
    /// OS process id, for logging.
    fn pid(&self) -> u32;

    /// Whether the process has not yet exited.
    fn is_alive(&mut self) -> bool;

    /// Wait up to `timeout` for the process to exit voluntarily.
    /// Returns `true` if it exited within the window.
    fn wait_timeout(&mut self, timeout: Duration) -> Result<bool>;

    /// Terminate the process forcefully.
    fn kill(&mut self) -> Result<()>;
}

/// External collaborator for reaching and controlling the wallet daemon.
///
/// `Send + Sync` so one backend can be shared between the supervision
/// thread and the cleanup guard that outlives it.
pub trait WalletBackend: Send + Sync {
    /// Query daemon status. Any error means "not reachable"; a decoded
    /// response means the daemon answered, possibly with a "still
    /// starting" code.
    fn query_status(&self) -> Result<StatusResponse>;

    /// Spawn the daemon, returning a live handle the caller owns.
    fn start_daemon(&self) -> Result<Box<dyn ProcessHandle>>;

    /// Request graceful termination of the daemon.
    fn stop_daemon(&self) -> Result<()>;
}
