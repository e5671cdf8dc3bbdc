//! Wallet Daemon Helper: supervises the startup and shutdown of a wallet
//! backend daemon.
//!
//! The core sequence is small by design: probe whether the daemon is already
//! reachable, spawn it if not, poll its status at a fixed period until the
//! reserved "still starting" code disappears (reporting each progress
//! message on the way), and hand back an owned [`CleanupGuard`] that stops
//! the daemon — gracefully first, forcefully after a bounded wait — exactly
//! when this process was the one that started it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wallet_daemon_helper::{
//!     CliBackend, DaemonSupervisor, SupervisorConfig, WalletBackend, progress_pair,
//! };
//! use wallet_daemon_helper::logger::EventLog;
//!
//! # fn main() -> wallet_daemon_helper::Result<()> {
//! let config = SupervisorConfig::default();
//! let backend: Arc<dyn WalletBackend> = Arc::new(CliBackend::from_config(&config));
//! let (reporter, stream) = progress_pair();
//! let mut supervisor =
//!     DaemonSupervisor::new(backend, config, reporter, Arc::new(EventLog::stderr_only()));
//! let mut outcome = supervisor.ensure_running()?;
//! // ... run the application; `stream` carries progress while starting ...
//! if let Some(guard) = outcome.guard.as_mut() {
//!     guard.release();
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod core;
pub mod logger;
pub mod status;
pub mod supervisor;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod cli_app;

pub use backend::{ChildHandle, CliBackend, ProcessHandle, WalletBackend};
pub use self::core::config::{STILL_STARTING_CODE, SupervisorConfig};
pub use self::core::errors::{Result, WdhError};
pub use status::{StatusResponse, UNKNOWN_PROGRESS};
pub use supervisor::{
    CleanupGuard, DaemonSupervisor, ProgressReporter, ProgressStream, StartupOutcome,
    SupervisorState, progress_pair,
};
