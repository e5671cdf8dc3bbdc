//! Optional first-run bootstrap step.
//!
//! Some installs ship a one-time platform script (unpacking parameters,
//! fixing up paths) that must finish before the daemon is launched. This is
//! environment glue, not supervision: it runs as an explicit pre-step and
//! never as part of the poll loop.

use std::path::Path;
use std::process::Command;

use crate::core::config::SupervisorConfig;
use crate::core::errors::{Result, WdhError};

/// Run a bootstrap script to completion.
pub fn run_script(script: &Path) -> Result<()> {
    let status = Command::new(script)
        .status()
        .map_err(|source| WdhError::Io {
            path: script.to_path_buf(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(WdhError::Runtime {
            details: format!("bootstrap script {} exited with {status}", script.display()),
        })
    }
}

/// Run the configured bootstrap script, if any.
pub fn run_if_configured(config: &SupervisorConfig) -> Result<()> {
    match &config.bootstrap_script {
        Some(script) => run_script(script),
        None => Ok(()),
    }
}
