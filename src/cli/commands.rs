//! Handlers for `wdh start`, `wdh status` and `wdh stop`.
//!
//! `start` keeps the supervision sequence off the main thread: the worker
//! runs `ensure_running` while the main thread drains and prints progress,
//! the way a GUI shell would keep its splash screen responsive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize as _;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::backend::{CliBackend, WalletBackend, bootstrap};
use crate::core::config::SupervisorConfig;
use crate::core::errors::{Result, WdhError};
use crate::logger::EventLog;
use crate::supervisor::{DaemonSupervisor, StartupOutcome, progress_pair};

/// How often the presentation loop wakes to check for progress/exit.
const PRESENT_TICK: Duration = Duration::from_millis(100);

/// Ensure the daemon is running. If this process started it, hold until a
/// termination signal arrives, then release the cleanup guard.
pub fn start(config: SupervisorConfig, log: Arc<EventLog>) -> Result<()> {
    bootstrap::run_if_configured(&config)?;

    let backend: Arc<dyn WalletBackend> = Arc::new(CliBackend::from_config(&config));
    let (reporter, stream) = progress_pair();
    let mut supervisor = DaemonSupervisor::new(backend, config, reporter, log);
    let cancel = supervisor.cancel_flag();
    forward_signals_to(&cancel)?;

    let worker = std::thread::spawn(move || supervisor.ensure_running());
    while !worker.is_finished() {
        if let Some(message) = stream.recv_timeout(PRESENT_TICK) {
            eprintln!("  {}", message.dimmed());
        }
    }
    for message in stream.drain() {
        eprintln!("  {}", message.dimmed());
    }

    let outcome = worker.join().map_err(|_| WdhError::Runtime {
        details: "supervision thread panicked".to_string(),
    })??;

    match outcome {
        StartupOutcome {
            owns_process: false,
            ..
        } => {
            println!("{}", "daemon already running; nothing to supervise".green());
            Ok(())
        }
        StartupOutcome {
            guard: Some(mut guard),
            ..
        } => {
            let pid = guard.pid().unwrap_or_default();
            println!(
                "{} (pid {pid}); press Ctrl-C to stop it",
                "daemon started".green()
            );
            while !cancel.load(Ordering::Relaxed) {
                std::thread::sleep(PRESENT_TICK);
            }
            guard.release();
            println!("daemon stopped");
            Ok(())
        }
        StartupOutcome { guard: None, .. } => Err(WdhError::Runtime {
            details: "started the daemon but received no cleanup guard".to_string(),
        }),
    }
}

/// Probe the daemon once and print the result.
pub fn status(config: &SupervisorConfig, json: bool) -> Result<()> {
    let backend = CliBackend::from_config(config);
    let response = backend.query_status()?;
    if json {
        println!("{}", serde_json::to_string(&response).map_err(WdhError::from)?);
    } else if response.is_still_starting(config.reserved_code) {
        println!("{}: {}", "starting".yellow(), response.progress_text());
    } else {
        println!("{}", "ready".green());
    }
    Ok(())
}

/// Send a graceful stop request through the backend.
pub fn stop(config: &SupervisorConfig) -> Result<()> {
    let backend = CliBackend::from_config(config);
    backend.stop_daemon()?;
    println!("stop request sent");
    Ok(())
}

/// Raise `cancel` when SIGINT or SIGTERM arrives. The same flag cancels a
/// startup in flight and, once ready, triggers the shutdown path.
fn forward_signals_to(cancel: &Arc<AtomicBool>) -> Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(|source| WdhError::Runtime {
        details: format!("cannot install signal handlers: {source}"),
    })?;
    let cancel = Arc::clone(cancel);
    std::thread::spawn(move || {
        if signals.forever().next().is_some() {
            cancel.store(true, Ordering::Relaxed);
        }
    });
    Ok(())
}
