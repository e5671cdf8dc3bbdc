//! End-to-end supervision flows over scripted backend doubles.
//!
//! Exercises the full probe → spawn → poll → ready sequence and the
//! shutdown ordering guarantees of the cleanup guard.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use proptest::prelude::*;

use wallet_daemon_helper::logger::EventLog;
use wallet_daemon_helper::{
    DaemonSupervisor, ProcessHandle, ProgressStream, Result, StatusResponse, SupervisorConfig,
    SupervisorState, WalletBackend, WdhError, progress_pair,
};

// ---------------------------------------------------------------------------
// Doubles
// ---------------------------------------------------------------------------

/// Ordered record of backend/process interactions, shared across doubles.
type EventTrace = Arc<Mutex<Vec<&'static str>>>;

struct RecordingHandle {
    trace: EventTrace,
    alive: bool,
    exits_within_wait: bool,
}

impl ProcessHandle for RecordingHandle {
    fn pid(&self) -> u32 {
        7001
    }

    fn is_alive(&mut self) -> bool {
        self.alive
    }

    fn wait_timeout(&mut self, _timeout: Duration) -> Result<bool> {
        self.trace.lock().push("wait");
        if self.exits_within_wait {
            self.alive = false;
        }
        Ok(!self.alive)
    }

    fn kill(&mut self) -> Result<()> {
        self.trace.lock().push("kill");
        self.alive = false;
        Ok(())
    }
}

struct RecordingBackend {
    statuses: Mutex<VecDeque<Result<StatusResponse>>>,
    queries: AtomicU32,
    starts: AtomicU32,
    trace: EventTrace,
    daemon_exits_within_wait: bool,
}

impl RecordingBackend {
    fn with_wait_behavior(
        statuses: Vec<Result<StatusResponse>>,
        daemon_exits_within_wait: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            queries: AtomicU32::new(0),
            starts: AtomicU32::new(0),
            trace: Arc::new(Mutex::new(Vec::new())),
            daemon_exits_within_wait,
        })
    }

    fn new(statuses: Vec<Result<StatusResponse>>) -> Arc<Self> {
        Self::with_wait_behavior(statuses, true)
    }

    /// A backend whose daemon ignores the stop request and outlives the
    /// bounded shutdown wait.
    fn stubborn(statuses: Vec<Result<StatusResponse>>) -> Arc<Self> {
        Self::with_wait_behavior(statuses, false)
    }

    fn query_count(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }

    fn start_count(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    fn trace(&self) -> Vec<&'static str> {
        self.trace.lock().clone()
    }

    fn remaining_statuses(&self) -> usize {
        self.statuses.lock().len()
    }
}

impl WalletBackend for RecordingBackend {
    fn query_status(&self) -> Result<StatusResponse> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(StatusResponse::ready()))
    }

    fn start_daemon(&self) -> Result<Box<dyn ProcessHandle>> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.trace.lock().push("start");
        Ok(Box::new(RecordingHandle {
            trace: Arc::clone(&self.trace),
            alive: true,
            exits_within_wait: self.daemon_exits_within_wait,
        }))
    }

    fn stop_daemon(&self) -> Result<()> {
        self.trace.lock().push("stop");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fast_config() -> SupervisorConfig {
    SupervisorConfig {
        poll_period_ms: 1,
        grace_period_ms: 1,
        shutdown_wait_ms: 1,
        ..SupervisorConfig::default()
    }
}

fn unreachable() -> Result<StatusResponse> {
    Err(WdhError::wallet_call("connection refused"))
}

fn still_starting(message: &str) -> Result<StatusResponse> {
    Ok(StatusResponse::starting(
        SupervisorConfig::default().reserved_code,
        message,
    ))
}

fn build_supervisor(backend: Arc<RecordingBackend>) -> (DaemonSupervisor, ProgressStream) {
    let (reporter, stream) = progress_pair();
    let supervisor = DaemonSupervisor::new(
        backend,
        fast_config(),
        reporter,
        Arc::new(EventLog::stderr_only()),
    );
    (supervisor, stream)
}

// ---------------------------------------------------------------------------
// Startup flows
// ---------------------------------------------------------------------------

#[test]
fn immediate_status_success_means_not_ours() {
    let backend = RecordingBackend::new(vec![Ok(StatusResponse::ready())]);
    let (mut supervisor, stream) = build_supervisor(Arc::clone(&backend));

    let outcome = supervisor.ensure_running().expect("should succeed");

    assert!(!outcome.owns_process);
    assert!(outcome.guard.is_none());
    assert_eq!(backend.start_count(), 0);
    assert_eq!(backend.query_count(), 1, "probe only, zero polls");
    assert!(stream.drain().is_empty());
    assert_eq!(supervisor.state(), SupervisorState::AlreadyRunning);
}

#[test]
fn failed_probe_starts_daemon_exactly_once() {
    let backend = RecordingBackend::new(vec![unreachable(), Ok(StatusResponse::ready())]);
    let (mut supervisor, _stream) = build_supervisor(Arc::clone(&backend));

    let outcome = supervisor.ensure_running().expect("should succeed");

    assert!(outcome.owns_process);
    assert_eq!(backend.start_count(), 1);
}

#[test]
fn three_reserved_polls_then_ready_reports_three_messages() {
    let backend = RecordingBackend::new(vec![
        unreachable(),
        still_starting("Loading block index..."),
        still_starting("Verifying blocks..."),
        still_starting("Verifying wallet(s)..."),
        Ok(StatusResponse::ready()),
    ]);
    let (mut supervisor, stream) = build_supervisor(Arc::clone(&backend));

    let outcome = supervisor.ensure_running().expect("should succeed");

    assert!(outcome.owns_process);
    assert_eq!(
        backend.query_count(),
        5,
        "one probe plus exactly four polls"
    );
    assert_eq!(
        stream.drain(),
        vec![
            "Loading block index...".to_string(),
            "Verifying blocks...".to_string(),
            "Verifying wallet(s)...".to_string(),
        ]
    );
    assert_eq!(supervisor.state(), SupervisorState::Ready);
}

#[test]
fn missing_progress_message_is_reported_as_placeholder() {
    let backend = RecordingBackend::new(vec![
        unreachable(),
        Ok(StatusResponse {
            code: Some(SupervisorConfig::default().reserved_code),
            message: None,
        }),
        Ok(StatusResponse::ready()),
    ]);
    let (mut supervisor, stream) = build_supervisor(backend);

    supervisor.ensure_running().expect("should succeed");

    assert_eq!(stream.drain(), vec!["???".to_string()]);
}

#[test]
fn polling_terminates_at_first_nonreserved_response() {
    let backend = RecordingBackend::new(vec![
        unreachable(),
        still_starting("warming up"),
        Ok(StatusResponse::ready()),
        still_starting("never polled"),
    ]);
    let (mut supervisor, _stream) = build_supervisor(Arc::clone(&backend));

    supervisor.ensure_running().expect("should succeed");

    assert_eq!(backend.remaining_statuses(), 1, "loop stopped at readiness");
}

// ---------------------------------------------------------------------------
// Shutdown ordering
// ---------------------------------------------------------------------------

#[test]
fn release_sends_stop_then_waits_and_skips_kill_when_exited() {
    let backend = RecordingBackend::new(vec![unreachable(), Ok(StatusResponse::ready())]);
    let (mut supervisor, _stream) = build_supervisor(Arc::clone(&backend));

    let mut outcome = supervisor.ensure_running().expect("should succeed");
    outcome.guard.as_mut().expect("guard present").release();

    assert_eq!(backend.trace(), vec!["start", "stop", "wait"]);
}

#[test]
fn release_kills_forcefully_only_after_bounded_wait_fails() {
    let backend =
        RecordingBackend::stubborn(vec![unreachable(), Ok(StatusResponse::ready())]);
    let (mut supervisor, _stream) = build_supervisor(Arc::clone(&backend));

    let mut outcome = supervisor.ensure_running().expect("should succeed");
    outcome.guard.as_mut().expect("guard present").release();

    assert_eq!(backend.trace(), vec!["start", "stop", "wait", "kill"]);
}

#[test]
fn dropping_the_guard_also_stops_the_daemon() {
    let backend = RecordingBackend::new(vec![unreachable(), Ok(StatusResponse::ready())]);
    let (mut supervisor, _stream) = build_supervisor(Arc::clone(&backend));

    let outcome = supervisor.ensure_running().expect("should succeed");
    drop(outcome);

    assert_eq!(backend.trace(), vec!["start", "stop", "wait"]);
}

#[test]
fn release_runs_at_most_once() {
    let backend = RecordingBackend::new(vec![unreachable(), Ok(StatusResponse::ready())]);
    let (mut supervisor, _stream) = build_supervisor(Arc::clone(&backend));

    let mut outcome = supervisor.ensure_running().expect("should succeed");
    let guard = outcome.guard.as_mut().expect("guard present");
    guard.release();
    assert!(guard.is_released());
    guard.release();
    drop(outcome);

    let stops = backend
        .trace()
        .iter()
        .filter(|event| **event == "stop")
        .count();
    assert_eq!(stops, 1);
}

// ---------------------------------------------------------------------------
// Property: progress mirrors the reserved-code prefix
// ---------------------------------------------------------------------------

proptest! {
    /// For any warmup transcript (a run of reserved-code responses followed
    /// by readiness), every reserved response yields exactly one progress
    /// report with its message (or the placeholder), and the poll count is
    /// the transcript length plus the readiness response.
    #[test]
    fn progress_reports_mirror_warmup_transcript(
        messages in prop::collection::vec(prop::option::of("[a-zA-Z ().]{1,24}"), 0..6)
    ) {
        let reserved = SupervisorConfig::default().reserved_code;
        let mut script = vec![unreachable()];
        for message in &messages {
            script.push(Ok(StatusResponse {
                code: Some(reserved),
                message: message.clone(),
            }));
        }
        script.push(Ok(StatusResponse::ready()));

        let backend = RecordingBackend::new(script);
        let (mut supervisor, stream) = build_supervisor(Arc::clone(&backend));
        let outcome = supervisor.ensure_running().expect("should succeed");

        prop_assert!(outcome.owns_process);
        prop_assert_eq!(
            backend.query_count() as usize,
            messages.len() + 2,
            "probe + one poll per transcript entry + readiness poll"
        );
        let expected: Vec<String> = messages
            .iter()
            .map(|message| message.clone().unwrap_or_else(|| "???".to_string()))
            .collect();
        prop_assert_eq!(stream.drain(), expected);
    }
}
