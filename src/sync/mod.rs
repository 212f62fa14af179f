/// Status-synchronization client for the simulation dashboard.
///
/// Owns the one piece of client-side truth — the last status snapshot
/// fetched from the backend — and mirrors it onto a [`Panel`] (the
/// presentation surface: status line, control gating, mode strip, bounded
/// event log). Every public operation absorbs its own failures: nothing
/// here returns an error to the caller, because a failed request must never
/// take the dashboard down. Failures surface exclusively as log entries,
/// and the next periodic refresh is the de facto retry.
///
/// Gating policy, stated once: the start control is interactive iff the
/// simulation is not running; the stop control, the run-steps control, and
/// every mode-selection control are interactive iff it is running.
pub mod log;
pub mod poll;

use crate::backend::BackendClient;
use crate::config::DashConfig;

pub use log::{EventLog, LogEntry, Severity};

// ---------------------------------------------------------------------------
// Presentation seam
// ---------------------------------------------------------------------------

/// Enabled/disabled flags for the dashboard controls, derived from the run
/// flag and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlStates {
    pub start: bool,
    pub stop: bool,
    pub run_steps: bool,
    /// Applies uniformly to every mode-selection control.
    pub mode_controls: bool,
}

impl ControlStates {
    /// Derive control gating from the last known run state.
    pub fn for_running(running: bool) -> Self {
        Self {
            start: !running,
            stop: running,
            run_steps: running,
            mode_controls: running,
        }
    }
}

/// The presentation surface the sync client writes to.
///
/// Implemented by the terminal renderer; tests use a recording
/// implementation to assert on what the client displayed.
pub trait Panel {
    /// Show the backend's status line and its running/stopped styling.
    fn status(&mut self, text: &str, running: bool);

    /// Apply control gating.
    fn controls(&mut self, states: &ControlStates);

    /// Show the traffic-control mode line.
    fn mode_line(&mut self, text: &str);

    /// Mark the given mode control active (and all others inactive), or
    /// clear the marking entirely when the reported mode is unrecognized.
    fn active_mode(&mut self, mode: Option<&str>);

    /// Repaint the log panel. Entries are newest-first.
    fn log(&mut self, entries: &[LogEntry]);
}

// ---------------------------------------------------------------------------
// Client state
// ---------------------------------------------------------------------------

/// Last status snapshot fetched from the backend.
///
/// `running` is set only by [`SyncClient::refresh_status`] — never inferred
/// from presentation state — and gates the guarded operations.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub running: bool,
    pub status_text: String,
    pub mode: Option<String>,
}

// ---------------------------------------------------------------------------
// Sync client
// ---------------------------------------------------------------------------

/// The status-sync client.
///
/// One instance per dashboard session (`watch`) or per one-shot subcommand.
/// Single-threaded: each operation runs to completion, overwriting state
/// with its own fetch result — values are idempotent snapshots of server
/// state, so last-writer-wins needs no coordination.
pub struct SyncClient<P: Panel> {
    backend: BackendClient,
    panel: P,
    state: DashboardState,
    event_log: EventLog,
    mode_controls: Vec<String>,
}

impl<P: Panel> SyncClient<P> {
    pub fn new(backend: BackendClient, panel: P, config: &DashConfig) -> Self {
        Self {
            backend,
            panel,
            state: DashboardState::default(),
            event_log: EventLog::new(config.log.capacity),
            mode_controls: config.modes.controls.clone(),
        }
    }

    /// Last known run state.
    pub fn running(&self) -> bool {
        self.state.running
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Log entries, newest first.
    pub fn log_entries(&self) -> &[LogEntry] {
        self.event_log.entries()
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    // -- operations ---------------------------------------------------------

    /// Fetch the simulation status and mirror it onto the panel.
    ///
    /// The run flag is derived from the response body containing the word
    /// `"running"`; the backend reports status as an operator-facing
    /// sentence rather than a structured field. On any failure the previous
    /// snapshot stays in place and an error entry is logged.
    pub fn refresh_status(&mut self) {
        match self.backend.status() {
            Ok(body) => {
                let running = body.contains("running");
                self.state.running = running;
                self.state.status_text = body.clone();
                self.panel.status(&body, running);
                self.panel.controls(&ControlStates::for_running(running));
            }
            Err(e) => {
                self.append_log(
                    format!("Failed to fetch simulation status: {e}"),
                    Severity::Error,
                );
            }
        }
    }

    /// Start the simulation, then re-sync status.
    pub fn start(&mut self) {
        self.append_log("Starting simulation...", Severity::Info);
        match self.backend.start() {
            Ok(result) => {
                self.append_log(result, Severity::Success);
                self.refresh_status();
            }
            Err(e) => {
                self.append_log(format!("Failed to start simulation: {e}"), Severity::Error);
            }
        }
    }

    /// Stop the simulation, then re-sync status.
    pub fn stop(&mut self) {
        self.append_log("Stopping simulation...", Severity::Info);
        match self.backend.stop() {
            Ok(result) => {
                self.append_log(result, Severity::Success);
                self.refresh_status();
            }
            Err(e) => {
                self.append_log(format!("Failed to stop simulation: {e}"), Severity::Error);
            }
        }
    }

    /// Advance the simulation by the requested number of steps.
    ///
    /// `input` is the raw operator input. It must parse as an integer ≥ 1;
    /// anything else logs a warning and issues no request.
    pub fn run_steps(&mut self, input: &str) {
        let Some(steps) = parse_steps(input) else {
            self.append_log(
                "Invalid number of steps. Please enter a positive number.",
                Severity::Warning,
            );
            return;
        };

        self.append_log(
            format!("Running simulation for {steps} steps..."),
            Severity::Info,
        );
        match self.backend.run_steps(steps) {
            Ok(result) => {
                self.append_log(result, Severity::Success);
                self.refresh_status();
            }
            Err(e) => {
                self.append_log(
                    format!("Failed to run simulation steps: {e}"),
                    Severity::Error,
                );
            }
        }
    }

    /// Fetch the current traffic-control mode and mirror it onto the panel.
    ///
    /// Exactly the control whose identifier matches the reported mode is
    /// marked active; an unrecognized mode clears the marking.
    pub fn refresh_mode(&mut self) {
        match self.backend.mode() {
            Ok(mode) => {
                self.panel.mode_line(&format!("Traffic Control Mode: {mode}"));
                let known = self.mode_controls.iter().any(|m| *m == mode);
                self.panel.active_mode(known.then_some(mode.as_str()));
                self.state.mode = Some(mode);
            }
            Err(e) => {
                self.append_log(
                    format!("Failed to fetch traffic control mode: {e}"),
                    Severity::Error,
                );
            }
        }
    }

    /// Request a traffic-control mode change.
    ///
    /// Guarded: mode changes are only meaningful while the simulation is
    /// running, so when the last known status is stopped this logs a
    /// warning and issues no request. The backend's verdict is logged with
    /// severity success/error per its `success` flag, then the mode display
    /// is re-synced.
    pub fn set_mode(&mut self, mode: &str) {
        if !self.state.running {
            self.append_log(
                "Cannot change traffic control mode: Simulation is not running",
                Severity::Warning,
            );
            return;
        }

        self.append_log(
            format!("Setting traffic control mode to {mode}..."),
            Severity::Info,
        );
        match self.backend.set_mode(mode) {
            Ok(resp) => {
                let severity = if resp.success {
                    Severity::Success
                } else {
                    Severity::Error
                };
                let message = resp
                    .message
                    .unwrap_or_else(|| "Mode changed successfully".to_string());
                self.append_log(message, severity);
                self.refresh_mode();
            }
            Err(e) => {
                self.append_log(
                    format!("Failed to set traffic control mode: {e}"),
                    Severity::Error,
                );
            }
        }
    }

    /// Append a log entry and repaint the log panel.
    pub fn append_log(&mut self, message: impl Into<String>, severity: Severity) {
        self.event_log.push(message, severity);
        self.panel.log(self.event_log.entries());
    }
}

/// Parse raw step-count input: an integer ≥ 1, or nothing.
fn parse_steps(input: &str) -> Option<u64> {
    match input.trim().parse::<u64>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
