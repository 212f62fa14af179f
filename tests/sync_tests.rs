//! Status-sync client tests against a scriptable mock backend.
//!
//! Each test spins up a `tiny_http` server on an ephemeral port that plays
//! the simulation backend, with per-endpoint hit counters so the tests can
//! assert not just what was displayed but which requests were (or were not)
//! issued. A recording panel stands in for the terminal renderer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use tiny_http::{Header, Method, Response, Server, StatusCode};

use simdash::backend::BackendClient;
use simdash::config::DashConfig;
use simdash::sync::{ControlStates, LogEntry, Panel, Severity, SyncClient};

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

/// Scriptable responses and request counters.
struct MockState {
    /// Body for `GET /api/simulation/status`.
    status_body: String,
    /// When set, the status endpoint answers 500 instead.
    fail_status: bool,
    /// Body for `GET /api/traffic-control/mode`.
    mode_body: String,
    /// JSON body for `POST /api/traffic-control/mode/{mode}`.
    set_mode_body: String,
    /// Requests seen, keyed by `"METHOD path"`.
    hits: HashMap<String, usize>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            status_body: "Simulation stopped".to_string(),
            fail_status: false,
            mode_body: "NORMAL_MODE".to_string(),
            set_mode_body: r#"{"success":true}"#.to_string(),
            hits: HashMap::new(),
        }
    }
}

struct MockBackend {
    server: Arc<Server>,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let state = Arc::new(Mutex::new(MockState::default()));

        let srv = Arc::clone(&server);
        let st = Arc::clone(&state);
        thread::spawn(move || {
            for request in srv.incoming_requests() {
                let method = request.method().clone();
                let path = request
                    .url()
                    .split('?')
                    .next()
                    .unwrap_or_default()
                    .to_string();

                let mut state = st.lock().unwrap();
                *state.hits.entry(format!("{method} {path}")).or_insert(0) += 1;
                let (code, body, json) = dispatch(&mut state, &method, &path);
                drop(state);

                let mut resp = Response::from_string(body).with_status_code(StatusCode(code));
                if json {
                    resp.add_header(
                        Header::from_bytes("Content-Type", "application/json").unwrap(),
                    );
                }
                let _ = request.respond(resp);
            }
        });

        Self { server, state }
    }

    fn url(&self) -> String {
        let addr = self.server.server_addr().to_ip().unwrap();
        format!("http://{addr}")
    }

    fn set_status_body(&self, body: &str) {
        self.state.lock().unwrap().status_body = body.to_string();
    }

    fn set_fail_status(&self, fail: bool) {
        self.state.lock().unwrap().fail_status = fail;
    }

    fn set_mode_body(&self, body: &str) {
        self.state.lock().unwrap().mode_body = body.to_string();
    }

    fn set_mode_change_response(&self, body: &str) {
        self.state.lock().unwrap().set_mode_body = body.to_string();
    }

    /// Total requests whose `"METHOD path"` key starts with `prefix`.
    fn hits_with_prefix(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .hits
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(_, n)| n)
            .sum()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
    }
}

/// Route a request to the scripted response: `(status, body, is_json)`.
fn dispatch(state: &mut MockState, method: &Method, path: &str) -> (u16, String, bool) {
    match (method, path) {
        (&Method::Get, "/api/simulation/status") => {
            if state.fail_status {
                (500, "simulation backend unavailable".to_string(), false)
            } else {
                (200, state.status_body.clone(), false)
            }
        }
        (&Method::Post, "/api/simulation/start") => {
            state.status_body = "Simulation is running".to_string();
            (200, "Simulation started successfully".to_string(), false)
        }
        (&Method::Post, "/api/simulation/stop") => {
            state.status_body = "Simulation stopped".to_string();
            (200, "Simulation stopped successfully".to_string(), false)
        }
        (&Method::Post, path) if path.starts_with("/api/simulation/run/") => {
            let steps = path.rsplit('/').next().unwrap_or_default();
            (200, format!("Simulation ran for {steps} steps"), false)
        }
        (&Method::Get, "/api/traffic-control/mode") => (200, state.mode_body.clone(), false),
        (&Method::Post, path) if path.starts_with("/api/traffic-control/mode/") => {
            (200, state.set_mode_body.clone(), true)
        }
        _ => (404, "not found".to_string(), false),
    }
}

// ---------------------------------------------------------------------------
// Recording panel
// ---------------------------------------------------------------------------

/// Captures everything the sync client displays.
#[derive(Default)]
struct RecordingPanel {
    status: Option<(String, bool)>,
    controls: Option<ControlStates>,
    mode_line: Option<String>,
    /// `None` until `active_mode` is first called; then the marking itself.
    active: Option<Option<String>>,
    log_paints: usize,
}

impl Panel for RecordingPanel {
    fn status(&mut self, text: &str, running: bool) {
        self.status = Some((text.to_string(), running));
    }

    fn controls(&mut self, states: &ControlStates) {
        self.controls = Some(*states);
    }

    fn mode_line(&mut self, text: &str) {
        self.mode_line = Some(text.to_string());
    }

    fn active_mode(&mut self, mode: Option<&str>) {
        self.active = Some(mode.map(str::to_string));
    }

    fn log(&mut self, _entries: &[LogEntry]) {
        self.log_paints += 1;
    }
}

fn client_for(mock: &MockBackend) -> SyncClient<RecordingPanel> {
    let mut cfg = DashConfig::default();
    cfg.backend.base_url = mock.url();
    cfg.backend.timeout_ms = 2_000;
    SyncClient::new(
        BackendClient::from_config(&cfg.backend),
        RecordingPanel::default(),
        &cfg,
    )
}

fn latest(client: &SyncClient<RecordingPanel>) -> &LogEntry {
    client.log_entries().first().expect("log is empty")
}

// ---------------------------------------------------------------------------
// Status gating
// ---------------------------------------------------------------------------

#[test]
fn running_status_gates_controls_for_running() {
    let mock = MockBackend::start();
    mock.set_status_body("Simulation is running");
    let mut client = client_for(&mock);

    client.refresh_status();

    assert!(client.running());
    let (text, running) = client.panel().status.clone().unwrap();
    assert_eq!(text, "Simulation is running");
    assert!(running);
    assert_eq!(
        client.panel().controls.unwrap(),
        ControlStates::for_running(true)
    );
}

#[test]
fn stopped_status_enables_only_start() {
    let mock = MockBackend::start();
    let mut client = client_for(&mock);

    client.refresh_status();

    assert!(!client.running());
    let states = client.panel().controls.unwrap();
    assert!(states.start);
    assert!(!states.stop);
    assert!(!states.run_steps);
    assert!(!states.mode_controls);
}

#[test]
fn status_failure_leaves_state_unchanged_and_logs_error() {
    let mock = MockBackend::start();
    mock.set_status_body("Simulation is running");
    let mut client = client_for(&mock);

    client.refresh_status();
    assert!(client.running());

    mock.set_fail_status(true);
    client.refresh_status();

    // Last successful snapshot survives the failed poll.
    assert!(client.running());
    assert_eq!(client.state().status_text, "Simulation is running");
    let entry = latest(&client);
    assert_eq!(entry.severity, Severity::Error);
    assert!(entry.message.starts_with("Failed to fetch simulation status"));
}

// ---------------------------------------------------------------------------
// Log bound
// ---------------------------------------------------------------------------

#[test]
fn log_is_capped_at_100_newest_first() {
    let mock = MockBackend::start();
    let mut client = client_for(&mock);

    for i in 0..130 {
        client.append_log(format!("entry {i}"), Severity::Info);
    }

    assert_eq!(client.log_entries().len(), 100);
    assert_eq!(client.log_entries()[0].message, "entry 129");
    assert_eq!(client.log_entries()[99].message, "entry 30");
    assert_eq!(client.panel().log_paints, 130);
}

// ---------------------------------------------------------------------------
// Run steps
// ---------------------------------------------------------------------------

#[test]
fn invalid_steps_issue_no_request() {
    let mock = MockBackend::start();
    let mut client = client_for(&mock);

    for input in ["abc", "0", "-5", "1.5", ""] {
        client.run_steps(input);
        let entry = latest(&client);
        assert_eq!(entry.severity, Severity::Warning);
        assert!(entry.message.contains("Invalid number of steps"));
    }

    assert_eq!(mock.hits_with_prefix("POST /api/simulation/run"), 0);
    assert_eq!(client.log_entries().len(), 5);
}

#[test]
fn valid_steps_post_and_refresh_status() {
    let mock = MockBackend::start();
    mock.set_status_body("Simulation is running");
    let mut client = client_for(&mock);

    client.run_steps("25");

    assert_eq!(mock.hits_with_prefix("POST /api/simulation/run/25"), 1);
    assert_eq!(mock.hits_with_prefix("GET /api/simulation/status"), 1);
    let entry = latest(&client);
    assert_eq!(entry.severity, Severity::Success);
    assert_eq!(entry.message, "Simulation ran for 25 steps");
}

// ---------------------------------------------------------------------------
// Start / stop
// ---------------------------------------------------------------------------

#[test]
fn start_logs_result_and_resyncs_status() {
    let mock = MockBackend::start();
    let mut client = client_for(&mock);

    assert!(!client.running());
    client.start();

    assert_eq!(mock.hits_with_prefix("POST /api/simulation/start"), 1);
    let entry = latest(&client);
    assert_eq!(entry.severity, Severity::Success);
    assert_eq!(entry.message, "Simulation started successfully");
    // The follow-up status fetch saw the mock's new state.
    assert!(client.running());
}

#[test]
fn stop_logs_result_and_resyncs_status() {
    let mock = MockBackend::start();
    mock.set_status_body("Simulation is running");
    let mut client = client_for(&mock);
    client.refresh_status();

    client.stop();

    assert_eq!(mock.hits_with_prefix("POST /api/simulation/stop"), 1);
    assert_eq!(latest(&client).message, "Simulation stopped successfully");
    assert!(!client.running());
}

// ---------------------------------------------------------------------------
// Mode display
// ---------------------------------------------------------------------------

#[test]
fn mode_refresh_marks_exactly_the_matching_control() {
    let mock = MockBackend::start();
    mock.set_mode_body("\"ADAPTIVE_MODE\"");
    let mut client = client_for(&mock);

    client.refresh_mode();

    assert_eq!(
        client.panel().mode_line.as_deref(),
        Some("Traffic Control Mode: ADAPTIVE_MODE")
    );
    assert_eq!(
        client.panel().active,
        Some(Some("ADAPTIVE_MODE".to_string()))
    );
    assert_eq!(client.state().mode.as_deref(), Some("ADAPTIVE_MODE"));
}

#[test]
fn unrecognized_mode_clears_the_active_marking() {
    let mock = MockBackend::start();
    mock.set_mode_body("EXPERIMENTAL_MODE");
    let mut client = client_for(&mock);

    client.refresh_mode();

    assert_eq!(client.panel().active, Some(None));
}

// ---------------------------------------------------------------------------
// Mode change
// ---------------------------------------------------------------------------

#[test]
fn mode_change_while_stopped_issues_no_request() {
    let mock = MockBackend::start();
    let mut client = client_for(&mock);
    client.refresh_status();

    client.set_mode("ADAPTIVE_MODE");

    assert_eq!(mock.hits_with_prefix("POST /api/traffic-control/mode"), 0);
    let entry = latest(&client);
    assert_eq!(entry.severity, Severity::Warning);
    assert!(entry.message.contains("Simulation is not running"));
    assert_eq!(client.log_entries().len(), 1);
}

#[test]
fn mode_change_rejection_logs_backend_message_as_error() {
    let mock = MockBackend::start();
    mock.set_status_body("Simulation is running");
    mock.set_mode_change_response(r#"{"success":false,"message":"busy"}"#);
    let mut client = client_for(&mock);
    client.refresh_status();

    client.set_mode("RED_MODE");

    assert_eq!(
        mock.hits_with_prefix("POST /api/traffic-control/mode/RED_MODE"),
        1
    );
    let entry = latest(&client);
    assert_eq!(entry.severity, Severity::Error);
    assert_eq!(entry.message, "busy");
}

#[test]
fn mode_change_success_uses_default_message_and_refreshes_display() {
    let mock = MockBackend::start();
    mock.set_status_body("Simulation is running");
    mock.set_mode_body("RED_MODE");
    let mut client = client_for(&mock);
    client.refresh_status();

    client.set_mode("RED_MODE");

    let entry = latest(&client);
    assert_eq!(entry.severity, Severity::Success);
    assert_eq!(entry.message, "Mode changed successfully");
    // The follow-up mode fetch re-marked the active control.
    assert_eq!(mock.hits_with_prefix("GET /api/traffic-control/mode"), 1);
    assert_eq!(client.panel().active, Some(Some("RED_MODE".to_string())));
}

#[test]
fn mode_change_transport_failure_logs_error() {
    let mock = MockBackend::start();
    mock.set_status_body("Simulation is running");
    let mut client = client_for(&mock);
    client.refresh_status();
    // Backend gone between the status poll and the mode change.
    drop(mock);
    client.set_mode("RED_MODE");

    let entry = latest(&client);
    assert_eq!(entry.severity, Severity::Error);
    assert!(entry
        .message
        .starts_with("Failed to set traffic control mode"));
}
