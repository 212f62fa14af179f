/// HTTP client for the traffic-simulation backend.
///
/// Talks to the backend's REST surface under `{base_url}/api` using the
/// synchronous `ureq` client:
///
/// - **Simulation lifecycle**: status / start / stop / run-for-N-steps,
///   all plain-text bodies.
/// - **Traffic control**: read the current mode, switch to a new mode
///   (JSON response).
///
/// `ureq` treats any non-2xx status as `Err`, so HTTP-level failures and
/// transport failures surface uniformly as `anyhow` errors. The sync client
/// sitting above this module decides how failures are presented; nothing
/// here retries.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::schema::BackendConfig;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Response body from `POST /api/traffic-control/mode/{mode}`.
///
/// The backend also sends `currentMode` and `timestamp`, which the dashboard
/// does not use — the subsequent mode refresh re-reads the authoritative
/// mode instead.
#[derive(Debug, Clone, Deserialize)]
pub struct ModeChangeResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous client for the backend REST endpoints.
///
/// Built once per dashboard session from [`BackendConfig`]; holds no
/// connection state beyond the base URL and request timeout.
#[derive(Debug)]
pub struct BackendClient {
    base_url: String,
    timeout: Duration,
}

impl BackendClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// `GET /api/simulation/status` — plain-text status line.
    ///
    /// The body is an operator-facing sentence; the caller derives the
    /// run flag from it rather than from a structured field.
    pub fn status(&self) -> Result<String> {
        let resp = ureq::get(&self.url("/simulation/status"))
            .timeout(self.timeout)
            .call()
            .context("simulation status request failed")?;
        resp.into_string()
            .context("failed to read simulation status response")
    }

    /// `POST /api/simulation/start` — returns the backend's result message.
    pub fn start(&self) -> Result<String> {
        let resp = ureq::post(&self.url("/simulation/start"))
            .timeout(self.timeout)
            .call()
            .context("simulation start request failed")?;
        resp.into_string()
            .context("failed to read simulation start response")
    }

    /// `POST /api/simulation/stop` — returns the backend's result message.
    pub fn stop(&self) -> Result<String> {
        let resp = ureq::post(&self.url("/simulation/stop"))
            .timeout(self.timeout)
            .call()
            .context("simulation stop request failed")?;
        resp.into_string()
            .context("failed to read simulation stop response")
    }

    /// `POST /api/simulation/run/{steps}` — advance the simulation.
    ///
    /// `steps` has already been validated by the caller; the backend
    /// additionally rejects non-positive values with a 400.
    pub fn run_steps(&self, steps: u64) -> Result<String> {
        let resp = ureq::post(&self.url(&format!("/simulation/run/{steps}")))
            .timeout(self.timeout)
            .call()
            .context("simulation run request failed")?;
        resp.into_string()
            .context("failed to read simulation run response")
    }

    /// `GET /api/traffic-control/mode` — current mode identifier.
    ///
    /// Some backend serializers quote the bare enum name, so surrounding
    /// double quotes are stripped before the value is returned.
    pub fn mode(&self) -> Result<String> {
        let resp = ureq::get(&self.url("/traffic-control/mode"))
            .timeout(self.timeout)
            .call()
            .context("traffic control mode request failed")?;
        let body = resp
            .into_string()
            .context("failed to read traffic control mode response")?;
        Ok(strip_quotes(&body))
    }

    /// `POST /api/traffic-control/mode/{mode}` — request a mode change.
    ///
    /// Sent with a JSON content type; the mode identifier is not validated
    /// client-side — the server is the source of truth for the mode set and
    /// answers `{ success: false, message }` for anything it rejects.
    pub fn set_mode(&self, mode: &str) -> Result<ModeChangeResponse> {
        let resp = ureq::post(&self.url(&format!("/traffic-control/mode/{mode}")))
            .timeout(self.timeout)
            .set("Content-Type", "application/json")
            .call()
            .context("traffic control mode change request failed")?;
        resp.into_json()
            .context("failed to parse traffic control mode change response")
    }
}

/// Strip surrounding double quotes from a trimmed response body.
fn strip_quotes(s: &str) -> String {
    s.trim().trim_matches('"').to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_strips_trailing_slash() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..BackendConfig::default()
        };
        let client = BackendClient::from_config(&config);
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
        assert_eq!(
            client.url("/simulation/status"),
            "http://127.0.0.1:8080/api/simulation/status"
        );
    }

    #[test]
    fn client_from_default_config() {
        let client = BackendClient::from_config(&BackendConfig::default());
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
        assert_eq!(client.timeout, Duration::from_millis(10_000));
    }

    #[test]
    fn strip_quotes_handles_variants() {
        assert_eq!(strip_quotes("NORMAL_MODE"), "NORMAL_MODE");
        assert_eq!(strip_quotes("\"ADAPTIVE_MODE\""), "ADAPTIVE_MODE");
        assert_eq!(strip_quotes("  \"RED_MODE\"\n"), "RED_MODE");
        assert_eq!(strip_quotes(""), "");
    }

    #[test]
    fn mode_change_response_defaults_missing_message() {
        let resp: ModeChangeResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(resp.success);
        assert!(resp.message.is_none());

        let resp: ModeChangeResponse = serde_json::from_str(
            r#"{"success":false,"message":"busy","currentMode":null,"timestamp":"2024-01-01T00:00:00"}"#,
        )
        .unwrap();
        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("busy"));
    }
}
