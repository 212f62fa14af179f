/// Configuration schema and defaults for the simdash client.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[backend]`, `[poll]`, `[log]`, and `[modes]`. Every field has a built-in
/// default; users only set the values they want to override.
use serde::{Deserialize, Serialize};

/// Default backend base URL (the backend serves its API under `/api`).
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Default HTTP request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default status poll period in seconds.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default log panel capacity (entries).
const DEFAULT_LOG_CAPACITY: usize = 100;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level simdash configuration.
///
/// Maps directly to the `~/.simdash/config.toml` and `.simdash.toml` file
/// schemas. All sections and fields are optional — missing values fall back
/// to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub backend: BackendConfig,
    pub poll: PollConfig,
    pub log: LogConfig,
    pub modes: ModesConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Where the simulation backend lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend; requests go to `{base_url}/api/...`.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// [poll]
// ---------------------------------------------------------------------------

/// Periodic refresh settings for `simdash watch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between status refreshes.
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// [log]
// ---------------------------------------------------------------------------

/// Log panel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum number of entries retained in the log panel.
    pub capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

// ---------------------------------------------------------------------------
// [modes]
// ---------------------------------------------------------------------------

/// Mode-selection controls rendered on the dashboard.
///
/// Purely presentational: each identifier becomes one selectable control,
/// and the control matching the server-reported mode is marked active. The
/// server remains the source of truth for which modes actually exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModesConfig {
    pub controls: Vec<String>,
}

impl Default for ModesConfig {
    fn default() -> Self {
        Self {
            controls: [
                "RED_MODE",
                "YELLOW_MODE",
                "NORMAL_MODE",
                "NEXT_PHASE_MODE",
                "LIGHTS_OFF_MODE",
                "ADAPTIVE_MODE",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default config
// ---------------------------------------------------------------------------

impl DashConfig {
    /// The annotated default config written by `simdash config init`.
    pub fn default_toml() -> &'static str {
        r#"# simdash configuration
# Layering: built-in defaults -> ~/.simdash/config.toml -> .simdash.toml
# -> SIMDASH_* environment variables (highest precedence).

[backend]
# Base URL of the simulation backend. The REST API lives under /api.
base_url = "http://127.0.0.1:8080"
# Per-request timeout in milliseconds.
timeout_ms = 10000

[poll]
# Seconds between status refreshes in `simdash watch`.
interval_secs = 5

[log]
# Maximum number of entries kept in the dashboard log panel.
capacity = 100

[modes]
# Mode-selection controls shown on the dashboard, in display order.
# The backend decides which modes are actually valid.
controls = [
    "RED_MODE",
    "YELLOW_MODE",
    "NORMAL_MODE",
    "NEXT_PHASE_MODE",
    "LIGHTS_OFF_MODE",
    "ADAPTIVE_MODE",
]
"#
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
