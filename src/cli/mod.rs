//! CLI command implementations for simdash.
//!
//! Provides subcommand handlers for:
//! - `simdash watch` — live dashboard with periodic refresh
//! - `simdash status|start|stop|run N` — one-shot simulation operations
//! - `simdash mode [MODE]` — show or switch the traffic-control mode
//! - `simdash health` — check backend reachability and config
//! - `simdash config show|init|set|reset` — configuration management

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use crate::backend::BackendClient;
use crate::config;
use crate::sync::poll::Poller;
use crate::sync::{Severity, SyncClient};
use crate::ui::TerminalPanel;

/// Build a one-shot sync client that prints updates as they happen.
fn streaming_client() -> SyncClient<TerminalPanel> {
    let cfg = config::load();
    let backend = BackendClient::from_config(&cfg.backend);
    let panel = TerminalPanel::streaming(cfg.modes.controls.clone());
    SyncClient::new(backend, panel, &cfg)
}

// ---------------------------------------------------------------------------
// simdash watch
// ---------------------------------------------------------------------------

/// Run the live dashboard until the process is interrupted.
///
/// One deterministic startup: initial status and mode refresh plus an
/// "initialized" log entry, then the poller takes over. Each tick refreshes
/// status, and refreshes the mode display only while the simulation is
/// running.
pub fn run_watch(interval_override: Option<u64>) -> Result<()> {
    let cfg = config::load();
    let backend = BackendClient::from_config(&cfg.backend);
    let panel = TerminalPanel::repainting(cfg.modes.controls.clone());
    let mut client = SyncClient::new(backend, panel, &cfg);

    client.refresh_status();
    client.refresh_mode();
    client.append_log("Dashboard initialized — Ctrl+C to quit", Severity::Info);

    let secs = interval_override.unwrap_or(cfg.poll.interval_secs).max(1);
    let handle = Poller::spawn(Duration::from_secs(secs), move || {
        client.refresh_status();
        if client.running() {
            client.refresh_mode();
        }
    });

    // The poller thread owns the client; nothing left to do here.
    handle.run_forever();
    Ok(())
}

// ---------------------------------------------------------------------------
// One-shot simulation operations
// ---------------------------------------------------------------------------

/// Fetch and display the simulation status once.
pub fn run_status() -> Result<()> {
    streaming_client().refresh_status();
    Ok(())
}

/// Start the simulation and show the backend's verdict.
pub fn run_start() -> Result<()> {
    streaming_client().start();
    Ok(())
}

/// Stop the simulation and show the backend's verdict.
pub fn run_stop() -> Result<()> {
    streaming_client().stop();
    Ok(())
}

/// Advance the simulation by the given (raw) step count.
pub fn run_steps(steps: &str) -> Result<()> {
    streaming_client().run_steps(steps);
    Ok(())
}

/// Show the current traffic-control mode, or switch to `mode`.
///
/// Switching first re-syncs status, because mode changes are gated on the
/// simulation actually running.
pub fn run_mode(mode: Option<&str>) -> Result<()> {
    let mut client = streaming_client();
    match mode {
        None => client.refresh_mode(),
        Some(mode) => {
            client.refresh_status();
            client.set_mode(mode);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// simdash health
// ---------------------------------------------------------------------------

/// Check backend reachability and configuration.
pub fn run_health() -> Result<()> {
    println!("{}", "simdash Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.simdash/config.toml found"
        } else {
            "not found (run `simdash config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".simdash.toml found"
        } else {
            "none (optional)"
        },
    );

    let cfg = config::load();
    print_health_item("Backend URL", true, &cfg.backend.base_url);

    let backend = BackendClient::from_config(&cfg.backend);
    match backend.status() {
        Ok(status) => {
            print_health_item("Backend", true, &format!("reachable — {status}"));
            match backend.mode() {
                Ok(mode) => print_health_item("Traffic control", true, &mode),
                Err(e) => print_health_item("Traffic control", false, &e.to_string()),
            }
        }
        Err(_) => {
            print_health_item("Backend", false, "not reachable — is the backend running?");
        }
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// simdash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective simdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.simdash/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.simdash/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".simdash.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".simdash.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "SIMDASH_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.simdash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
