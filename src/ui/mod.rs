/// Terminal rendering for the dashboard.
///
/// [`TerminalPanel`] is the production [`Panel`] implementation. It runs in
/// one of two styles:
///
/// - **Streaming** — for one-shot subcommands (`status`, `start`, ...):
///   every update prints a line and scrolls away.
/// - **Repainting** — for `simdash watch`: updates are cached and the whole
///   dashboard (status, controls, mode strip, log) is redrawn in place on
///   each change.
use colored::Colorize;

use crate::sync::{ControlStates, LogEntry, Panel, Severity};

/// Log rows shown in the repainting dashboard (the full bounded log is
/// retained by the client; the screen just shows the newest slice).
const REPAINT_LOG_ROWS: usize = 12;

// ---------------------------------------------------------------------------
// Terminal panel
// ---------------------------------------------------------------------------

enum Style {
    Streaming,
    Repaint,
}

/// Renders the dashboard to stdout with `colored`.
pub struct TerminalPanel {
    style: Style,
    /// Mode controls in display order, for the mode strip.
    mode_controls: Vec<String>,
    status: Option<(String, bool)>,
    controls: Option<ControlStates>,
    mode_line: Option<String>,
    active: Option<String>,
    entries: Vec<LogEntry>,
}

impl TerminalPanel {
    /// Panel for one-shot subcommands: print updates as they happen.
    pub fn streaming(mode_controls: Vec<String>) -> Self {
        Self::new(Style::Streaming, mode_controls)
    }

    /// Panel for `watch`: cache updates and redraw the full dashboard.
    pub fn repainting(mode_controls: Vec<String>) -> Self {
        Self::new(Style::Repaint, mode_controls)
    }

    fn new(style: Style, mode_controls: Vec<String>) -> Self {
        Self {
            style,
            mode_controls,
            status: None,
            controls: None,
            mode_line: None,
            active: None,
            entries: Vec::new(),
        }
    }

    // -- rendering ----------------------------------------------------------

    /// Redraw the whole dashboard in place.
    fn repaint(&self) {
        // Clear screen, cursor home.
        print!("\x1b[2J\x1b[H");

        println!("{}", "simdash — Simulation Dashboard".bold().cyan());
        println!("{}", "=".repeat(50));

        if let Some((text, running)) = &self.status {
            let styled = if *running {
                text.green().bold()
            } else {
                text.red().bold()
            };
            println!("  {} {}", "Status:".bold(), styled);
        } else {
            println!("  {} {}", "Status:".bold(), "(not fetched yet)".dimmed());
        }

        if let Some(states) = &self.controls {
            println!(
                "  {} {}  {}  {}",
                "Controls:".bold(),
                control_label("start", states.start),
                control_label("stop", states.stop),
                control_label("run-steps", states.run_steps),
            );
        }

        if let Some(line) = &self.mode_line {
            println!("  {} {}", "Mode:".bold(), line);
        }
        println!("  {} {}", "Select:".bold(), self.mode_strip());

        println!();
        println!("{}", "Log".bold().cyan());
        println!("{}", "-".repeat(50));
        for entry in self.entries.iter().take(REPAINT_LOG_ROWS) {
            println!("  {}", format_entry(entry));
        }
    }

    /// The mode-selection strip: every control tagged, the active one
    /// highlighted.
    fn mode_strip(&self) -> String {
        let enabled = self.strip_enabled();
        self.mode_controls
            .iter()
            .map(|m| {
                let active = self.active.as_deref() == Some(m.as_str());
                if active {
                    format!("[{}]", m.green().bold())
                } else if enabled {
                    format!("[{m}]")
                } else {
                    format!("[{}]", m.dimmed())
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the strip renders mode controls as interactive.
    ///
    /// Until a status fetch has produced control gating, the strip carries
    /// no gating information and renders plain — `simdash mode` shows the
    /// current mode without a status round-trip, and dimming every control
    /// there would misreport a stopped simulation.
    fn strip_enabled(&self) -> bool {
        self.controls.map(|c| c.mode_controls).unwrap_or(true)
    }
}

impl Panel for TerminalPanel {
    fn status(&mut self, text: &str, running: bool) {
        self.status = Some((text.to_string(), running));
        match self.style {
            Style::Repaint => self.repaint(),
            Style::Streaming => {
                let styled = if running {
                    text.green().bold()
                } else {
                    text.red().bold()
                };
                println!("{} {}", "Status:".bold(), styled);
            }
        }
    }

    fn controls(&mut self, states: &ControlStates) {
        self.controls = Some(*states);
        match self.style {
            Style::Repaint => self.repaint(),
            Style::Streaming => {
                println!(
                    "{} {}  {}  {}  {}",
                    "Controls:".bold(),
                    control_label("start", states.start),
                    control_label("stop", states.stop),
                    control_label("run-steps", states.run_steps),
                    control_label("modes", states.mode_controls),
                );
            }
        }
    }

    fn mode_line(&mut self, text: &str) {
        self.mode_line = Some(text.to_string());
        match self.style {
            Style::Repaint => self.repaint(),
            Style::Streaming => println!("{}", text),
        }
    }

    fn active_mode(&mut self, mode: Option<&str>) {
        self.active = mode.map(str::to_string);
        match self.style {
            Style::Repaint => self.repaint(),
            Style::Streaming => println!("{} {}", "Modes:".bold(), self.mode_strip()),
        }
    }

    fn log(&mut self, entries: &[LogEntry]) {
        self.entries = entries.to_vec();
        match self.style {
            Style::Repaint => self.repaint(),
            // Streaming: the newest entry is the one this repaint is about.
            Style::Streaming => {
                if let Some(entry) = entries.first() {
                    println!("{}", format_entry(entry));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// A control tag, dimmed when disabled.
fn control_label(name: &str, enabled: bool) -> String {
    if enabled {
        format!("[{name}]")
    } else {
        format!("[{}]", name.dimmed())
    }
}

/// One log line: dimmed timestamp plus severity-colored message.
fn format_entry(entry: &LogEntry) -> String {
    let message = match entry.severity {
        Severity::Info => entry.message.normal(),
        Severity::Success => entry.message.green(),
        Severity::Warning => entry.message.yellow(),
        Severity::Error => entry.message.red(),
    };
    format!("{} {}", format!("[{}]", entry.timestamp).dimmed(), message)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
