use anyhow::Result;
use clap::{Parser, Subcommand};

use simdash::cli;

#[derive(Debug, Parser)]
#[command(name = "simdash")]
#[command(about = "Terminal status dashboard for a traffic-simulation backend")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Live dashboard — poll status and mode until interrupted
    Watch {
        /// Override the poll interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Fetch the simulation status once
    Status,
    /// Start the simulation
    Start,
    /// Stop the simulation
    Stop,
    /// Run the simulation for a number of steps
    Run {
        /// Number of steps (positive integer)
        steps: String,
    },
    /// Show the current traffic-control mode, or switch to MODE
    Mode {
        /// Mode identifier to switch to (omit to show the current mode)
        mode: Option<String>,
    },
    /// Check backend reachability and configuration
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective merged configuration
    Show,
    /// Write the annotated default config to ~/.simdash/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a single config value (dotted key, e.g. backend.base_url)
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Watch { interval } => cli::run_watch(interval),
        Commands::Status => cli::run_status(),
        Commands::Start => cli::run_start(),
        Commands::Stop => cli::run_stop(),
        Commands::Run { steps } => cli::run_steps(&steps),
        Commands::Mode { mode } => cli::run_mode(mode.as_deref()),
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigCommands::Show => cli::run_config_show(),
            ConfigCommands::Init { force } => cli::run_config_init(force),
            ConfigCommands::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigCommands::Reset => cli::run_config_reset(),
        },
    }
}
