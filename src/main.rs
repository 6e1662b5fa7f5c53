// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use viewfinder_hud::HudConfig;

mod cli;

#[derive(Parser)]
#[command(name = "viewfinder-hud")]
#[command(about = "Camera viewfinder settings overlay")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Preference group JSON (default: built-in camera settings)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// HUD config JSON (default: ~/.config/viewfinder-hud/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive overlay in the terminal (default)
    Terminal,

    /// Print the laid-out overlay as JSON
    Layout {
        /// Overlay width in pixels
        #[arg(long, default_value = "800")]
        width: i32,

        /// Overlay height in pixels
        #[arg(long, default_value = "480")]
        height: i32,

        /// Tap the indicator at this position before printing
        #[arg(short, long)]
        select: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=viewfinder_hud=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let preferences = cli::load_preferences(cli.prefs.as_deref())?;

    match cli.command {
        Some(Commands::Layout {
            width,
            height,
            select,
        }) => {
            let config = cli::load_config(cli.config.as_deref(), HudConfig::default)?;
            cli::print_layout(config, &preferences, width, height, select)
        }
        Some(Commands::Terminal) | None => {
            let config =
                cli::load_config(cli.config.as_deref(), viewfinder_hud::terminal::terminal_config)?;
            viewfinder_hud::terminal::run(config, preferences)
        }
    }
}
