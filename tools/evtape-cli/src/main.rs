//! evtape: record and replay Linux input events.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use evtape_common::config::AppConfig;
use evtape_common::logging::init_logging;

#[derive(Parser)]
#[command(name = "evtape")]
#[command(author, version, about = "Record and replay Linux input events")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record input events from every device node into a log file
    Record {
        /// Directory of input device nodes to capture from
        #[arg(long, default_value = "/dev/input")]
        devices: PathBuf,

        /// Log file to write
        #[arg(short, long, default_value = "/tmp/events.bin")]
        output: PathBuf,

        /// Skip homing the cursor before capture starts
        #[arg(long)]
        no_homing: bool,
    },

    /// Replay a recorded log through synthetic input devices
    Replay {
        /// Log file to replay
        log: PathBuf,

        /// Skip homing the cursor after replay finishes
        #[arg(long)]
        no_homing: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_logging(&config.logging);

    match cli.command {
        Commands::Record {
            devices,
            output,
            no_homing,
        } => commands::record::run(&config, &devices, &output, no_homing),
        Commands::Replay { log, no_homing } => commands::replay::run(&config, &log, no_homing),
    }
}
