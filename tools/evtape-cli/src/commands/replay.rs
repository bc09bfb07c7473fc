//! The `replay` subcommand.

use std::path::Path;

use anyhow::{Context, Result};

use evtape_common::cancel::CancelFlag;
use evtape_common::config::AppConfig;
use evtape_device::TargetSet;
use evtape_model::log::{required_targets, LogReader};
use evtape_replay::ReplayEngine;

pub fn run(config: &AppConfig, log_path: &Path, no_homing: bool) -> Result<()> {
    CancelFlag::install_sigint_handler().context("Failed to install SIGINT handler")?;
    let cancel = CancelFlag::new();

    // One pre-scan sizes the target set before any device is created.
    let targets_needed = required_targets(log_path)
        .with_context(|| format!("Failed to scan log {}", log_path.display()))?;
    if targets_needed == 0 {
        println!("Log {} holds no events; nothing to replay.", log_path.display());
        return Ok(());
    }

    let mut targets = TargetSet::create(targets_needed, &config.device.name)
        .context("Failed to create replay targets")?;
    let mut reader = LogReader::open(log_path)
        .with_context(|| format!("Failed to open log {}", log_path.display()))?;

    println!(
        "Replaying {} through {} synthetic devices. Press Ctrl+C to stop.",
        log_path.display(),
        targets_needed
    );

    let summary = ReplayEngine::new(cancel).run(&mut reader, &mut targets)?;

    if !no_homing && !summary.cancelled {
        targets.home_cursor(config.device.homing_repeats)?;
    }
    targets.release();

    if summary.cancelled {
        println!("Replay cancelled after {} events.", summary.dispatched);
    } else {
        println!("Replayed {} events.", summary.dispatched);
    }
    Ok(())
}
