//! The `record` subcommand.

use std::path::Path;

use anyhow::{bail, Context, Result};

use evtape_capture::CaptureEngine;
use evtape_common::cancel::CancelFlag;
use evtape_common::config::AppConfig;
use evtape_device::{enumerate_sources, SourceSet, VirtualInput};
use evtape_model::log::LogWriter;

pub fn run(config: &AppConfig, devices: &Path, output: &Path, no_homing: bool) -> Result<()> {
    CancelFlag::install_sigint_handler().context("Failed to install SIGINT handler")?;
    let cancel = CancelFlag::new();

    let sources = enumerate_sources(devices)
        .with_context(|| format!("Failed to enumerate devices under {}", devices.display()))?;
    if sources.is_empty() {
        bail!("No input devices found under {}", devices.display());
    }
    tracing::info!(devices = sources.len(), dir = %devices.display(), "Devices registered");

    // Park the pointer in a known corner so the log replays from a
    // predictable cursor position.
    if !no_homing {
        let mut homer = VirtualInput::acquire(&config.device.name)
            .context("Failed to create homing device")?;
        homer.home_cursor(config.device.homing_repeats)?;
        homer.release();
    }

    let mut source_set =
        SourceSet::open(devices, &sources).context("Failed to open input devices")?;
    let mut log = LogWriter::create(output, config.capture.flush_every)
        .with_context(|| format!("Failed to create log {}", output.display()))?;

    println!("Recording {} devices. Press Ctrl+C to stop.", sources.len());
    println!("Hold Ctrl to type without recording.");

    let summary = CaptureEngine::new(cancel).run(&mut source_set, &mut log)?;

    println!(
        "Recorded {} events to {} ({} suppressed, {} discarded).",
        summary.recorded,
        output.display(),
        summary.suppressed,
        summary.discarded
    );
    Ok(())
}
