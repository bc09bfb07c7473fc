//! Evtape Capture Engine
//!
//! Multiplexes reads across all registered sources, applies the Control-key
//! recording gate, and appends accepted events to the binary log. One
//! synchronous loop; the only suspension point is the readiness wait, and
//! cancellation is polled once per wake-up.

pub mod gate;

use evtape_common::cancel::CancelFlag;
use evtape_common::error::EvtapeResult;
use evtape_device::SourceSet;
use evtape_model::event::{EventRecord, RawEvent};
use evtape_model::log::LogWriter;

use crate::gate::ModifierGate;

/// Trait for multiplexed event sources.
///
/// [`SourceSet`] is the production implementation; tests script their own.
pub trait EventSources {
    /// Number of registered sources.
    fn source_count(&self) -> usize;

    /// Block until at least one source is ready; an interrupted wait
    /// returns an empty set so the caller can observe cancellation.
    fn wait_ready(&mut self) -> EvtapeResult<Vec<usize>>;

    /// One fixed-size read from the given source. `Ok(None)` means the
    /// read was short or would block; the event is discarded and capture
    /// continues.
    fn read_event(&mut self, index: usize) -> EvtapeResult<Option<RawEvent>>;
}

impl EventSources for SourceSet {
    fn source_count(&self) -> usize {
        self.len()
    }

    fn wait_ready(&mut self) -> EvtapeResult<Vec<usize>> {
        SourceSet::wait_ready(self)
    }

    fn read_event(&mut self, index: usize) -> EvtapeResult<Option<RawEvent>> {
        SourceSet::read_event(self, index)
    }
}

/// Counters reported when a capture session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    /// Records appended to the log.
    pub recorded: u64,

    /// Events consumed while the gate was engaged.
    pub suppressed: u64,

    /// Short reads discarded.
    pub discarded: u64,
}

/// The capture loop.
pub struct CaptureEngine {
    gate: ModifierGate,
    cancel: CancelFlag,
}

impl CaptureEngine {
    pub fn new(cancel: CancelFlag) -> Self {
        Self {
            gate: ModifierGate::new(),
            cancel,
        }
    }

    /// Run until cancelled or an aborting error.
    ///
    /// Per wake-up: check the cancellation flag, then read exactly one
    /// event from each ready source. The gate observes every event before
    /// the write decision, so a Control press is itself suppressed while
    /// the matching release is recorded. Cancellation is a success; the
    /// log is flushed on the way out and all handles release via Drop.
    pub fn run<S: EventSources>(
        &mut self,
        sources: &mut S,
        log: &mut LogWriter,
    ) -> EvtapeResult<CaptureSummary> {
        let mut summary = CaptureSummary::default();
        tracing::info!(sources = sources.source_count(), "Capture started");

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation observed; stopping capture");
                break;
            }

            let ready = sources.wait_ready()?;

            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation observed after wake-up; stopping capture");
                break;
            }

            for index in ready {
                let event = match sources.read_event(index)? {
                    Some(event) => event,
                    None => {
                        summary.discarded += 1;
                        continue;
                    }
                };

                self.gate.observe(&event);

                if self.gate.engaged() {
                    summary.suppressed += 1;
                    continue;
                }

                log.append(&EventRecord::new(index as u8, event))?;
                summary.recorded += 1;

                tracing::trace!(
                    source = index,
                    kind = event.kind,
                    code = event.code,
                    value = event.value,
                    "Recorded event"
                );
            }
        }

        log.flush()?;
        tracing::info!(
            recorded = summary.recorded,
            suppressed = summary.suppressed,
            discarded = summary.discarded,
            "Capture finished"
        );
        Ok(summary)
    }
}
