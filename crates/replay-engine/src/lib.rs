//! Evtape Replay Engine
//!
//! Streams records out of a binary log, paces them against the recorded
//! timestamps, and writes each one to the synthetic target selected by its
//! source index. One synchronous loop; the only suspension point is the
//! pacing sleep, and cancellation is polled once per record, so a request
//! arriving mid-wait takes effect after the in-flight record dispatches.

pub mod pacing;

use std::thread;

use evtape_common::cancel::CancelFlag;
use evtape_common::error::EvtapeResult;
use evtape_device::TargetSet;
use evtape_model::event::RawEvent;
use evtape_model::log::LogReader;

use crate::pacing::{wall_clock_us, PacingClock};

/// Trait for the synthetic devices replay writes to.
///
/// [`TargetSet`] is the production implementation; tests collect instead.
pub trait EventSink {
    /// Number of targets available for dispatch.
    fn target_count(&self) -> usize;

    /// Write one event to the target selected by `source`. An out-of-range
    /// index is a fatal error, not a skip.
    fn dispatch(&mut self, source: u8, event: &RawEvent) -> EvtapeResult<()>;
}

impl EventSink for TargetSet {
    fn target_count(&self) -> usize {
        self.len()
    }

    fn dispatch(&mut self, source: u8, event: &RawEvent) -> EvtapeResult<()> {
        TargetSet::dispatch(self, source, event)
    }
}

/// Counters reported when a replay session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Records written to a target.
    pub dispatched: u64,

    /// Whether the session ended on a cancellation request rather than at
    /// the end of the log.
    pub cancelled: bool,
}

/// The replay loop.
pub struct ReplayEngine {
    cancel: CancelFlag,
}

impl ReplayEngine {
    pub fn new(cancel: CancelFlag) -> Self {
        Self { cancel }
    }

    /// Replay the whole log into `sink`.
    ///
    /// Records dispatch in log order. The first record anchors the pacing
    /// drift and goes out immediately; each later record waits out the
    /// remainder of its recorded gap first. A truncated trailing record is
    /// end-of-data. Cancellation is a success, observed once per record: a
    /// request arriving during a pacing wait lets the waited-for record
    /// dispatch, then stops the loop before the next one.
    pub fn run<S: EventSink>(
        &mut self,
        log: &mut LogReader,
        sink: &mut S,
    ) -> EvtapeResult<ReplaySummary> {
        let mut summary = ReplaySummary::default();
        let mut clock = PacingClock::new();
        tracing::info!(targets = sink.target_count(), "Replay started");

        loop {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                tracing::info!("Cancellation observed; stopping replay");
                break;
            }

            let record = match log.next_record()? {
                Some(record) => record,
                None => break,
            };

            if let Some(delay) = clock.delay_for(record.event.timestamp_us(), wall_clock_us()) {
                thread::sleep(delay);
            }

            sink.dispatch(record.source, &record.event)?;
            summary.dispatched += 1;

            tracing::trace!(
                source = record.source,
                kind = record.event.kind,
                code = record.event.code,
                value = record.event.value,
                "Dispatched event"
            );
        }

        tracing::info!(
            dispatched = summary.dispatched,
            cancelled = summary.cancelled,
            "Replay finished"
        );
        Ok(summary)
    }
}
