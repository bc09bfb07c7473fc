//! Drift-based replay pacing.
//!
//! Logged events carry the wall-clock timestamps of the original session.
//! The first record anchors a fixed drift between that session's clock and
//! the current one; every later record is due at its own timestamp plus
//! that drift. Sleeping only for the remaining portion keeps the gaps
//! between events equal to the recorded gaps no matter when replay starts,
//! and records that are already overdue dispatch immediately.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time in microseconds since the epoch.
pub fn wall_clock_us() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_micros() as i64,
        // Clock before the epoch; treat as zero rather than abort replay.
        Err(_) => 0,
    }
}

/// The session-wide pacing state: one drift anchor, set by the first record.
#[derive(Debug, Default)]
pub struct PacingClock {
    drift_us: Option<i64>,
}

impl PacingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long to wait before dispatching a record stamped `ts_us`, given
    /// the current time `now_us`.
    ///
    /// The first call anchors the drift and returns `None`: the first
    /// record is always immediate. Later calls return the remaining time
    /// until the record's adjusted due point, or `None` when it is already
    /// due.
    pub fn delay_for(&mut self, ts_us: i64, now_us: i64) -> Option<Duration> {
        let drift = match self.drift_us {
            Some(drift) => drift,
            None => {
                let drift = now_us - ts_us;
                self.drift_us = Some(drift);
                tracing::debug!(drift_us = drift, "Pacing drift anchored");
                return None;
            }
        };

        let remaining = ts_us + drift - now_us;
        if remaining > 0 {
            Some(Duration::from_micros(remaining as u64))
        } else {
            None
        }
    }
}
