//! Input event and record types.
//!
//! [`RawEvent`] mirrors the kernel's `struct input_event` field-for-field:
//! a seconds/microseconds timestamp, a 16-bit event category (`kind`), a
//! 16-bit code within the category, and a signed 32-bit value. It is the
//! atomic unit read from a device and written to a replay target.
//!
//! [`EventRecord`] prefixes the event with the index of the source that
//! produced it; it is the atomic unit persisted to the log. The index is
//! trusted on replay and used as a direct target lookup.

/// A device timestamp split into whole seconds and microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventTime {
    pub sec: i64,
    pub usec: i64,
}

impl EventTime {
    /// Build a timestamp from a microsecond count.
    pub fn from_micros(us: i64) -> Self {
        Self {
            sec: us.div_euclid(1_000_000),
            usec: us.rem_euclid(1_000_000),
        }
    }

    /// Total microseconds represented by this timestamp.
    pub fn as_micros(&self) -> i64 {
        self.sec * 1_000_000 + self.usec
    }
}

/// One input event as produced by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    /// When the device reported the event (wall clock at capture time).
    pub time: EventTime,

    /// Event category code (key, relative motion, sync, ...).
    pub kind: u16,

    /// Identifier within the category (key code, axis, ...).
    pub code: u16,

    /// Signed magnitude: press/release state for keys, delta for motion.
    pub value: i32,
}

impl RawEvent {
    pub fn new(time: EventTime, kind: u16, code: u16, value: i32) -> Self {
        Self {
            time,
            kind,
            code,
            value,
        }
    }

    /// Event timestamp as total microseconds.
    pub fn timestamp_us(&self) -> i64 {
        self.time.as_micros()
    }
}

/// One persisted log record: the producing source's index plus the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    /// Index of the source that produced the event. Dense from 0, assigned
    /// at registration in enumeration order. Unvalidated on replay.
    pub source: u8,

    /// The bare event.
    pub event: RawEvent,
}

impl EventRecord {
    pub fn new(source: u8, event: RawEvent) -> Self {
        Self { source, event }
    }
}
