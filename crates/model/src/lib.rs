//! Evtape Event Model
//!
//! The shared data model for capture and replay:
//!
//! - [`event`]: the in-memory event and record types
//! - [`codec`]: the explicit binary record layout and the kernel-event decode
//! - [`log`]: append-only log writer and sequential reader
//!
//! The log is an unframed sequence of fixed-size records with no header and
//! no checksum; end-of-data is a short read at end-of-file.

pub mod codec;
pub mod event;
pub mod log;

pub use codec::{KERNEL_EVENT_SIZE, RECORD_SIZE};
pub use event::{EventRecord, EventTime, RawEvent};
pub use log::{required_targets, LogReader, LogWriter};
