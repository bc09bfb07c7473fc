//! Binary codecs for log records and kernel events.
//!
//! Log record layout v1 (25 bytes, multi-byte fields little-endian):
//! ```text
//! [source:1][sec:8][usec:8][kind:2][code:2][value:4]
//! ```
//! The layout is spelled out field by field instead of dumping the in-memory
//! struct, so logs are portable across builds and platforms. Logs written by
//! older native-layout recorders are not readable.
//!
//! Device reads hand us the kernel's `struct input_event` in native byte
//! order; [`event_from_kernel`] decodes it at explicit offsets. The offsets
//! assume the LP64 layout (16-byte `timeval`), which the compile-time size
//! guard below enforces.

use crate::event::{EventRecord, EventTime, RawEvent};

/// Size of one encoded log record.
pub const RECORD_SIZE: usize = 25;

/// Size of the kernel's `struct input_event` on LP64 targets.
pub const KERNEL_EVENT_SIZE: usize = 24;

// Fails to compile if the host input_event layout is not the one we decode.
const _: [(); KERNEL_EVENT_SIZE] = [(); std::mem::size_of::<libc::input_event>()];

/// Encode a record into its fixed-size wire form.
pub fn encode_record(record: &EventRecord) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    buf[0] = record.source;
    buf[1..9].copy_from_slice(&record.event.time.sec.to_le_bytes());
    buf[9..17].copy_from_slice(&record.event.time.usec.to_le_bytes());
    buf[17..19].copy_from_slice(&record.event.kind.to_le_bytes());
    buf[19..21].copy_from_slice(&record.event.code.to_le_bytes());
    buf[21..25].copy_from_slice(&record.event.value.to_le_bytes());
    buf
}

/// Decode a record from its fixed-size wire form.
///
/// Infallible: every 25-byte string is a structurally valid record. The
/// source index is not range-checked here; replay validates it against the
/// target set at dispatch time.
pub fn decode_record(buf: &[u8; RECORD_SIZE]) -> EventRecord {
    let sec = i64::from_le_bytes(buf[1..9].try_into().expect("slice length is fixed"));
    let usec = i64::from_le_bytes(buf[9..17].try_into().expect("slice length is fixed"));
    let kind = u16::from_le_bytes(buf[17..19].try_into().expect("slice length is fixed"));
    let code = u16::from_le_bytes(buf[19..21].try_into().expect("slice length is fixed"));
    let value = i32::from_le_bytes(buf[21..25].try_into().expect("slice length is fixed"));
    EventRecord {
        source: buf[0],
        event: RawEvent {
            time: EventTime { sec, usec },
            kind,
            code,
            value,
        },
    }
}

/// Encode one event as a kernel `input_event` for writing to a device node.
pub fn event_to_kernel(event: &RawEvent) -> [u8; KERNEL_EVENT_SIZE] {
    let mut buf = [0u8; KERNEL_EVENT_SIZE];
    buf[0..8].copy_from_slice(&event.time.sec.to_ne_bytes());
    buf[8..16].copy_from_slice(&event.time.usec.to_ne_bytes());
    buf[16..18].copy_from_slice(&event.kind.to_ne_bytes());
    buf[18..20].copy_from_slice(&event.code.to_ne_bytes());
    buf[20..24].copy_from_slice(&event.value.to_ne_bytes());
    buf
}

/// Decode one kernel `input_event` read from a device node.
pub fn event_from_kernel(buf: &[u8; KERNEL_EVENT_SIZE]) -> RawEvent {
    let sec = i64::from_ne_bytes(buf[0..8].try_into().expect("slice length is fixed"));
    let usec = i64::from_ne_bytes(buf[8..16].try_into().expect("slice length is fixed"));
    let kind = u16::from_ne_bytes(buf[16..18].try_into().expect("slice length is fixed"));
    let code = u16::from_ne_bytes(buf[18..20].try_into().expect("slice length is fixed"));
    let value = i32::from_ne_bytes(buf[20..24].try_into().expect("slice length is fixed"));
    RawEvent {
        time: EventTime { sec, usec },
        kind,
        code,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_record_layout_v1_golden_bytes() {
        let record = EventRecord::new(
            3,
            RawEvent::new(
                EventTime {
                    sec: 0x0102030405060708,
                    usec: 0x11,
                },
                0x0001,
                0x001d,
                -2,
            ),
        );
        let buf = encode_record(&record);
        assert_eq!(buf[0], 3);
        // sec, little-endian
        assert_eq!(
            &buf[1..9],
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        // usec
        assert_eq!(&buf[9..17], &[0x11, 0, 0, 0, 0, 0, 0, 0]);
        // kind, code
        assert_eq!(&buf[17..19], &[0x01, 0x00]);
        assert_eq!(&buf[19..21], &[0x1d, 0x00]);
        // value = -2
        assert_eq!(&buf[21..25], &[0xfe, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_kernel_event_decode() {
        let mut buf = [0u8; KERNEL_EVENT_SIZE];
        buf[0..8].copy_from_slice(&1234i64.to_ne_bytes());
        buf[8..16].copy_from_slice(&567890i64.to_ne_bytes());
        buf[16..18].copy_from_slice(&2u16.to_ne_bytes());
        buf[18..20].copy_from_slice(&0u16.to_ne_bytes());
        buf[20..24].copy_from_slice(&(-40i32).to_ne_bytes());

        let ev = event_from_kernel(&buf);
        assert_eq!(ev.time.sec, 1234);
        assert_eq!(ev.time.usec, 567890);
        assert_eq!(ev.kind, 2);
        assert_eq!(ev.code, 0);
        assert_eq!(ev.value, -40);
    }

    #[test]
    fn test_kernel_event_encode_matches_decode() {
        let ev = RawEvent::new(
            EventTime {
                sec: 1234,
                usec: 567890,
            },
            2,
            0,
            -40,
        );
        let buf = event_to_kernel(&ev);
        assert_eq!(&buf[0..8], &1234i64.to_ne_bytes());
        assert_eq!(&buf[20..24], &(-40i32).to_ne_bytes());
        assert_eq!(event_from_kernel(&buf), ev);
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(
            source in any::<u8>(),
            sec in any::<i64>(),
            usec in 0i64..1_000_000,
            kind in any::<u16>(),
            code in any::<u16>(),
            value in any::<i32>(),
        ) {
            let record = EventRecord::new(
                source,
                RawEvent::new(EventTime { sec, usec }, kind, code, value),
            );
            prop_assert_eq!(decode_record(&encode_record(&record)), record);
        }
    }
}
