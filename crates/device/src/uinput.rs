//! Synthetic output devices via uinput.
//!
//! Replay writes each logged event to a virtual device selected by the
//! record's source index, so a [`TargetSet`] holds one [`VirtualInput`] per
//! recorded source. Each virtual device registers the full key and
//! absolute-axis ranges up front so it can accept whatever the log contains.

use std::os::unix::io::{AsRawFd, RawFd};

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{
    AbsInfo, AbsoluteAxisType, AttributeSet, EventType, InputEvent, Key, RelativeAxisType,
    UinputAbsSetup,
};

use evtape_common::error::{EvtapeError, EvtapeResult};
use evtape_model::codec::{event_to_kernel, KERNEL_EVENT_SIZE};
use evtape_model::event::RawEvent;

/// Highest key/button code registered (KEY_MAX).
const KEY_CODE_MAX: u16 = 0x2ff;

/// Highest absolute-axis code registered (ABS_MAX).
const ABS_CODE_MAX: u16 = 0x3f;

/// Magnitude of one homing jump. Far larger than any screen dimension; the
/// compositor clamps the pointer at the edge.
const HOME_STEP: i32 = 10_000;

/// One synthetic input device.
///
/// Capability registration is fail-fast: the kernel device only exists once
/// the final commit succeeds, so an acquisition error leaves nothing behind
/// and [`release`](Self::release) (or `Drop`) is always safe.
pub struct VirtualInput {
    device: VirtualDevice,
    name: String,
}

impl VirtualInput {
    /// Register capabilities and commit one uinput device.
    ///
    /// Registered: mouse buttons (left/right/middle/gear up-down), relative
    /// X/Y motion plus wheel axes, the full key-code range, and the full
    /// absolute-axis range.
    pub fn acquire(name: &str) -> EvtapeResult<Self> {
        let mut keys = AttributeSet::<Key>::new();
        for button in [
            Key::BTN_LEFT,
            Key::BTN_RIGHT,
            Key::BTN_MIDDLE,
            Key::BTN_GEAR_DOWN,
            Key::BTN_GEAR_UP,
        ] {
            keys.insert(button);
        }
        for code in 1..=KEY_CODE_MAX {
            keys.insert(Key::new(code));
        }

        let mut rel = AttributeSet::<RelativeAxisType>::new();
        rel.insert(RelativeAxisType::REL_X);
        rel.insert(RelativeAxisType::REL_Y);
        rel.insert(RelativeAxisType::REL_WHEEL);
        rel.insert(RelativeAxisType::REL_HWHEEL);

        let mut builder = VirtualDeviceBuilder::new()
            .map_err(|e| EvtapeError::device(format!("Failed to open uinput: {e}")))?
            .name(name)
            .with_keys(&keys)
            .map_err(|e| EvtapeError::device(format!("Failed to register keys: {e}")))?
            .with_relative_axes(&rel)
            .map_err(|e| {
                EvtapeError::device(format!("Failed to register relative axes: {e}"))
            })?;

        let abs_info = AbsInfo::new(0, 0, 65535, 0, 0, 0);
        for code in 0..=ABS_CODE_MAX {
            builder = builder
                .with_absolute_axis(&UinputAbsSetup::new(AbsoluteAxisType(code), abs_info))
                .map_err(|e| {
                    EvtapeError::device(format!("Failed to register absolute axis {code}: {e}"))
                })?;
        }

        let device = builder
            .build()
            .map_err(|e| EvtapeError::device(format!("Failed to create virtual device: {e}")))?;

        tracing::info!(name, "Virtual input device created");
        Ok(Self {
            device,
            name: name.to_string(),
        })
    }

    /// Write one bare event to the device.
    ///
    /// Goes straight to the device fd rather than through `emit`, which
    /// frames every call with its own synchronization report. Logged sync
    /// records must pass through as-is, so the kernel event is written raw
    /// and frame boundaries come from the log alone.
    pub fn dispatch(&mut self, event: &RawEvent) -> EvtapeResult<()> {
        write_kernel_event(self.device.as_raw_fd(), event)
            .map_err(|e| EvtapeError::device(format!("Write to {} failed: {e}", self.name)))
    }

    /// Drive the pointer into the top-left screen corner.
    ///
    /// Each repeat is a large negative X/Y jump, a one-unit positive nudge,
    /// and a synchronization marker. Best-effort: relies on the compositor
    /// clamping out-of-bounds motion, so the final position is the corner
    /// plus one unit on either axis regardless of screen resolution.
    pub fn home_cursor(&mut self, repeats: u32) -> EvtapeResult<()> {
        for _ in 0..repeats {
            let burst = [
                InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, -HOME_STEP),
                InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, -HOME_STEP),
                InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, 1),
                InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, 1),
                InputEvent::new(EventType::SYNCHRONIZATION, 0, 0),
            ];
            self.device
                .emit(&burst)
                .map_err(|e| EvtapeError::device(format!("Cursor homing failed: {e}")))?;
        }
        tracing::debug!(name = %self.name, repeats, "Cursor homed");
        Ok(())
    }

    /// Destroy the device. Dropping has the same effect; this form just
    /// makes the release point explicit.
    pub fn release(self) {
        tracing::debug!(name = %self.name, "Releasing virtual input device");
    }
}

/// Write one kernel-layout event to an open device fd.
///
/// The device accepts only whole events; any other byte count aborts the
/// session.
fn write_kernel_event(fd: RawFd, event: &RawEvent) -> std::io::Result<()> {
    let buf = event_to_kernel(event);
    let written = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
    if written < 0 {
        return Err(std::io::Error::last_os_error());
    }
    if written as usize != KERNEL_EVENT_SIZE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::WriteZero,
            format!("short event write: {written} of {KERNEL_EVENT_SIZE} bytes"),
        ));
    }
    Ok(())
}

/// The replay targets of a session: one virtual device per source index.
pub struct TargetSet {
    targets: Vec<VirtualInput>,
}

impl TargetSet {
    /// Create `count` virtual devices. Fail-fast: any acquisition failure
    /// aborts, dropping whatever was already created.
    pub fn create(count: usize, name: &str) -> EvtapeResult<Self> {
        let mut targets = Vec::with_capacity(count);
        for i in 0..count {
            let label = format!("{name} #{i}");
            targets.push(VirtualInput::acquire(&label)?);
        }
        tracing::info!(targets = targets.len(), "Replay targets created");
        Ok(Self { targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Write one bare event to the target selected by `source`.
    ///
    /// The index is trusted; an out-of-range value is a fatal error for the
    /// session, not a skip.
    pub fn dispatch(&mut self, source: u8, event: &RawEvent) -> EvtapeResult<()> {
        let targets = self.targets.len();
        let target = self
            .targets
            .get_mut(source as usize)
            .ok_or(EvtapeError::SourceIndexOutOfRange {
                index: source,
                targets,
            })?;
        target.dispatch(event)
    }

    /// Home the cursor through the first target.
    pub fn home_cursor(&mut self, repeats: u32) -> EvtapeResult<()> {
        match self.targets.first_mut() {
            Some(target) => target.home_cursor(repeats),
            None => Ok(()),
        }
    }

    /// Destroy all targets.
    pub fn release(self) {
        tracing::debug!(targets = self.targets.len(), "Releasing replay targets");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtape_model::codec::event_from_kernel;
    use evtape_model::event::EventTime;
    use std::io::Read;

    #[test]
    fn test_write_kernel_event_emits_exactly_one_raw_event() {
        let dir = std::env::temp_dir().join("evtape_test_uinput_write");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("device");

        let events = [
            RawEvent::new(EventTime::from_micros(10), EventType::RELATIVE.0, 0, -5),
            RawEvent::new(EventTime::from_micros(10), EventType::RELATIVE.0, 1, 3),
            RawEvent::new(EventTime::from_micros(10), EventType::SYNCHRONIZATION.0, 0, 0),
        ];

        {
            let file = std::fs::File::create(&path).unwrap();
            for ev in &events {
                write_kernel_event(file.as_raw_fd(), ev).unwrap();
            }
        }

        // Exactly one kernel event per dispatch: no framing added around
        // the logged synchronization record.
        let mut file = std::fs::File::open(&path).unwrap();
        let mut read_back = Vec::new();
        let mut buf = [0u8; KERNEL_EVENT_SIZE];
        loop {
            match file.read(&mut buf).unwrap() {
                0 => break,
                n => {
                    assert_eq!(n, KERNEL_EVENT_SIZE);
                    read_back.push(event_from_kernel(&buf));
                }
            }
        }
        assert_eq!(read_back, events);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_kernel_event_fails_on_unwritable_fd() {
        let dir = std::env::temp_dir().join("evtape_test_uinput_badfd");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("device");
        std::fs::write(&path, b"").unwrap();

        // Opened read-only: the write must surface an error, not vanish.
        let file = std::fs::File::open(&path).unwrap();
        let ev = RawEvent::new(EventTime::default(), EventType::KEY.0, 30, 1);
        assert!(write_kernel_event(file.as_raw_fd(), &ev).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
