//! Control-key recording gate.
//!
//! While either Control key is held, nothing is recorded; the gate is how
//! the operator types commands (including the final Ctrl+C) without them
//! ending up in the macro.
//!
//! The gate is a single latch shared across all sources and both Control
//! keys. Two consequences are deliberate, documented behavior rather than
//! bugs to fix: concurrent Control activity on different sources races and
//! the last event processed wins; and a release event lost to a discarded
//! short read leaves the gate stuck ON for the rest of the session.

use evdev::{EventType, Key};
use evtape_model::event::RawEvent;

/// Latched gate state, engaged while a Control key is held.
#[derive(Debug, Default)]
pub struct ModifierGate {
    engaged: bool,
}

impl ModifierGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the latch from one event. Key events for left or right
    /// Control set the gate to the key's press state (nonzero value =
    /// pressed); everything else leaves it unchanged.
    pub fn observe(&mut self, event: &RawEvent) {
        if event.kind != EventType::KEY.0 {
            return;
        }
        if event.code == Key::KEY_LEFTCTRL.0 || event.code == Key::KEY_RIGHTCTRL.0 {
            self.engaged = event.value != 0;
        }
    }

    /// Whether recording is currently suppressed.
    pub fn engaged(&self) -> bool {
        self.engaged
    }
}
