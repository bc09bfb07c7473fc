//! Evtape Device Session Layer
//!
//! Everything that touches a device node lives here, shared by the capture
//! and replay engines:
//!
//! - [`registry`]: enumerate a device directory into indexed sources
//! - [`sources`]: open sources non-blocking and multiplex reads with poll(2)
//! - [`uinput`]: create and drive synthetic (uinput) output devices
//!
//! Every handle releases its resources on `Drop`, so teardown runs exactly
//! once on every exit path — normal completion, error, or cancellation.

pub mod registry;
pub mod sources;
pub mod uinput;

pub use registry::{enumerate_sources, EventSource};
pub use sources::SourceSet;
pub use uinput::{TargetSet, VirtualInput};
