//! Cooperative cancellation.
//!
//! Capture and replay each run a single synchronous loop; the only way to
//! stop them early is this flag. The SIGINT handler does nothing except
//! store into a static atomic — all teardown happens back in the owning
//! loop's normal control flow once the flag is observed. Blocking waits
//! (`poll(2)`) return `EINTR` when the signal arrives, which the source
//! layer reports as an empty ready-set so the loop reaches its flag check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::EvtapeResult;

/// Set by the SIGINT handler; read by every `CancelFlag` in the process.
static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// A cancellation flag polled by the capture/replay loops.
///
/// Cloning yields a handle to the same flag. Programmatic cancellation via
/// [`CancelFlag::cancel`] and SIGINT-driven cancellation are equivalent to
/// the observing loop.
#[derive(Debug, Clone)]
pub struct CancelFlag {
    local: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self {
            local: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation from normal program flow.
    pub fn cancel(&self) {
        self.local.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested, by either this flag or a
    /// received SIGINT.
    pub fn is_cancelled(&self) -> bool {
        self.local.load(Ordering::Relaxed) || SIGINT_RECEIVED.load(Ordering::Relaxed)
    }

    /// Install the process-wide SIGINT handler.
    ///
    /// The handler only sets [`SIGINT_RECEIVED`]; it never touches devices,
    /// files, or allocations. `SA_RESTART` is deliberately not set so that
    /// interruptible syscalls report `EINTR` and the loops wake promptly.
    pub fn install_sigint_handler() -> EvtapeResult<()> {
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = handle_sigint as libc::sighandler_t;
            libc::sigemptyset(&mut action.sa_mask);
            action.sa_flags = 0;
            if libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut()) != 0 {
                return Err(std::io::Error::last_os_error().into());
            }
        }
        tracing::debug!("SIGINT handler installed");
        Ok(())
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

extern "C" fn handle_sigint(_signo: libc::c_int) {
    // Async-signal-safe: a single atomic store, nothing else.
    SIGINT_RECEIVED.store(true, Ordering::SeqCst);
}
