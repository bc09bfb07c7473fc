//! Non-blocking source handles and poll(2) multiplexing.

use std::fs::{File, OpenOptions};
use std::io::Read;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use evtape_common::error::{EvtapeError, EvtapeResult};
use evtape_model::codec::{event_from_kernel, KERNEL_EVENT_SIZE};
use evtape_model::event::RawEvent;

use crate::registry::EventSource;

/// All capture sources of a session, opened non-blocking for read.
///
/// File position `i` corresponds to source index `i`. Handles close when
/// the set is dropped.
pub struct SourceSet {
    files: Vec<File>,
    names: Vec<String>,
}

impl SourceSet {
    /// Open every registered source under `dir`.
    ///
    /// Fail-fast: if any single node cannot be opened the whole session
    /// aborts before any data is captured; already-opened handles close on
    /// the way out.
    pub fn open(dir: &Path, sources: &[EventSource]) -> EvtapeResult<Self> {
        let mut files = Vec::with_capacity(sources.len());
        let mut names = Vec::with_capacity(sources.len());

        for source in sources {
            let path = dir.join(&source.name);
            let file = OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_NONBLOCK)
                .open(&path)
                .map_err(|e| {
                    EvtapeError::capture(format!(
                        "Failed to open input device {}: {e}",
                        path.display()
                    ))
                })?;
            files.push(file);
            names.push(source.name.clone());
        }

        tracing::info!(sources = files.len(), "Opened capture sources");
        Ok(Self { files, names })
    }

    /// Number of open sources.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Block until at least one source has data, with no timeout.
    ///
    /// Returns the indices that are ready. A poll interrupted by a signal
    /// (`EINTR`) returns an empty set — a plain wake-up that lets the
    /// caller's loop observe its cancellation flag before waiting again.
    pub fn wait_ready(&mut self) -> EvtapeResult<Vec<usize>> {
        let mut fds: Vec<libc::pollfd> = self
            .files
            .iter()
            .map(|f| libc::pollfd {
                fd: f.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();

        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(EvtapeError::capture(format!("poll failed: {err}")));
        }

        Ok(fds
            .iter()
            .enumerate()
            .filter(|(_, p)| p.revents & libc::POLLIN != 0)
            .map(|(i, _)| i)
            .collect())
    }

    /// Perform exactly one fixed-size read from the given source.
    ///
    /// A read of any other byte count is a non-fatal anomaly: the partial
    /// data is discarded and `Ok(None)` is returned so capture continues.
    /// `WouldBlock` (the readiness was consumed elsewhere) is also
    /// `Ok(None)`. Real read errors propagate.
    pub fn read_event(&mut self, index: usize) -> EvtapeResult<Option<RawEvent>> {
        let file = self.files.get_mut(index).ok_or_else(|| {
            EvtapeError::capture(format!("No open source at index {index}"))
        })?;

        let mut buf = [0u8; KERNEL_EVENT_SIZE];
        match file.read(&mut buf) {
            Ok(n) if n == KERNEL_EVENT_SIZE => Ok(Some(event_from_kernel(&buf))),
            Ok(n) => {
                tracing::debug!(
                    source = index,
                    device = %self.names[index],
                    bytes = n,
                    "Discarding short device read"
                );
                Ok(None)
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(EvtapeError::capture(format!(
                "Read from {} failed: {e}",
                self.names[index]
            ))),
        }
    }
}

impl Drop for SourceSet {
    fn drop(&mut self) {
        tracing::debug!(sources = self.files.len(), "Closing capture sources");
    }
}
