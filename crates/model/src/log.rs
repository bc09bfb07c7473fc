//! Append-only binary log writer and sequential reader.
//!
//! The log carries no header, record count, or checksum. A crash mid-capture
//! leaves the file truncated at the last fully-written record; the reader
//! treats a trailing partial record as clean end-of-data.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use evtape_common::error::{EvtapeError, EvtapeResult};

use crate::codec::{decode_record, encode_record, RECORD_SIZE};
use crate::event::EventRecord;

/// Writes records to a log file opened for exclusive write.
pub struct LogWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    records_written: u64,
    flush_every: u64,
}

impl LogWriter {
    /// Create (or truncate) the log file.
    pub fn create(path: &Path, flush_every: u64) -> EvtapeResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| {
                EvtapeError::capture(format!("Failed to open log {}: {e}", path.display()))
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            records_written: 0,
            flush_every: flush_every.max(1),
        })
    }

    /// Append one record. The full fixed-size encoding is written or the
    /// call fails; a short write surfaces as an I/O error and aborts the
    /// session.
    pub fn append(&mut self, record: &EventRecord) -> EvtapeResult<()> {
        let buf = encode_record(record);
        self.writer
            .write_all(&buf)
            .map_err(|e| EvtapeError::capture(format!("Failed to write record: {e}")))?;
        self.records_written += 1;

        if self.records_written % self.flush_every == 0 {
            self.flush()?;
        }

        Ok(())
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) -> EvtapeResult<()> {
        self.writer
            .flush()
            .map_err(|e| EvtapeError::capture(format!("Failed to flush log: {e}")))?;
        Ok(())
    }

    /// Number of records appended so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Reads records sequentially from a log file.
pub struct LogReader {
    reader: BufReader<File>,
    records_read: u64,
}

impl LogReader {
    pub fn open(path: &Path) -> EvtapeResult<Self> {
        let file = File::open(path).map_err(|e| {
            EvtapeError::replay(format!("Failed to open log {}: {e}", path.display()))
        })?;
        Ok(Self {
            reader: BufReader::new(file),
            records_read: 0,
        })
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at clean end-of-file, and also when the file ends
    /// mid-record (a truncated tail is end-of-data, not an error). Read
    /// errors other than interruption propagate.
    pub fn next_record(&mut self) -> EvtapeResult<Option<EventRecord>> {
        let mut buf = [0u8; RECORD_SIZE];
        let mut filled = 0;

        while filled < RECORD_SIZE {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    if filled > 0 {
                        tracing::warn!(
                            bytes = filled,
                            records = self.records_read,
                            "Log ends mid-record; treating as end of data"
                        );
                    }
                    return Ok(None);
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(EvtapeError::replay(format!("Failed to read record: {e}")));
                }
            }
        }

        self.records_read += 1;
        Ok(Some(decode_record(&buf)))
    }

    /// Number of complete records read so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

/// Scan a log and return the number of replay targets it needs: one past
/// the highest source index referenced. An empty log needs none.
pub fn required_targets(path: &Path) -> EvtapeResult<usize> {
    let mut reader = LogReader::open(path)?;
    let mut max_index: Option<u8> = None;
    while let Some(record) = reader.next_record()? {
        max_index = Some(max_index.map_or(record.source, |m| m.max(record.source)));
    }
    Ok(max_index.map_or(0, |m| m as usize + 1))
}
