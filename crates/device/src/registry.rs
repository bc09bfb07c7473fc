//! Device registry: directory enumeration into indexed sources.

use std::path::Path;

use evtape_common::error::{EvtapeError, EvtapeResult};

/// A registered input source: a device node name plus its session index.
///
/// Indices are dense and contiguous from 0, assigned in enumeration order.
/// The order is whatever the directory listing yields — it is not sorted and
/// not stable across re-enumeration, so a log only replays correctly against
/// the same device population it was recorded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSource {
    pub index: u8,
    pub name: String,
}

/// Enumerate every non-directory entry of `dir` as an [`EventSource`].
///
/// No validation beyond the listing itself; whether a name is actually a
/// readable or writable device is discovered at acquisition time. Fails if
/// the directory cannot be opened or holds more nodes than the 8-bit index
/// space allows.
pub fn enumerate_sources(dir: &Path) -> EvtapeResult<Vec<EventSource>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        EvtapeError::registry(format!(
            "Cannot open device directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            EvtapeError::registry(format!("Failed to list {}: {e}", dir.display()))
        })?;
        let file_type = entry.file_type().map_err(|e| {
            EvtapeError::registry(format!("Failed to stat {:?}: {e}", entry.file_name()))
        })?;
        if file_type.is_dir() {
            continue;
        }

        if sources.len() > u8::MAX as usize {
            return Err(EvtapeError::registry(format!(
                "Device directory {} holds more than {} nodes",
                dir.display(),
                u8::MAX as usize + 1
            )));
        }

        sources.push(EventSource {
            index: sources.len() as u8,
            name: entry.file_name().to_string_lossy().into_owned(),
        });
    }

    tracing::debug!(count = sources.len(), dir = %dir.display(), "Enumerated sources");
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("evtape_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_enumerates_non_directory_entries_with_dense_indices() {
        let dir = test_dir("registry");
        std::fs::write(dir.join("event0"), b"").unwrap();
        std::fs::write(dir.join("event1"), b"").unwrap();
        std::fs::create_dir(dir.join("by-id")).unwrap();

        let sources = enumerate_sources(&dir).unwrap();
        assert_eq!(sources.len(), 2);
        for (i, source) in sources.iter().enumerate() {
            assert_eq!(source.index as usize, i);
            assert!(source.name.starts_with("event"));
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join("evtape_test_registry_missing");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(enumerate_sources(&dir).is_err());
    }

    #[test]
    fn test_empty_directory_yields_no_sources() {
        let dir = test_dir("registry_empty");
        assert!(enumerate_sources(&dir).unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }
}
