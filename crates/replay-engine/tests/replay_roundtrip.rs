//! End-to-end round-trip: scripted capture into a log, then replay of that
//! log into a collecting sink.

use std::collections::VecDeque;
use std::path::PathBuf;

use evdev::{EventType, Key};
use evtape_capture::{CaptureEngine, EventSources};
use evtape_common::cancel::CancelFlag;
use evtape_common::error::EvtapeResult;
use evtape_model::event::{EventTime, RawEvent};
use evtape_model::log::{required_targets, LogReader, LogWriter};
use evtape_replay::{EventSink, ReplayEngine};

struct ScriptedSources {
    queues: Vec<VecDeque<RawEvent>>,
    cancel: CancelFlag,
}

impl ScriptedSources {
    fn new(queues: Vec<Vec<RawEvent>>, cancel: CancelFlag) -> Self {
        Self {
            queues: queues.into_iter().map(VecDeque::from).collect(),
            cancel,
        }
    }
}

impl EventSources for ScriptedSources {
    fn source_count(&self) -> usize {
        self.queues.len()
    }

    fn wait_ready(&mut self) -> EvtapeResult<Vec<usize>> {
        let ready: Vec<usize> = self
            .queues
            .iter()
            .enumerate()
            .filter(|(_, q)| !q.is_empty())
            .map(|(i, _)| i)
            .collect();
        if ready.is_empty() {
            self.cancel.cancel();
        }
        Ok(ready)
    }

    fn read_event(&mut self, index: usize) -> EvtapeResult<Option<RawEvent>> {
        Ok(self.queues[index].pop_front())
    }
}

struct CollectingSink {
    targets: usize,
    seen: Vec<(u8, RawEvent)>,
}

impl EventSink for CollectingSink {
    fn target_count(&self) -> usize {
        self.targets
    }

    fn dispatch(&mut self, source: u8, event: &RawEvent) -> EvtapeResult<()> {
        assert!((source as usize) < self.targets, "index outside target set");
        self.seen.push((source, *event));
        Ok(())
    }
}

fn key(us: i64, code: u16, value: i32) -> RawEvent {
    RawEvent::new(EventTime::from_micros(us), EventType::KEY.0, code, value)
}

fn test_log(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("evtape_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("events.bin")
}

#[test]
fn test_capture_then_replay_preserves_events_and_sources() {
    let path = test_log("roundtrip");
    let cancel = CancelFlag::new();

    // Two sources, interleaved by the capture loop's per-wake-up sweep.
    let mut sources = ScriptedSources::new(
        vec![
            vec![key(10, Key::KEY_A.0, 1), key(30, Key::KEY_A.0, 0)],
            vec![key(20, Key::KEY_B.0, 1), key(40, Key::KEY_B.0, 0)],
        ],
        cancel.clone(),
    );

    let mut log = LogWriter::create(&path, 1000).unwrap();
    let summary = CaptureEngine::new(cancel)
        .run(&mut sources, &mut log)
        .unwrap();
    drop(log);
    assert_eq!(summary.recorded, 4);

    assert_eq!(required_targets(&path).unwrap(), 2);

    let mut reader = LogReader::open(&path).unwrap();
    let mut sink = CollectingSink {
        targets: 2,
        seen: Vec::new(),
    };
    let replayed = ReplayEngine::new(CancelFlag::new())
        .run(&mut reader, &mut sink)
        .unwrap();
    assert_eq!(replayed.dispatched, 4);

    // Each source's events arrive at its own target, in recorded order,
    // with timing, type, code, and value intact.
    let per_source = |s: u8| -> Vec<(i64, u16, i32)> {
        sink.seen
            .iter()
            .filter(|(src, _)| *src == s)
            .map(|(_, e)| (e.timestamp_us(), e.code, e.value))
            .collect()
    };
    assert_eq!(
        per_source(0),
        vec![(10, Key::KEY_A.0, 1), (30, Key::KEY_A.0, 0)]
    );
    assert_eq!(
        per_source(1),
        vec![(20, Key::KEY_B.0, 1), (40, Key::KEY_B.0, 0)]
    );
}

#[test]
fn test_gated_events_never_reach_replay() {
    let path = test_log("roundtrip_gated");
    let cancel = CancelFlag::new();

    let mut sources = ScriptedSources::new(
        vec![vec![
            key(10, Key::KEY_A.0, 1),
            key(20, Key::KEY_LEFTCTRL.0, 1),
            key(30, Key::KEY_C.0, 1),
            key(40, Key::KEY_C.0, 0),
            key(50, Key::KEY_LEFTCTRL.0, 0),
            key(60, Key::KEY_B.0, 1),
        ]],
        cancel.clone(),
    );

    let mut log = LogWriter::create(&path, 1000).unwrap();
    CaptureEngine::new(cancel)
        .run(&mut sources, &mut log)
        .unwrap();
    drop(log);

    let mut reader = LogReader::open(&path).unwrap();
    let mut sink = CollectingSink {
        targets: 1,
        seen: Vec::new(),
    };
    ReplayEngine::new(CancelFlag::new())
        .run(&mut reader, &mut sink)
        .unwrap();

    let codes: Vec<u16> = sink.seen.iter().map(|(_, e)| e.code).collect();
    assert_eq!(codes, vec![Key::KEY_A.0, Key::KEY_LEFTCTRL.0, Key::KEY_B.0]);
}

#[test]
fn test_required_targets_matches_highest_recorded_source() {
    let path = test_log("roundtrip_targets");
    let mut log = LogWriter::create(&path, 1000).unwrap();
    for (source, us) in [(0u8, 10i64), (2, 20), (1, 30)] {
        log.append(&evtape_model::event::EventRecord::new(
            source,
            key(us, Key::KEY_A.0, 1),
        ))
        .unwrap();
    }
    drop(log);

    assert_eq!(required_targets(&path).unwrap(), 3);
}
