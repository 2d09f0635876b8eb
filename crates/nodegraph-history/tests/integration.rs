// Integration tests for the history engine.
//
// These tests drive the engine through its public API against a small
// host document, the way an editor session would.

use std::time::Duration;

use nodegraph_history::{
    next_repeat_delay, Direction, DocumentHost, HistoryConfig, HistoryEngine, ManualClock,
    StateBlob, StepOutcome,
};

/// A list of integers serialized as comma-separated text.
#[derive(Debug, Default)]
struct Counters {
    values: Vec<i64>,
    restores: usize,
}

impl DocumentHost for Counters {
    fn capture_state(&self) -> StateBlob {
        let text: Vec<String> = self.values.iter().map(i64::to_string).collect();
        StateBlob::from(text.join(","))
    }

    fn restore_state(&mut self, blob: &StateBlob) -> anyhow::Result<()> {
        let values = if blob.is_empty() {
            Vec::new()
        } else {
            blob.as_str()
                .split(',')
                .map(str::parse)
                .collect::<Result<Vec<i64>, _>>()?
        };
        self.values = values;
        self.restores += 1;
        Ok(())
    }
}

fn setup(config: HistoryConfig) -> (HistoryEngine<ManualClock>, ManualClock, Counters) {
    let clock = ManualClock::new();
    let engine = HistoryEngine::with_clock(config, clock.clone());
    (engine, clock, Counters::default())
}

fn push_value(engine: &mut HistoryEngine<ManualClock>, doc: &mut Counters, value: i64) {
    engine.begin_burst(doc);
    doc.values.push(value);
    engine.end_burst(doc);
}

fn undo_texts(engine: &HistoryEngine<ManualClock>) -> Vec<String> {
    engine
        .undo_stack()
        .iter()
        .map(|b| b.as_str().to_string())
        .collect()
}

// ── Bounded Growth ─────────────────────────────────────────────────────

#[test]
fn test_bounded_growth_keeps_most_recent_states() {
    let config = HistoryConfig {
        max_undo_steps: 5,
        ..Default::default()
    };
    let (mut engine, clock, mut doc) = setup(config);

    for i in 0..20 {
        clock.advance(Duration::from_millis(500));
        push_value(&mut engine, &mut doc, i);
    }

    assert_eq!(engine.undo_len(), 5);
    // Pre-states of the last five edits, newest first
    let expected: Vec<String> = (15..20)
        .rev()
        .map(|n| {
            (0..n)
                .map(|v: i64| v.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();
    assert_eq!(undo_texts(&engine), expected);
}

// ── Merge Window ───────────────────────────────────────────────────────

#[test]
fn test_rapid_edits_form_one_step() {
    let (mut engine, clock, mut doc) = setup(HistoryConfig::default());

    // Typing burst: one value every 20ms
    for i in 0..10 {
        clock.advance(Duration::from_millis(20));
        push_value(&mut engine, &mut doc, i);
    }
    assert_eq!(engine.undo_len(), 1);

    assert!(engine.undo(&mut doc).is_restored());
    assert!(doc.values.is_empty());
}

#[test]
fn test_pause_between_runs_splits_steps() {
    let (mut engine, clock, mut doc) = setup(HistoryConfig::default());

    for i in 0..3 {
        clock.advance(Duration::from_millis(20));
        push_value(&mut engine, &mut doc, i);
    }
    clock.advance(Duration::from_millis(300));
    for i in 3..6 {
        clock.advance(Duration::from_millis(20));
        push_value(&mut engine, &mut doc, i);
    }

    assert_eq!(engine.undo_len(), 2);
    engine.undo(&mut doc);
    assert_eq!(doc.values, vec![0, 1, 2]);
    engine.undo(&mut doc);
    assert!(doc.values.is_empty());
}

#[test]
fn test_zero_threshold_never_merges() {
    let config = HistoryConfig {
        merge_threshold: Duration::ZERO,
        ..Default::default()
    };
    let (mut engine, _clock, mut doc) = setup(config);

    for i in 0..4 {
        push_value(&mut engine, &mut doc, i);
    }
    assert_eq!(engine.undo_len(), 4);
}

// ── Undo/Redo Walks ────────────────────────────────────────────────────

#[test]
fn test_undo_all_then_redo_all() {
    let (mut engine, clock, mut doc) = setup(HistoryConfig::default());
    for i in 0..5 {
        clock.advance(Duration::from_secs(1));
        push_value(&mut engine, &mut doc, i);
    }

    while engine.undo(&mut doc).is_restored() {}
    assert!(doc.values.is_empty());
    assert_eq!(engine.redo_len(), 5);

    while engine.redo(&mut doc).is_restored() {}
    assert_eq!(doc.values, vec![0, 1, 2, 3, 4]);
    assert_eq!(engine.undo_len(), 5);
    assert_eq!(engine.redo(&mut doc), StepOutcome::Empty(Direction::Redo));
    assert_eq!(doc.restores, 10);
}

#[test]
fn test_undo_then_redo_is_state_neutral() {
    let (mut engine, clock, mut doc) = setup(HistoryConfig::default());
    for i in 0..3 {
        clock.advance(Duration::from_secs(1));
        push_value(&mut engine, &mut doc, i);
    }
    let before = doc.capture_state();
    let undo_before = undo_texts(&engine);

    engine.undo(&mut doc);
    engine.redo(&mut doc);

    assert_eq!(doc.capture_state(), before);
    assert_eq!(undo_texts(&engine), undo_before);
    assert_eq!(engine.redo_len(), 0);
}

#[test]
fn test_edit_after_undo_discards_redo_branch() {
    let (mut engine, clock, mut doc) = setup(HistoryConfig::default());
    for i in 0..3 {
        clock.advance(Duration::from_secs(1));
        push_value(&mut engine, &mut doc, i);
    }
    engine.undo(&mut doc);
    engine.undo(&mut doc);
    assert_eq!(engine.redo_len(), 2);

    clock.advance(Duration::from_secs(1));
    push_value(&mut engine, &mut doc, 99);
    assert_eq!(engine.redo_len(), 0);
    assert_eq!(doc.values, vec![0, 99]);

    engine.undo(&mut doc);
    assert_eq!(doc.values, vec![0]);
}

#[test]
fn test_corrupt_snapshot_is_rejected_without_losing_history() {
    let (mut engine, clock, mut doc) = setup(HistoryConfig::default());
    clock.advance(Duration::from_secs(1));
    engine.begin_burst(&doc);
    doc.values.push(1);
    engine.end_burst(&doc);

    // Simulate a host whose current state no longer parses back
    struct Broken;
    impl DocumentHost for Broken {
        fn capture_state(&self) -> StateBlob {
            StateBlob::from("broken")
        }
        fn restore_state(&mut self, _blob: &StateBlob) -> anyhow::Result<()> {
            anyhow::bail!("cannot load")
        }
    }

    assert_eq!(engine.undo(&mut Broken), StepOutcome::RestoreFailed);
    assert_eq!(engine.undo_len(), 1);
    assert_eq!(engine.redo_len(), 0);

    assert!(engine.undo(&mut doc).is_restored());
    assert!(doc.values.is_empty());
}

// ── Key Repeat ─────────────────────────────────────────────────────────

#[test]
fn test_repeat_delay_curve_endpoints() {
    assert_eq!(next_repeat_delay(0), Duration::from_millis(500));
    assert_eq!(next_repeat_delay(12), Duration::from_millis(30));
    assert!(next_repeat_delay(5) < next_repeat_delay(4));
}
