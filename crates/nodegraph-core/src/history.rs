// Re-exports from nodegraph-history and the document-host bridge.
// Lets the engine snapshot and restore a `Graph` as JSON text.
pub use nodegraph_history::{
    next_repeat_delay, BurstListener, Clock, Direction, DocumentHost, HistoryConfig,
    HistoryEngine, ManualClock, RepeatCurve, StateBlob, StepOutcome, SystemClock,
};

use anyhow::Result;

use crate::graph::Graph;

impl DocumentHost for Graph {
    fn capture_state(&self) -> StateBlob {
        match self.to_json() {
            Ok(json) => StateBlob::from(json),
            Err(e) => {
                // Unreachable for well-formed graphs; an empty snapshot
                // still compares unequal to any real one.
                tracing::error!("{e:#}");
                StateBlob::from("")
            }
        }
    }

    fn restore_state(&mut self, blob: &StateBlob) -> Result<()> {
        let restored = Graph::from_json(blob.as_str())?;
        *self = restored;
        Ok(())
    }

    fn mark_dirty(&mut self) {
        Graph::mark_dirty(self);
    }
}
