/// Snapshot-based undo/redo history for a serializable document.
///
/// The host brackets every mutation with begin/end burst notifications.
/// The engine decides which bursts form one undo step, stores whole-document
/// snapshots in bounded undo/redo stacks, and swaps them back on undo/redo.
/// History lives in memory only, for the length of one document session.
pub mod blob;
pub mod clock;
pub mod coalescer;
pub mod config;
pub mod engine;
pub mod host;
pub mod repeat;
pub mod stack;

pub use blob::{Candidate, StateBlob};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::HistoryConfig;
pub use engine::{HistoryEngine, StepOutcome};
pub use host::{BurstListener, DocumentHost};
pub use repeat::{next_repeat_delay, RepeatCurve};
pub use stack::{Direction, HistoryStack, HistoryStore};
