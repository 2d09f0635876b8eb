//! Reference host for the history engine: a node-graph document, an
//! editing session that feeds the engine, and undo/redo shortcut routing.
pub mod graph;
pub mod history;
pub mod session;
pub mod shortcuts;

pub use graph::{Graph, Link, Node, NodeId};
pub use session::EditorSession;
pub use shortcuts::{normalize_combination, Command, KeyCombo, KeyRepeatTracker, Keymap, Platform};
