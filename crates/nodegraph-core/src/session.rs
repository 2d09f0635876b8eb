//! An editing session: one graph document plus its history.
//!
//! Every mutating operation is bracketed with begin/end burst
//! notifications through the [`BurstListener`] hook. Compound edits open
//! an inner burst per element, so the engine sees the nesting a real
//! canvas produces (e.g. one drag moving several nodes) and still records
//! one undo step.

use anyhow::{Context, Result};
use nodegraph_config::AppConfig;

use crate::graph::{Graph, NodeId};
use crate::history::{
    BurstListener, Clock, HistoryConfig, HistoryEngine, RepeatCurve, StepOutcome, SystemClock,
};
use crate::shortcuts::{Command, KeyCombo, KeyRepeatTracker, Keymap, Platform};

/// Runs `edit` inside a begin/end burst on `listener`.
///
/// The end is always delivered, even when `edit` fails.
fn bracketed<L: BurstListener + ?Sized, T>(
    listener: &mut L,
    graph: &mut Graph,
    edit: impl FnOnce(&mut L, &mut Graph) -> T,
) -> T {
    listener.on_begin_burst(&*graph);
    let out = edit(&mut *listener, &mut *graph);
    listener.on_end_burst(&*graph);
    out
}

pub struct EditorSession<C: Clock + Clone = SystemClock> {
    graph: Graph,
    history: HistoryEngine<C>,
    keymap: Keymap,
    repeat: KeyRepeatTracker,
    clock: C,
}

impl<C: Clock + Clone> std::fmt::Debug for EditorSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("nodes", &self.graph.nodes().len())
            .field("links", &self.graph.links().len())
            .field("history", &self.history)
            .field("repeat", &self.repeat)
            .finish()
    }
}

impl EditorSession<SystemClock> {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + Clone> EditorSession<C> {
    /// Creates a session on an empty graph reading time from `clock`.
    pub fn with_clock(config: &AppConfig, clock: C) -> Self {
        Self {
            graph: Graph::new(),
            history: HistoryEngine::with_clock(HistoryConfig::from(config), clock.clone()),
            keymap: Keymap::for_platform(Platform::from_setting(&config.platform)),
            repeat: KeyRepeatTracker::new(RepeatCurve::from(&config.key_repeat)),
            clock,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access for hosts that redraw; mutations made through this
    /// bypass history.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn history(&self) -> &HistoryEngine<C> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryEngine<C> {
        &mut self.history
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn key_repeat(&self) -> &KeyRepeatTracker {
        &self.repeat
    }

    pub fn add_node(&mut self, kind: &str, pos: [f32; 2]) -> Result<NodeId> {
        bracketed(&mut self.history, &mut self.graph, |_, graph| {
            graph.add_node(kind, pos)
        })
    }

    pub fn move_node(&mut self, id: NodeId, delta: [f32; 2]) -> Result<()> {
        bracketed(&mut self.history, &mut self.graph, |_, graph| {
            graph.move_node(id, delta)
        })
    }

    /// Moves several nodes as one gesture.
    ///
    /// # Errors
    ///
    /// Returns an error, without moving anything, if any id is unknown.
    pub fn drag(&mut self, ids: &[NodeId], delta: [f32; 2]) -> Result<()> {
        for &id in ids {
            self.graph
                .node(id)
                .with_context(|| format!("Cannot drag unknown node {id}"))?;
        }
        bracketed(&mut self.history, &mut self.graph, |listener, graph| {
            ids.iter().try_for_each(|&id| {
                bracketed(&mut *listener, &mut *graph, |_, graph| {
                    graph.move_node(id, delta)
                })
            })
        })
    }

    pub fn rename_node(&mut self, id: NodeId, title: &str) -> Result<()> {
        bracketed(&mut self.history, &mut self.graph, |_, graph| {
            graph.rename_node(id, title)
        })
    }

    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        bracketed(&mut self.history, &mut self.graph, |_, graph| {
            graph.connect(from, to)
        })
    }

    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        bracketed(&mut self.history, &mut self.graph, |_, graph| {
            graph.disconnect(from, to)
        })
    }

    /// Removes a node and every link touching it as one undo step.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if self.graph.node(id).is_none() {
            anyhow::bail!("Cannot remove unknown node {id}");
        }
        bracketed(&mut self.history, &mut self.graph, |listener, graph| {
            for link in graph.links_of(id) {
                bracketed(&mut *listener, &mut *graph, |_, graph| {
                    graph.disconnect(link.from, link.to)
                })?;
            }
            graph.remove_node(id).map(|_| ())
        })
    }

    pub fn undo(&mut self) -> StepOutcome {
        self.history.undo(&mut self.graph)
    }

    pub fn redo(&mut self) -> StepOutcome {
        self.history.redo(&mut self.graph)
    }

    /// Replaces the document with an unrelated one and drops all history.
    pub fn load_document(&mut self, graph: Graph) {
        self.history.pause();
        self.graph = graph;
        self.graph.mark_dirty();
        self.history.reset();
        self.history.resume();
        tracing::debug!(nodes = self.graph.nodes().len(), "Loaded document");
    }

    /// Handles a key-down; returns the command that ran, if any.
    pub fn key_down(&mut self, combo: &KeyCombo) -> Option<(Command, StepOutcome)> {
        let now = self.clock.now();
        if !self.repeat.accept(&combo.key, now) {
            return None;
        }
        let command = self.keymap.lookup(combo)?;
        let outcome = self.run(command);
        self.repeat.fired(&combo.key, now);
        Some((command, outcome))
    }

    pub fn key_up(&mut self, key: &str) {
        self.repeat.release(&key.to_lowercase());
    }

    pub fn run(&mut self, command: Command) -> StepOutcome {
        let outcome = match command {
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
        };
        tracing::trace!(?outcome, "Ran {command}");
        outcome
    }
}
