/// Bounded newest-first stacks and the undo/redo store built on them.
use std::collections::VecDeque;
use std::time::Instant;

use crate::blob::{Candidate, StateBlob};

/// Which way a history step moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Undo => f.write_str("undo"),
            Direction::Redo => f.write_str("redo"),
        }
    }
}

/// An ordered sequence of snapshots, newest first, capped at `max_size`.
///
/// Pushing past the cap evicts from the back (the oldest entry).
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<StateBlob>,
    max_size: usize,
}

impl HistoryStack {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size,
        }
    }

    /// Pushes `blob` to the front, evicting the oldest entries over the cap.
    pub fn push_front(&mut self, blob: StateBlob) {
        self.entries.push_front(blob);
        self.entries.truncate(self.max_size);
    }

    pub fn pop_front(&mut self) -> Option<StateBlob> {
        self.entries.pop_front()
    }

    pub fn front(&self) -> Option<&StateBlob> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Iterates entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &StateBlob> + '_ {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The undo and redo stacks plus the time of the last commit.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    undo: HistoryStack,
    redo: HistoryStack,
    /// When the last committed candidate was captured; `None` until the
    /// first commit.
    last_commit: Option<Instant>,
}

impl HistoryStore {
    pub fn new(max_undo_steps: usize, max_redo_steps: usize) -> Self {
        Self {
            undo: HistoryStack::new(max_undo_steps),
            redo: HistoryStack::new(max_redo_steps),
            last_commit: None,
        }
    }

    /// Commits `candidate` as a new undo step.
    ///
    /// A candidate equal to the current undo front is discarded. Otherwise
    /// it is pushed, the commit time is updated and the redo stack is
    /// cleared. Returns whether the candidate was committed.
    pub fn try_commit(&mut self, candidate: Candidate) -> bool {
        if self.undo.front() == Some(&candidate.blob) {
            tracing::trace!("Discarded candidate equal to the undo front");
            return false;
        }

        self.undo.push_front(candidate.blob);
        self.last_commit = Some(candidate.timestamp);
        self.redo.clear();
        tracing::debug!(undo_len = self.undo.len(), "Committed undo step");
        true
    }

    /// Pushes `blob` onto the stack opposite to `direction`'s source,
    /// honoring that stack's own cap.
    pub fn push_opposite(&mut self, direction: Direction, blob: StateBlob) {
        self.destination_mut(direction).push_front(blob);
    }

    /// The stack a step in `direction` pops from.
    pub fn source_mut(&mut self, direction: Direction) -> &mut HistoryStack {
        match direction {
            Direction::Undo => &mut self.undo,
            Direction::Redo => &mut self.redo,
        }
    }

    /// The stack a step in `direction` pushes the live state onto.
    pub fn destination_mut(&mut self, direction: Direction) -> &mut HistoryStack {
        match direction {
            Direction::Undo => &mut self.redo,
            Direction::Redo => &mut self.undo,
        }
    }

    pub fn undo_stack(&self) -> &HistoryStack {
        &self.undo
    }

    pub fn redo_stack(&self) -> &HistoryStack {
        &self.redo
    }

    pub fn last_commit(&self) -> Option<Instant> {
        self.last_commit
    }

    /// Moves the merge reference point forward without committing.
    pub fn touch_last_commit(&mut self, at: Instant) {
        self.last_commit = Some(at);
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.last_commit = None;
    }
}
