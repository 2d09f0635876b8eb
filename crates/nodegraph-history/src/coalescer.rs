/// Burst nesting and the pending candidate.
///
/// Hosts often fire several nested "about to change" / "changed"
/// notifications for one user action. Only the outermost pair marks an
/// undo-step boundary; the coalescer tracks the depth and reports when
/// such a boundary is crossed.
use crate::blob::Candidate;

/// Result of leaving a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstExit {
    /// Depth went 1 → 0: the outermost burst just closed.
    Outermost,
    /// Still inside an enclosing burst.
    Nested,
    /// An end arrived with no open burst; depth stays at 0.
    Unbalanced,
}

#[derive(Debug, Clone, Default)]
pub struct Coalescer {
    depth: usize,
    candidate: Option<Candidate>,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a burst. Returns `true` when this is the outermost begin.
    pub fn enter(&mut self) -> bool {
        self.depth += 1;
        self.depth == 1
    }

    /// Closes a burst.
    pub fn leave(&mut self) -> BurstExit {
        match self.depth {
            0 => BurstExit::Unbalanced,
            1 => {
                self.depth = 0;
                BurstExit::Outermost
            }
            _ => {
                self.depth -= 1;
                BurstExit::Nested
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn candidate(&self) -> Option<&Candidate> {
        self.candidate.as_ref()
    }

    /// Replaces the pending candidate.
    pub fn set_candidate(&mut self, candidate: Candidate) {
        self.candidate = Some(candidate);
    }

    pub fn clear_candidate(&mut self) {
        self.candidate = None;
    }
}
