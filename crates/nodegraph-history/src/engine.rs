/// Snapshot-based undo/redo engine for a single document session.
///
/// The host brackets every mutation with `begin_burst` / `end_burst`. At
/// the outermost begin the engine captures a candidate snapshot; at the
/// outermost end it commits that candidate if the document actually
/// changed. Undo and redo swap whole snapshots between the two stacks.
use crate::blob::{Candidate, StateBlob};
use crate::clock::{Clock, SystemClock};
use crate::coalescer::{BurstExit, Coalescer};
use crate::config::HistoryConfig;
use crate::host::{BurstListener, DocumentHost};
use crate::stack::{Direction, HistoryStack, HistoryStore};

/// What an undo or redo request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A snapshot was restored.
    Restored,
    /// The source stack was empty; nothing changed.
    Empty(Direction),
    /// The engine is paused; nothing changed.
    Disabled,
    /// The host rejected the snapshot; both stacks were left as they were.
    RestoreFailed,
}

impl StepOutcome {
    pub fn is_restored(self) -> bool {
        self == StepOutcome::Restored
    }
}

/// Manages undo/redo history for one document.
pub struct HistoryEngine<C: Clock = SystemClock> {
    store: HistoryStore,
    coalescer: Coalescer,
    config: HistoryConfig,
    clock: C,
    /// Global gate; when false, bursts never capture or commit.
    enabled: bool,
    /// Set while a snapshot is being restored so the restore itself is
    /// never captured as a user edit.
    restoring: bool,
}

impl<C: Clock> std::fmt::Debug for HistoryEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEngine")
            .field("undo_len", &self.store.undo_stack().len())
            .field("redo_len", &self.store.redo_stack().len())
            .field("depth", &self.coalescer.depth())
            .field("has_candidate", &self.coalescer.candidate().is_some())
            .field("enabled", &self.enabled)
            .field("restoring", &self.restoring)
            .finish()
    }
}

impl HistoryEngine<SystemClock> {
    /// Creates an engine reading wall-clock time.
    pub fn new(config: HistoryConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for HistoryEngine<SystemClock> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<C: Clock> HistoryEngine<C> {
    pub fn with_clock(config: HistoryConfig, clock: C) -> Self {
        Self {
            store: HistoryStore::new(config.max_undo_steps, config.max_redo_steps),
            coalescer: Coalescer::new(),
            config,
            clock,
            enabled: true,
            restoring: false,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Called before a mutation.
    ///
    /// Only the outermost begin does anything: if the last commit was less
    /// than the merge threshold ago, this burst is folded into it and the
    /// merge window slides forward. Otherwise the current document becomes
    /// the candidate.
    pub fn begin_burst<H: DocumentHost + ?Sized>(&mut self, host: &H) {
        if !self.coalescer.enter() || !self.capturing() {
            return;
        }

        let now = self.clock.now();
        if let Some(last) = self.store.last_commit() {
            if now.saturating_duration_since(last) < self.config.merge_threshold {
                self.store.touch_last_commit(now);
                tracing::trace!("Burst merged into previous undo step");
                return;
            }
        }

        self.coalescer.set_candidate(Candidate {
            blob: host.capture_state(),
            timestamp: now,
        });
    }

    /// Called after a mutation.
    ///
    /// When the outermost burst closes and the document differs from the
    /// candidate, the candidate is committed as an undo step.
    pub fn end_burst<H: DocumentHost + ?Sized>(&mut self, host: &H) {
        match self.coalescer.leave() {
            BurstExit::Outermost => {}
            BurstExit::Nested => return,
            BurstExit::Unbalanced => {
                tracing::warn!("end_burst without a matching begin_burst; ignored");
                return;
            }
        }
        if !self.capturing() {
            return;
        }
        let Some(candidate) = self.coalescer.candidate() else {
            return;
        };

        if host.capture_state() == candidate.blob {
            tracing::trace!("Burst produced no net change");
            return;
        }
        let candidate = candidate.clone();
        self.store.try_commit(candidate);
    }

    /// Restores the previous snapshot. See [`HistoryEngine::step`].
    pub fn undo<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> StepOutcome {
        self.step(host, Direction::Undo)
    }

    /// Restores the most recently undone snapshot. See [`HistoryEngine::step`].
    pub fn redo<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> StepOutcome {
        self.step(host, Direction::Redo)
    }

    /// Moves one step in `direction`.
    ///
    /// Pops the source stack, pushes the live document onto the opposite
    /// stack, loads the popped snapshot into the host and re-arms the
    /// candidate from the restored document.
    pub fn step<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        direction: Direction,
    ) -> StepOutcome {
        if !self.enabled {
            tracing::debug!("History is paused; ignoring {direction}");
            return StepOutcome::Disabled;
        }
        if self.store.source_mut(direction).is_empty() {
            tracing::info!("Nothing to {direction}");
            return StepOutcome::Empty(direction);
        }

        self.restoring = true;
        let outcome = self.transfer(host, direction);
        self.restoring = false;
        outcome
    }

    fn transfer<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        direction: Direction,
    ) -> StepOutcome {
        let Some(restored) = self.store.source_mut(direction).pop_front() else {
            return StepOutcome::Empty(direction);
        };
        let current = host.capture_state();

        if let Err(e) = host.restore_state(&restored) {
            tracing::warn!("Failed to {direction}: {e:#}");
            self.store.source_mut(direction).push_front(restored);
            return StepOutcome::RestoreFailed;
        }

        self.store.push_opposite(direction, current);
        host.mark_dirty();
        self.rearm(host);

        tracing::debug!(
            undo_len = self.store.undo_stack().len(),
            redo_len = self.store.redo_stack().len(),
            "Applied {direction}"
        );
        StepOutcome::Restored
    }

    /// Captures a fresh candidate so the next edit is compared against
    /// the restored document.
    fn rearm<H: DocumentHost + ?Sized>(&mut self, host: &H) {
        self.coalescer.set_candidate(Candidate {
            blob: host.capture_state(),
            timestamp: self.clock.now(),
        });
    }

    fn capturing(&self) -> bool {
        self.enabled && !self.restoring
    }

    /// Clears both stacks and the candidate, e.g. when an unrelated
    /// document is loaded. Burst depth is kept so in-flight pairs still
    /// balance.
    pub fn reset(&mut self) {
        self.store.clear();
        self.coalescer.clear_candidate();
    }

    /// Stops capturing, committing and stepping until [`Self::resume`].
    pub fn pause(&mut self) {
        self.enabled = false;
    }

    pub fn resume(&mut self) {
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a burst is currently open.
    pub fn is_mid_burst(&self) -> bool {
        self.coalescer.depth() > 0
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn can_undo(&self) -> bool {
        self.enabled && !self.store.undo_stack().is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.enabled && !self.store.redo_stack().is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.store.undo_stack().len()
    }

    pub fn redo_len(&self) -> usize {
        self.store.redo_stack().len()
    }

    /// Undo snapshots, newest first.
    pub fn undo_stack(&self) -> &HistoryStack {
        self.store.undo_stack()
    }

    /// Redo snapshots, newest first.
    pub fn redo_stack(&self) -> &HistoryStack {
        self.store.redo_stack()
    }

    pub fn candidate(&self) -> Option<&StateBlob> {
        self.coalescer.candidate().map(|c| &c.blob)
    }
}

impl<C: Clock> BurstListener for HistoryEngine<C> {
    fn on_begin_burst(&mut self, host: &dyn DocumentHost) {
        self.begin_burst(host);
    }

    fn on_end_burst(&mut self, host: &dyn DocumentHost) {
        self.end_burst(host);
    }
}
