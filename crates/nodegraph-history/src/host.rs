/// Collaborator interfaces between the engine and the document it tracks.

use anyhow::Result;

use crate::blob::StateBlob;

/// The document side of the history engine.
///
/// The engine never looks inside a snapshot; it only stores and compares
/// what the host hands it.
pub trait DocumentHost {
    /// Serializes the whole document.
    ///
    /// Two calls with no mutation in between must return equal blobs, and
    /// any mutation that should be undoable must change the blob.
    fn capture_state(&self) -> StateBlob;

    /// Replaces the live document with the one that produced `blob`.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be loaded. The document must be
    /// left unchanged in that case.
    fn restore_state(&mut self, blob: &StateBlob) -> Result<()>;

    /// Flags the view for redraw after a restore.
    fn mark_dirty(&mut self) {}
}

/// Receives the begin/end notifications a host fires around mutations.
///
/// Hosts register a listener instead of having their callbacks wrapped.
/// Every begin must eventually be matched by an end.
pub trait BurstListener {
    fn on_begin_burst(&mut self, host: &dyn DocumentHost);
    fn on_end_burst(&mut self, host: &dyn DocumentHost);
}
