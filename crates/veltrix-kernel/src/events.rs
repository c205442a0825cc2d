//! Change notifications for presenters.
//!
//! After every successful mutation the session broadcasts one
//! [`VfsEvent::Changed`] followed by [`VfsEvent::RecomputeScheduled`].
//! Buffered edits written back on the way into another operation do not
//! get a `Changed` of their own.
//! Presenters re-render from the session state on `Changed`; the preview
//! consumer can show a "recomposing" hint on `RecomputeScheduled`.

use tokio::sync::broadcast;
use veltrix_types::EntryId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The session opened (fresh or seeded state).
    Loaded { seeded: bool },
    Created(EntryId),
    Deleted(EntryId),
    Duplicated { source: EntryId, copy: EntryId },
    Renamed(EntryId),
    Imported(EntryId),
    ContentEdited(EntryId),
    /// The active selection moved (possibly to nothing).
    Selected(Option<EntryId>),
    TabClosed(EntryId),
    /// The whole tree was replaced by seed data.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VfsEvent {
    Changed(Change),
    RecomputeScheduled,
}

/// Sending half of the event channel.
///
/// Sending with no subscribers is fine; events are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VfsEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VfsEvent> {
        self.tx.subscribe()
    }

    pub fn changed(&self, change: Change) {
        // Explicitly ignored: no subscribers is not an error
        let _ = self.tx.send(VfsEvent::Changed(change));
    }

    pub fn recompute_scheduled(&self) {
        let _ = self.tx.send(VfsEvent::RecomputeScheduled);
    }
}
