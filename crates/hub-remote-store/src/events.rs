//! Structural change notifications for the paged list model.
//!
//! Changes are precise enough for an incremental presentation layer to avoid
//! a full rebind (and the attendant loss of scroll position) on simple fills.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Structural changes published by [`crate::store::PagedItemStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListChange {
    /// Anything may have changed; rebind the whole list.
    Reset,
    /// Items in `[start, start + len)` changed in place.
    RangeChanged { start: usize, len: usize },
    /// A single item was inserted at `position`.
    Inserted { position: usize },
    /// The item at `position` was removed.
    Removed { position: usize },
    /// The item at `from` now lives at `to`.
    Moved { from: usize, to: usize },
    /// The total item count is now `count`.
    CountChanged { count: usize },
}

/// Publish side of the list change stream.
#[derive(Clone)]
pub struct ListChangeBus {
    sender: Sender<ListChange>,
}

impl ListChangeBus {
    /// Create a bus plus the receiver the presentation layer drains.
    pub fn new() -> (Self, Receiver<ListChange>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }

    pub(crate) fn reset(&self) {
        let _ = self.sender.send(ListChange::Reset);
    }

    pub(crate) fn range_changed(&self, start: usize, len: usize) {
        let _ = self.sender.send(ListChange::RangeChanged { start, len });
    }

    pub(crate) fn inserted(&self, position: usize) {
        let _ = self.sender.send(ListChange::Inserted { position });
    }

    pub(crate) fn removed(&self, position: usize) {
        let _ = self.sender.send(ListChange::Removed { position });
    }

    pub(crate) fn moved(&self, from: usize, to: usize) {
        let _ = self.sender.send(ListChange::Moved { from, to });
    }

    pub(crate) fn count_changed(&self, count: usize) {
        let _ = self.sender.send(ListChange::CountChanged { count });
    }
}
