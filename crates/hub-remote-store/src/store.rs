//! Paged, lazily-populated list model backed by server fetches.
//!
//! Presents a potentially large server-side collection as a fixed-size
//! indexable sequence. Reading an unfetched position orders the covering
//! page from a [`PageFetcher`]; arriving data is written back page by page
//! and announced on a [`ListChangeBus`]. All operations run on the owner's
//! thread; responses are expected to be delivered on that same thread.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::events::ListChangeBus;
use crate::fetch::{FetchError, PageFetcher, PageRequest};

/// Result of reading one list position.
#[derive(Debug, PartialEq, Eq)]
pub enum ListSlot<'a, T> {
    /// The item has arrived from the server.
    Item(&'a T),
    /// The item is not here yet; a fetch may have been triggered.
    Loading,
    /// The reserved synthetic first row in empty-item mode.
    Blank,
}

impl<'a, T> ListSlot<'a, T> {
    /// The contained item, or `None` for the loading/blank placeholders.
    pub fn item(&self) -> Option<&'a T> {
        match self {
            ListSlot::Item(item) => Some(item),
            _ => None,
        }
    }
}

/// Fetch lifecycle of one page-aligned offset. Absence from the state map
/// means the page has not been requested at all, so at most one state can
/// exist per page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchState {
    /// Requested before the session was ready; queued for replay.
    PendingBeforeReady,
    /// Order sent to the fetcher, response outstanding.
    Ordered,
    /// Full page (or the final partial page) content has arrived.
    Received,
}

/// Sparse, lazily-filled, mutable sequence backed by page-granular fetches.
///
/// With `empty_item` enabled, logical position 0 is a synthetic blank row
/// not backed by server data and real items are shifted down by one; fetch
/// offsets stay in server coordinates throughout.
pub struct PagedItemStore<T, F> {
    page_size: usize,
    empty_item: bool,
    count: usize,
    /// Pages keyed by page index; a slot is `None` until its item arrives.
    pages: BTreeMap<usize, Vec<Option<T>>>,
    /// One fetch state per page-aligned offset, in server coordinates.
    fetch_states: BTreeMap<usize, FetchState>,
    /// Replay stack for pages ordered before the session was ready; the
    /// most recently requested page replays first.
    pending_before_ready: Vec<usize>,
    /// While the user is actively scrolling, new fetches are deferred.
    scrolling: bool,
    /// Bumped on every clear; stale responses carry an older value.
    generation: u64,
    fetcher: F,
    changes: ListChangeBus,
}

impl<T, F: PageFetcher> PagedItemStore<T, F> {
    /// Create an empty store fetching `page_size` items at a time.
    pub fn new(page_size: usize, empty_item: bool, fetcher: F, changes: ListChangeBus) -> Self {
        assert!(page_size > 0, "page size must be positive");
        Self {
            page_size,
            empty_item,
            count: usize::from(empty_item),
            pages: BTreeMap::new(),
            fetch_states: BTreeMap::new(),
            pending_before_ready: Vec::new(),
            scrolling: false,
            generation: 0,
            fetcher,
            changes,
        }
    }

    /// Number of items currently believed to exist (including the synthetic
    /// first row in empty-item mode).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Generation tag expected on incoming responses.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read the item at `position`, ordering its page if it is missing.
    ///
    /// `position` must be below [`len`](Self::len).
    pub fn get(&mut self, position: usize) -> ListSlot<'_, T> {
        debug_assert!(
            position < self.count,
            "get({position}) out of range, count is {}",
            self.count
        );
        let page = position / self.page_size;
        let offset = position % self.page_size;
        let filled = self
            .pages
            .get(&page)
            .is_some_and(|slots| slots[offset].is_some());
        if !filled {
            let fetch_position = if self.empty_item {
                position.saturating_sub(1)
            } else {
                position
            };
            self.request_page(self.page_start(fetch_position));
            return if self.empty_item && position == 0 {
                ListSlot::Blank
            } else {
                ListSlot::Loading
            };
        }
        match self.pages.get(&page).and_then(|slots| slots[offset].as_ref()) {
            Some(item) => ListSlot::Item(item),
            None => ListSlot::Loading,
        }
    }

    /// Order the page starting at the page-aligned offset `page_start`
    /// unless it is already ordered, received, queued, or the user is
    /// scrolling. Orders rejected with [`FetchError::NotReady`] are queued
    /// for replay on [`on_source_ready`](Self::on_source_ready).
    ///
    /// Returns whether the page newly left the unfetched state.
    pub fn request_page(&mut self, page_start: usize) -> bool {
        debug_assert_eq!(
            page_start % self.page_size,
            0,
            "page start {page_start} is not aligned to page size {}",
            self.page_size
        );
        if self.scrolling || self.fetch_states.contains_key(&page_start) {
            return false;
        }
        let request = PageRequest {
            start: page_start,
            generation: self.generation,
        };
        match self.fetcher.fetch(request) {
            Ok(()) => {
                trace!(page_start, "page ordered");
                self.fetch_states.insert(page_start, FetchState::Ordered);
            }
            Err(FetchError::NotReady) => {
                trace!(page_start, "session not ready, queueing page order");
                self.fetch_states
                    .insert(page_start, FetchState::PendingBeforeReady);
                self.pending_before_ready.push(page_start);
            }
        }
        true
    }

    /// Replay page orders queued while the session was not ready, most
    /// recently requested first.
    pub fn on_source_ready(&mut self) {
        let mut replay = std::mem::take(&mut self.pending_before_ready);
        while let Some(page_start) = replay.pop() {
            self.fetch_states.remove(&page_start);
            self.request_page(page_start);
        }
    }

    /// Order every page overlapping the visible rows `[first, first +
    /// visible)`. Pass `None` when nothing is laid out yet to order the
    /// first page. Call this when scrolling settles.
    pub fn request_visible(&mut self, first: Option<usize>, visible: usize) {
        let Some(first) = first else {
            self.request_page(0);
            return;
        };
        let first = if self.empty_item {
            first.saturating_sub(1)
        } else {
            first
        };
        let end = first + visible;
        let mut page_start = self.page_start(first);
        while page_start < end {
            self.request_page(page_start);
            page_start += self.page_size;
        }
    }

    /// Accept a server response: `count` is the latest total known to the
    /// source and `items` starts at absolute position `start`, both in
    /// server coordinates. Responses tagged with a stale generation are
    /// dropped.
    pub fn receive(&mut self, generation: u64, count: usize, start: usize, items: Vec<T>) {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "dropping stale page response"
            );
            return;
        }
        let len = items.len();
        debug!(count, start, len, "received items");

        // A page may arrive in chunks; only mark it received once a chunk
        // ends on a page boundary or at the end of the collection.
        if start < count && len != 0 && ((start + len) % self.page_size == 0 || start + len == count)
        {
            self.fetch_states
                .insert(self.page_start(start), FetchState::Received);
        }

        let offset = usize::from(self.empty_item);
        let count = count + offset;
        let start = start + offset;
        let count_updated = count == 0 || count != self.count;
        if start < count && len != 0 {
            self.set_items(start, items);
        }
        if count_updated {
            self.count = count;
            self.changes.count_changed(self.count);
            self.changes.reset();
        } else {
            self.changes.range_changed(start, len);
        }
    }

    /// Insert `item` at `position`, shifting later items down one slot
    /// (across page boundaries where needed).
    pub fn insert(&mut self, position: usize, item: T) {
        assert!(
            position <= self.count,
            "insert({position}) out of range, count is {}",
            self.count
        );
        self.shift_insert(position, Some(item), self.count);
        self.count += 1;
        self.changes.count_changed(self.count);
        self.changes.inserted(position);
    }

    /// Remove the item at `position`, shifting later items up one slot.
    /// Returns the removed item, or `None` if that slot was never fetched.
    pub fn remove_at(&mut self, position: usize) -> Option<T> {
        assert!(
            position < self.count,
            "remove_at({position}) out of range, count is {}",
            self.count
        );
        let removed = self.shift_remove(position, self.count);
        self.count -= 1;
        self.changes.count_changed(self.count);
        self.changes.removed(position);
        removed
    }

    /// Move the item at `from` to `to`, keeping the relative order of
    /// everything else.
    pub fn move_item(&mut self, from: usize, to: usize) {
        assert!(
            from < self.count && to < self.count,
            "move_item({from}, {to}) out of range, count is {}",
            self.count
        );
        if from == to {
            return;
        }
        let item = self.shift_remove(from, self.count);
        self.shift_insert(to, item, self.count - 1);
        self.changes.moved(from, to);
    }

    /// Drop all items and fetch bookkeeping. Bumps the generation so that
    /// in-flight responses for the old contents are discarded on arrival.
    pub fn clear(&mut self) {
        self.count = usize::from(self.empty_item);
        self.pages.clear();
        self.fetch_states.clear();
        self.pending_before_ready.clear();
        self.generation += 1;
        self.changes.reset();
    }

    /// Clear and immediately order the first page again. Used when the
    /// underlying collection is invalidated (active player changed,
    /// explicit refresh).
    pub fn clear_and_refetch(&mut self) {
        self.clear();
        self.request_page(0);
    }

    /// Forget outstanding orders so their pages can be ordered again, e.g.
    /// after the owning view resumes. Received pages and the not-ready
    /// replay queue are untouched.
    pub fn cancel_orders(&mut self) {
        self.fetch_states
            .retain(|_, state| *state != FetchState::Ordered);
    }

    /// While active, new page orders are deferred (not cancelled) to avoid
    /// flooding the source during flings. The owner should call
    /// [`request_visible`](Self::request_visible) once scrolling settles.
    pub fn set_scrolling(&mut self, active: bool) {
        self.scrolling = active;
    }

    fn page_start(&self, position: usize) -> usize {
        position / self.page_size * self.page_size
    }

    fn set_items(&mut self, start: usize, items: Vec<T>) {
        let mut position = start;
        for item in items {
            self.put_slot(position, Some(item));
            position += 1;
        }
    }

    fn take_slot(&mut self, position: usize) -> Option<T> {
        let page = position / self.page_size;
        let offset = position % self.page_size;
        self.pages
            .get_mut(&page)
            .and_then(|slots| slots[offset].take())
    }

    fn put_slot(&mut self, position: usize, item: Option<T>) {
        let page = position / self.page_size;
        let offset = position % self.page_size;
        // Writing an empty slot into a page that was never allocated is a
        // no-op; absent pages already read as all-unfetched.
        if item.is_none() && !self.pages.contains_key(&page) {
            return;
        }
        let page_size = self.page_size;
        let slots = self.pages.entry(page).or_insert_with(|| {
            let mut slots = Vec::new();
            slots.resize_with(page_size, || None);
            slots
        });
        slots[offset] = item;
    }

    /// Remove the slot at `position` from the logical range `[0, len)`,
    /// sliding everything behind it one slot up across page boundaries.
    fn shift_remove(&mut self, position: usize, len: usize) -> Option<T> {
        let removed = self.take_slot(position);
        for pos in position + 1..len {
            let item = self.take_slot(pos);
            self.put_slot(pos - 1, item);
        }
        removed
    }

    /// Insert `item` at `position` in the logical range `[0, len)`, sliding
    /// `[position, len)` one slot down across page boundaries.
    fn shift_insert(&mut self, position: usize, item: Option<T>, len: usize) {
        let mut pos = len;
        while pos > position {
            let moved = self.take_slot(pos - 1);
            self.put_slot(pos, moved);
            pos -= 1;
        }
        self.put_slot(position, item);
    }
}
