// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change sets returned from [`ElementTree::flush`](crate::ElementTree::flush).
//!
//! A non-empty change set is always framed as `FlushBegin`, then every `Insert`, every `Remove`,
//! every `Update`, every `Dirty`, then `FlushEnd`. Each element appears in at most one of the
//! middle groups. A flush with nothing to report yields an empty set.

use alloc::vec::Vec;

use crate::types::ElementId;

/// One record of a flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlushItem {
    /// Start of a non-empty batch.
    FlushBegin,
    /// Element became attached.
    Insert(ElementId),
    /// Element became detached (or was destroyed after being reported attached).
    Remove(ElementId),
    /// Element's own properties changed.
    Update(ElementId),
    /// Element's derived geometry changed because of other mutations.
    Dirty(ElementId),
    /// End of a non-empty batch.
    FlushEnd,
}

/// Observer of flush batches.
pub trait TreeListener {
    /// A batch starts.
    fn flush_begin(&mut self) {}
    /// An element became attached.
    fn insert(&mut self, id: ElementId) {
        let _ = id;
    }
    /// An element became detached.
    fn remove(&mut self, id: ElementId) {
        let _ = id;
    }
    /// An element's own properties changed.
    fn update(&mut self, id: ElementId) {
        let _ = id;
    }
    /// An element's derived geometry changed.
    fn dirty(&mut self, id: ElementId) {
        let _ = id;
    }
    /// A batch ends.
    fn flush_end(&mut self) {}
}

/// The ordered diff produced by one flush.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    items: Vec<FlushItem>,
}

impl ChangeSet {
    pub(crate) fn from_groups(
        inserted: Vec<ElementId>,
        removed: Vec<ElementId>,
        updated: Vec<ElementId>,
        dirty: Vec<ElementId>,
    ) -> Self {
        let total = inserted.len() + removed.len() + updated.len() + dirty.len();
        if total == 0 {
            return Self::default();
        }
        let mut items = Vec::with_capacity(total + 2);
        items.push(FlushItem::FlushBegin);
        items.extend(inserted.into_iter().map(FlushItem::Insert));
        items.extend(removed.into_iter().map(FlushItem::Remove));
        items.extend(updated.into_iter().map(FlushItem::Update));
        items.extend(dirty.into_iter().map(FlushItem::Dirty));
        items.push(FlushItem::FlushEnd);
        Self { items }
    }

    /// All records in order.
    pub fn items(&self) -> &[FlushItem] {
        &self.items
    }

    /// True when the flush had nothing to report.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements reported as inserted.
    pub fn inserted(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.items.iter().filter_map(|item| match item {
            FlushItem::Insert(id) => Some(*id),
            _ => None,
        })
    }

    /// Elements reported as removed.
    pub fn removed(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.items.iter().filter_map(|item| match item {
            FlushItem::Remove(id) => Some(*id),
            _ => None,
        })
    }

    /// Elements reported as updated.
    pub fn updated(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.items.iter().filter_map(|item| match item {
            FlushItem::Update(id) => Some(*id),
            _ => None,
        })
    }

    /// Elements reported as dirty.
    pub fn dirty(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.items.iter().filter_map(|item| match item {
            FlushItem::Dirty(id) => Some(*id),
            _ => None,
        })
    }

    /// Replay the records into a listener.
    pub fn dispatch(&self, listener: &mut dyn TreeListener) {
        for item in &self.items {
            match *item {
                FlushItem::FlushBegin => listener.flush_begin(),
                FlushItem::Insert(id) => listener.insert(id),
                FlushItem::Remove(id) => listener.remove(id),
                FlushItem::Update(id) => listener.update(id),
                FlushItem::Dirty(id) => listener.dirty(id),
                FlushItem::FlushEnd => listener.flush_end(),
            }
        }
    }
}
