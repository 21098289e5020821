use std::collections::HashSet;

use crate::apis::PaperId;

/// Paper ids queued for bulk download, kept in first-selected order.
///
/// Ids are never pruned when the listing changes; a selection made under one
/// filter survives into the next.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    order: Vec<PaperId>,
    members: HashSet<PaperId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, id: PaperId) -> bool {
        if self.members.remove(&id) {
            self.order.retain(|&x| x != id);
            false
        } else {
            self.insert(id);
            true
        }
    }

    pub fn insert(&mut self, id: PaperId) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn extend<I: IntoIterator<Item = PaperId>>(&mut self, ids: I) {
        for id in ids {
            self.insert(id);
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn contains(&self, id: PaperId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[PaperId] {
        &self.order
    }
}
