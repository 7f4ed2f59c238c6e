use crate::entity_key::EntityId;
use std::rc::Rc;

const ABSENT: u32 = u32::MAX;

/// Slot-keyed set of entity ids.
///
/// The dense half is shared copy-on-write: [`SparseSet::snapshot`] only bumps a
/// reference count, and the next mutation clones the ids only while some
/// snapshot is still held.
#[derive(Default)]
pub(crate) struct SparseSet {
    dense: Rc<Vec<EntityId>>,
    slots: Vec<u32>,
    sparse: Vec<u32>,
}

impl SparseSet {
    #[inline]
    pub(crate) fn get(&self, slot: usize) -> Option<EntityId> {
        match self.sparse.get(slot).copied() {
            None | Some(ABSENT) => None,
            Some(position) => self.dense.get(position as usize).copied(),
        }
    }

    #[inline]
    pub(crate) fn contains(&self, entity: EntityId, slot: usize) -> bool {
        self.get(slot) == Some(entity)
    }

    /// Stores `entity` under `slot`, overwriting whatever id the slot held.
    pub(crate) fn insert(&mut self, entity: EntityId, slot: usize) {
        if self.sparse.len() <= slot {
            self.sparse.resize(slot + 1, ABSENT);
        }
        let dense = Rc::make_mut(&mut self.dense);
        match self.sparse[slot] {
            ABSENT => {
                self.sparse[slot] = dense.len() as u32;
                dense.push(entity);
                self.slots.push(slot as u32);
            }
            position => dense[position as usize] = entity,
        }
    }

    pub(crate) fn remove(&mut self, slot: usize) -> Option<EntityId> {
        let position = match self.sparse.get(slot).copied() {
            None | Some(ABSENT) => return None,
            Some(position) => position as usize,
        };
        let dense = Rc::make_mut(&mut self.dense);
        let removed = dense.swap_remove(position);
        self.slots.swap_remove(position);
        if let Some(&moved_slot) = self.slots.get(position) {
            self.sparse[moved_slot as usize] = position as u32;
        }
        self.sparse[slot] = ABSENT;
        Some(removed)
    }

    pub(crate) fn slots(&self) -> &[u32] {
        &self.slots
    }

    pub(crate) fn clear(&mut self) {
        for &slot in &self.slots {
            self.sparse[slot as usize] = ABSENT;
        }
        self.slots.clear();
        Rc::make_mut(&mut self.dense).clear();
    }

    pub(crate) fn snapshot(&self) -> Rc<Vec<EntityId>> {
        self.dense.clone()
    }
}
