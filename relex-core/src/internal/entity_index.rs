use crate::entity_key::EntityId;
use crate::world_result::EntityError;
use crate::world_result::EntityError::IsStale;
use crate::world_result::EntityError::NotExists;
use log::trace;

const NO_POSITION: u32 = u32::MAX;

pub const DEFAULT_VERSION_BITS: u8 = 8;

/// Generational sparse set of entity ids.
///
/// `dense[..alive_count]` holds the alive ids, `dense[alive_count..]` the freed
/// ones in recycling order. `sparse[slot]` is the position of the slot's id in
/// `dense`. Slot 0 is never handed out.
pub struct EntityIndex {
    dense: Vec<EntityId>,
    sparse: Vec<u32>,
    alive_count: usize,
    max_slot: u32,
    versioning: Option<Versioning>,
}

#[derive(Copy, Clone, Debug)]
struct Versioning {
    version_bits: u32,
    slot_bits: u32,
}

impl Versioning {
    fn slot_mask(&self) -> u32 {
        (1 << self.slot_bits) - 1
    }

    fn version_mask(&self) -> u32 {
        (1 << self.version_bits) - 1
    }
}

impl Default for EntityIndex {
    fn default() -> Self {
        EntityIndex::new()
    }
}

impl EntityIndex {
    pub fn new() -> EntityIndex {
        EntityIndex::with_capacity(0)
    }

    pub fn with_capacity(initial_capacity: usize) -> EntityIndex {
        EntityIndex {
            dense: Vec::with_capacity(initial_capacity),
            sparse: Vec::with_capacity(initial_capacity + 1),
            alive_count: 0,
            max_slot: 0,
            versioning: None,
        }
    }

    /// Ids carry a `version_bits` wide version in their high bits, the rest
    /// addresses the slot.
    ///
    /// # Panics
    /// If `version_bits` is outside `1..=16`.
    pub fn with_versioning(version_bits: u8) -> EntityIndex {
        assert!(
            (1..=16).contains(&version_bits),
            "version width must be within 1..=16 bits, got {}",
            version_bits
        );
        let version_bits = version_bits as u32;
        EntityIndex {
            versioning: Some(Versioning {
                version_bits,
                slot_bits: 32 - version_bits,
            }),
            ..EntityIndex::new()
        }
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.dense.reserve(additional);
        self.sparse.reserve(additional);
    }

    pub fn is_versioned(&self) -> bool {
        self.versioning.is_some()
    }

    #[inline]
    pub fn slot(&self, id: EntityId) -> usize {
        match self.versioning {
            None => id.0 as usize,
            Some(versioning) => (id.0 & versioning.slot_mask()) as usize,
        }
    }

    #[inline]
    pub fn version(&self, id: EntityId) -> u32 {
        match self.versioning {
            None => 0,
            Some(versioning) => (id.0 >> versioning.slot_bits) & versioning.version_mask(),
        }
    }

    fn next_version(&self, id: EntityId) -> EntityId {
        match self.versioning {
            None => id,
            Some(versioning) => {
                let version = (self.version(id) + 1) & versioning.version_mask();
                EntityId((id.0 & versioning.slot_mask()) | (version << versioning.slot_bits))
            }
        }
    }

    pub fn alloc(&mut self) -> EntityId {
        if self.alive_count < self.dense.len() {
            let recycled = self.dense[self.alive_count];
            let slot = self.slot(recycled);
            self.sparse[slot] = self.alive_count as u32;
            self.alive_count += 1;
            trace!("recycled entity id {}", recycled);
            return recycled;
        }

        self.max_slot += 1;
        if let Some(versioning) = self.versioning {
            debug_assert!(
                self.max_slot <= versioning.slot_mask(),
                "entity slot space of {} bits exhausted",
                versioning.slot_bits
            );
        }
        let id = EntityId(self.max_slot);
        let slot = self.max_slot as usize;
        if self.sparse.len() <= slot {
            self.sparse.resize(slot + 1, NO_POSITION);
        }
        self.sparse[slot] = self.alive_count as u32;
        self.dense.push(id);
        self.alive_count += 1;
        trace!("allocated entity id {}", id);
        id
    }

    /// Swap-removes `id` from the alive range. Freeing a dead id is a no-op.
    pub fn free(&mut self, id: EntityId) {
        if !self.is_alive(id) {
            return;
        }
        let slot = self.slot(id);
        let position = self.sparse[slot] as usize;
        let last_position = self.alive_count - 1;
        let last_id = self.dense[last_position];
        let last_slot = self.slot(last_id);

        self.sparse[last_slot] = position as u32;
        self.dense[position] = last_id;

        self.sparse[slot] = last_position as u32;
        self.dense[last_position] = self.next_version(id);

        self.alive_count -= 1;
        trace!("freed entity id {}", id);
    }

    #[inline]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.validate(id).is_ok()
    }

    /// Resolves `id` to its slot, telling a never-seen or freed id apart from a
    /// stale version of a recycled slot.
    pub fn validate(&self, id: EntityId) -> Result<usize, EntityError> {
        let slot = self.slot(id);
        match self.sparse.get(slot).copied() {
            Some(position) if (position as usize) < self.alive_count => {
                if self.dense[position as usize] == id {
                    Ok(slot)
                } else {
                    Err(IsStale(id))
                }
            }
            _ => Err(NotExists(id)),
        }
    }

    pub fn alive(&self) -> &[EntityId] {
        &self.dense[..self.alive_count]
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Highest slot ever handed out.
    pub fn max_slot(&self) -> usize {
        self.max_slot as usize
    }
}

#[cfg(test)]
mod tests {
    use crate::internal::entity_index::EntityIndex;
    use crate::world_result::EntityError;

    #[test]
    fn ids_start_from_one() {
        let mut index = EntityIndex::new();
        assert_eq!(index.alloc().raw(), 1);
        assert_eq!(index.alloc().raw(), 2);
    }

    #[test]
    fn freed_id_is_dead_and_recycled() {
        let mut index = EntityIndex::new();
        let a = index.alloc();
        let b = index.alloc();
        index.free(a);
        assert!(!index.is_alive(a));
        assert!(index.is_alive(b));
        assert_eq!(index.alloc(), a);
        assert!(index.is_alive(a));
    }

    #[test]
    fn free_keeps_other_ids_alive() {
        let mut index = EntityIndex::new();
        let ids = (0..5).map(|_| index.alloc()).collect::<Vec<_>>();
        index.free(ids[1]);
        index.free(ids[3]);
        assert_eq!(index.alive_count(), 3);
        for id in [ids[0], ids[2], ids[4]] {
            assert!(index.is_alive(id));
        }
        let mut alive = index.alive().to_vec();
        alive.sort();
        assert_eq!(alive, vec![ids[0], ids[2], ids[4]]);
    }

    #[test]
    fn double_free_is_noop() {
        let mut index = EntityIndex::new();
        let a = index.alloc();
        let b = index.alloc();
        index.free(a);
        index.free(a);
        assert_eq!(index.alive_count(), 1);
        assert!(index.is_alive(b));
    }

    #[test]
    fn stale_version_detected() {
        let mut index = EntityIndex::with_versioning(8);
        let a = index.alloc();
        index.free(a);
        let recycled = index.alloc();
        assert_eq!(index.slot(recycled), index.slot(a));
        assert_eq!(index.version(recycled), 1);
        assert!(index.is_alive(recycled));
        assert!(!index.is_alive(a));
        assert_eq!(index.validate(a), Err(EntityError::IsStale(a)));
    }

    #[test]
    fn version_wraps_around() {
        let mut index = EntityIndex::with_versioning(2);
        let original = index.alloc();
        let mut current = original;
        for round in 1..=4u32 {
            index.free(current);
            current = index.alloc();
            assert_eq!(index.version(current), round % 4);
            assert_eq!(index.slot(current), index.slot(original));
            if round < 4 {
                assert!(!index.is_alive(original));
            }
        }
        assert_eq!(current, original);
    }

    #[test]
    fn unknown_id_not_exists() {
        let index = EntityIndex::new();
        let id = crate::EntityId::from_raw(42);
        assert_eq!(index.validate(id), Err(EntityError::NotExists(id)));
    }
}
