use crate::component::ComponentId;
use std::collections::HashMap;

/// Per-slot list of the components an entity carries.
///
/// Rows grow independently, so one entity with thousands of pairs costs
/// nothing to the others. `positions` locates a component inside its row for
/// constant-time removal.
pub(crate) struct EntityComponentIndex {
    rows: Vec<Vec<ComponentId>>,
    positions: HashMap<(usize, ComponentId), usize>,
}

impl EntityComponentIndex {
    pub(crate) fn new(initial_capacity: usize) -> Self {
        EntityComponentIndex {
            rows: Vec::with_capacity(initial_capacity),
            positions: HashMap::new(),
        }
    }

    fn ensure_slot(&mut self, slot: usize) {
        if slot >= self.rows.len() {
            self.rows.resize_with(slot + 1, Vec::new);
        }
    }

    /// Returns `false` when the slot already lists the component.
    pub(crate) fn add(&mut self, slot: usize, component: ComponentId) -> bool {
        self.ensure_slot(slot);
        if self.contains(slot, component) {
            return false;
        }
        let row = &mut self.rows[slot];
        self.positions.insert((slot, component), row.len());
        row.push(component);
        true
    }

    pub(crate) fn remove(&mut self, slot: usize, component: ComponentId) -> bool {
        let Some(i) = self.positions.remove(&(slot, component)) else {
            return false;
        };
        let row = &mut self.rows[slot];
        row.swap_remove(i);
        if let Some(moved) = row.get(i) {
            self.positions.insert((slot, *moved), i);
        }
        true
    }

    pub(crate) fn get(&self, slot: usize) -> &[ComponentId] {
        match self.rows.get(slot) {
            None => &[],
            Some(row) => row,
        }
    }

    pub(crate) fn contains(&self, slot: usize, component: ComponentId) -> bool {
        self.positions.contains_key(&(slot, component))
    }

    pub(crate) fn clear(&mut self, slot: usize) {
        self.ensure_slot(slot);
        for component in self.rows[slot].drain(..) {
            self.positions.remove(&(slot, component));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::component::ComponentId;
    use crate::internal::entity_component_index::EntityComponentIndex;
    use crate::internal::entity_index::EntityIndex;

    #[test]
    fn three_components_added_and_read() {
        let mut entities = EntityIndex::new();
        let mut components = EntityComponentIndex::new(512);
        let e1 = entities.alloc();
        let slot = entities.slot(e1);
        components.clear(slot);
        components.add(slot, ComponentId(11));
        components.add(slot, ComponentId(12));
        components.add(slot, ComponentId(13));

        assert_eq!(
            components.get(slot),
            &[ComponentId(11), ComponentId(12), ComponentId(13)]
        )
    }

    #[test]
    fn rows_grow_independently() {
        let mut components = EntityComponentIndex::new(2);
        components.add(1, ComponentId(1));
        for id in 0..5 {
            components.add(9, ComponentId(100 + id));
        }
        assert_eq!(components.get(1), &[ComponentId(1)]);
        assert_eq!(components.get(9).len(), 5);
        assert!(components.contains(9, ComponentId(104)));
        assert!(!components.contains(1, ComponentId(104)));
        assert!(components.get(4).is_empty());
    }

    #[test]
    fn removed_component_replaced_by_last() {
        let mut components = EntityComponentIndex::new(4);
        for id in 1..=3 {
            components.add(2, ComponentId(id));
        }
        assert!(components.remove(2, ComponentId(1)));
        assert!(!components.remove(2, ComponentId(1)));
        assert_eq!(components.get(2), &[ComponentId(3), ComponentId(2)]);
        assert!(components.remove(2, ComponentId(3)));
        assert_eq!(components.get(2), &[ComponentId(2)]);
    }

    #[test]
    fn duplicate_add_ignored() {
        let mut components = EntityComponentIndex::new(4);
        assert!(components.add(3, ComponentId(5)));
        assert!(!components.add(3, ComponentId(5)));
        assert_eq!(components.get(3).len(), 1);
    }

    #[test]
    fn clear_forgets_positions() {
        let mut components = EntityComponentIndex::new(4);
        components.add(3, ComponentId(5));
        components.clear(3);
        assert!(!components.contains(3, ComponentId(5)));
        assert!(components.add(3, ComponentId(5)));
    }

    #[test]
    fn thousands_on_one_slot() {
        let mut components = EntityComponentIndex::new(4);
        for id in 0..5000 {
            assert!(components.add(1, ComponentId(id)));
        }
        for id in (0..5000).step_by(2) {
            assert!(components.remove(1, ComponentId(id)));
        }
        assert_eq!(components.get(1).len(), 2500);
        assert!(components.get(1).iter().all(|it| it.0 % 2 == 1));
        assert!(components.contains(1, ComponentId(4999)));
    }
}
