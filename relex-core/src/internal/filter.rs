use crate::component::ComponentId;
use crate::entity_key::EntityId;
use crate::filter::filter_desc::QuerySignature;
use crate::filter::QueryResult;
use crate::internal::component_registry::ComponentRegistry;
use crate::internal::entity_masks::EntityMasks;
use crate::internal::filter_manager::QueryKey;
use crate::utils::observable::EntityCallback;
use crate::utils::observable::Observable;
use crate::utils::sparse_set::SparseSet;
use tinyvec::TinyVec;

/// Bits of one generation row that a clause looks at.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub(crate) struct GenerationMask {
    pub(crate) generation: usize,
    pub(crate) mask: u32,
}

pub(crate) type GenerationMasks = TinyVec<[GenerationMask; 2]>;

pub(crate) struct Query {
    pub(crate) key: QueryKey,
    pub(crate) signature: QuerySignature,
    and_masks: GenerationMasks,
    not_masks: GenerationMasks,
    or_masks: Vec<GenerationMasks>,
    accepts_prefabs: bool,
    matched: SparseSet,
    to_remove: SparseSet,
    pub(crate) add_observable: Observable<EntityCallback>,
    pub(crate) remove_observable: Observable<EntityCallback>,
}

fn fold_masks(components: &[ComponentId], registry: &ComponentRegistry) -> GenerationMasks {
    let mut masks = GenerationMasks::default();
    for component in components {
        let data = registry.get(*component);
        match masks
            .iter_mut()
            .find(|it| it.generation == data.generation())
        {
            Some(existing) => existing.mask |= data.bitflag(),
            None => masks.push(GenerationMask {
                generation: data.generation(),
                mask: data.bitflag(),
            }),
        }
    }
    masks
}

impl Query {
    pub(crate) fn new(
        key: QueryKey,
        signature: QuerySignature,
        registry: &ComponentRegistry,
        prefab: ComponentId,
    ) -> Query {
        let accepts_prefabs = signature.all.contains(&prefab)
            || signature.any.iter().any(|group| group.contains(&prefab));
        Query {
            key,
            and_masks: fold_masks(&signature.all, registry),
            not_masks: fold_masks(&signature.none, registry),
            or_masks: signature
                .any
                .iter()
                .map(|group| fold_masks(group, registry))
                .collect(),
            signature,
            accepts_prefabs,
            matched: SparseSet::default(),
            to_remove: SparseSet::default(),
            add_observable: Observable::default(),
            remove_observable: Observable::default(),
        }
    }

    /// Prefabs only match queries that name the prefab marker themselves.
    pub(crate) fn matches(&self, masks: &EntityMasks, slot: usize, is_prefab: bool) -> bool {
        if is_prefab && !self.accepts_prefabs {
            return false;
        }
        for it in &self.not_masks {
            if masks.get(it.generation, slot) & it.mask != 0 {
                return false;
            }
        }
        for it in &self.and_masks {
            if masks.get(it.generation, slot) & it.mask != it.mask {
                return false;
            }
        }
        self.or_masks.iter().all(|group| {
            group
                .iter()
                .any(|it| masks.get(it.generation, slot) & it.mask != 0)
        })
    }

    /// Matched and not waiting for removal.
    pub(crate) fn has(&self, entity: EntityId, slot: usize) -> bool {
        self.matched.contains(entity, slot) && !self.to_remove.contains(entity, slot)
    }

    pub(crate) fn seed(&mut self, entity: EntityId, slot: usize) {
        self.matched.insert(entity, slot);
    }

    pub(crate) fn add_entity(&mut self, entity: EntityId, slot: usize) {
        if self.has(entity, slot) {
            return;
        }
        self.to_remove.remove(slot);
        if !self.matched.contains(entity, slot) {
            self.matched.insert(entity, slot);
        }
        self.add_observable.notify(entity);
    }

    /// Schedules `entity` for removal on the next commit. Returns `true` when
    /// the query has become dirty.
    pub(crate) fn remove_entity(&mut self, entity: EntityId, slot: usize) -> bool {
        if !self.has(entity, slot) {
            return false;
        }
        self.to_remove.insert(entity, slot);
        self.remove_observable.notify(entity);
        true
    }

    pub(crate) fn commit_removals(&mut self) {
        for &slot in self.to_remove.slots() {
            let slot = slot as usize;
            if self.matched.get(slot) == self.to_remove.get(slot) {
                self.matched.remove(slot);
            }
        }
        self.to_remove.clear();
    }

    pub(crate) fn snapshot(&self) -> QueryResult {
        QueryResult::new(self.matched.snapshot())
    }
}
