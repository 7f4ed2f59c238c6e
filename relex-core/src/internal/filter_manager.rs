use crate::entity_key::EntityId;
use crate::filter::filter_desc::QuerySignature;
use crate::internal::entity_masks::EntityMasks;
use crate::internal::filter::Query;
use crate::utils::typed_index_vec::TiVec;
use crate::utils::typed_index_vec::TiVecKey;
use log::debug;
use log::trace;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Display;
use std::fmt::Formatter;

/// Stable handle of a registered query, see [`crate::World::register_query`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QueryKey(pub(crate) usize);

impl TiVecKey for QueryKey {
    fn from_index(index: usize) -> Self {
        QueryKey(index)
    }
    fn as_index(&self) -> usize {
        self.0
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}

#[derive(Default)]
pub(crate) struct QueryManager {
    owned: TiVec<QueryKey, Option<Query>>,
    by_signature: HashMap<QuerySignature, QueryKey>,
    // queries an entity without components satisfies
    empty_matching: HashSet<QueryKey>,
    dirty: HashSet<QueryKey>,
}

// basic operations
impl QueryManager {
    pub(crate) fn get(&self, key: QueryKey) -> Option<&Query> {
        self.owned.get(&key).and_then(|it| it.as_ref())
    }

    pub(crate) fn find(&self, signature: &QuerySignature) -> Option<QueryKey> {
        self.by_signature.get(signature).copied()
    }

    pub(crate) fn next_key(&self) -> QueryKey {
        QueryKey(self.owned.len())
    }

    pub(crate) fn insert(&mut self, query: Query) -> QueryKey {
        let signature = query.signature.clone();
        let matches_empty_entity = signature.matches_empty_entity();
        let key = self.owned.push_with_key(|key| {
            debug_assert_eq!(*key, query.key);
            Some(query)
        });
        debug!("query {} compiled as {}", signature, key);
        self.by_signature.insert(signature, key);
        if matches_empty_entity {
            self.empty_matching.insert(key);
        }
        key
    }

    pub(crate) fn remove(&mut self, key: QueryKey) -> Option<Query> {
        let query = self.owned.get_mut(&key)?.take()?;
        self.by_signature.remove(&query.signature);
        self.empty_matching.remove(&key);
        self.dirty.remove(&key);
        debug!("query {} ({}) removed", query.signature, key);
        Some(query)
    }

    pub(crate) fn len(&self) -> usize {
        self.owned.iter().flatten().count()
    }
}

// membership maintenance
impl QueryManager {
    fn refresh_one(
        &mut self,
        key: QueryKey,
        masks: &EntityMasks,
        entity: EntityId,
        slot: usize,
        is_prefab: bool,
    ) {
        let Some(query) = self.owned.get_mut(&key).and_then(|it| it.as_mut()) else {
            return;
        };
        if query.matches(masks, slot, is_prefab) {
            query.add_entity(entity, slot);
        } else if query.remove_entity(entity, slot) {
            trace!("{} leaves query {}", entity, key);
            self.dirty.insert(key);
        }
    }

    /// Re-evaluates `entity` against the given queries only.
    pub(crate) fn refresh(
        &mut self,
        keys: &[QueryKey],
        masks: &EntityMasks,
        entity: EntityId,
        slot: usize,
        is_prefab: bool,
    ) {
        for key in keys {
            self.refresh_one(*key, masks, entity, slot, is_prefab);
        }
    }

    pub(crate) fn refresh_all(
        &mut self,
        masks: &EntityMasks,
        entity: EntityId,
        slot: usize,
        is_prefab: bool,
    ) {
        for key in self.owned.keys().collect::<Vec<_>>() {
            self.refresh_one(key, masks, entity, slot, is_prefab);
        }
    }

    pub(crate) fn on_entity_created(&mut self, masks: &EntityMasks, entity: EntityId, slot: usize) {
        let keys: Vec<_> = self.empty_matching.iter().copied().collect();
        self.refresh(&keys, masks, entity, slot, false);
    }

    /// Drops `entity` from every query, as happens when it is destroyed.
    pub(crate) fn evict(&mut self, entity: EntityId, slot: usize) {
        for query in self.owned.iter_mut().flatten() {
            if query.remove_entity(entity, slot) {
                self.dirty.insert(query.key);
            }
        }
    }

    pub(crate) fn commit_removals(&mut self) {
        if self.dirty.is_empty() {
            return;
        }
        for key in self.dirty.drain() {
            if let Some(query) = self.owned.get_mut(&key).and_then(|it| it.as_mut()) {
                query.commit_removals();
            }
        }
    }
}
