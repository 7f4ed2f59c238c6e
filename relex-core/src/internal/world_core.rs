use crate::component::Component;
use crate::component::ComponentId;
use crate::entity_key::EntityId;
use crate::internal::component_registry::ComponentRegistry;
use crate::internal::entity_component_index::EntityComponentIndex;
use crate::internal::entity_index::EntityIndex;
use crate::internal::entity_masks::EntityMasks;
use crate::internal::filter_manager::QueryManager;
use crate::internal::relation_index::RelationIndex;
use crate::internal::world_configure::ConfigurableWorld;
use crate::internal::world_configure::WorldConfig;
use crate::relation::Relation;
use crate::world_result::WorldResult;
use log::debug;
use log::trace;
use to_vec::ToVec;

/// Owner of every entity, component registration, query and relation edge.
///
/// The world-level `Wildcard` and `IsA` relations and the `Prefab` marker are
/// created with the world and stay valid across [`World::reset`].
pub struct World {
    config: WorldConfig,
    pub(crate) entity_index: EntityIndex,
    pub(crate) entity_masks: EntityMasks,
    pub(crate) entity_components: EntityComponentIndex,
    pub(crate) registry: ComponentRegistry,
    pub(crate) query_manager: QueryManager,
    pub(crate) relations: RelationIndex,
    pub(crate) wildcard: Relation,
    pub(crate) is_a: Relation,
    pub(crate) prefab: Component,
    pub(crate) prefab_id: ComponentId,
}

impl World {
    /// A world with plain, non-versioned ids.
    pub fn new() -> World {
        ConfigurableWorld::new().seal()
    }

    pub(crate) fn with_config(config: WorldConfig) -> World {
        World::assemble(
            config,
            Relation::new("Wildcard"),
            Relation::new("IsA"),
            Component::new("Prefab"),
        )
    }

    fn assemble(config: WorldConfig, wildcard: Relation, is_a: Relation, prefab: Component) -> World {
        let mut world = World {
            entity_index: new_entity_index(&config),
            entity_masks: EntityMasks::new(config.entity_capacity),
            entity_components: EntityComponentIndex::new(config.entity_capacity),
            registry: ComponentRegistry::new(),
            query_manager: QueryManager::default(),
            relations: RelationIndex::default(),
            config,
            wildcard,
            is_a,
            prefab,
            prefab_id: ComponentId(0),
        };
        world.prefab_id = world.component_id(&world.prefab.clone());
        world
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn add_entity(&mut self) -> EntityId {
        let entity = self.entity_index.alloc();
        let slot = self.entity_index.slot(entity);
        self.entity_components.clear(slot);
        self.query_manager
            .on_entity_created(&self.entity_masks, entity, slot);
        trace!("entity created {}", entity);
        entity
    }

    /// An entity carrying the world's prefab marker, invisible to queries that
    /// do not ask for prefabs.
    pub fn add_prefab(&mut self) -> EntityId {
        let entity = self.entity_index.alloc();
        let slot = self.entity_index.slot(entity);
        self.entity_components.clear(slot);
        self.set_component_bit(entity, slot, self.prefab_id);
        trace!("prefab created {}", entity);
        entity
    }

    pub fn entity_exists(&self, entity: EntityId) -> bool {
        self.entity_index.is_alive(entity)
    }

    pub fn get_all_entities(&self) -> Vec<EntityId> {
        self.entity_index.alive().to_vec()
    }

    pub fn get_entity_components(&self, entity: EntityId) -> WorldResult<Vec<Component>> {
        let slot = self.entity_index.validate(entity)?;
        Ok(self
            .entity_components
            .get(slot)
            .iter()
            .map(|id| self.registry.get(*id).component().clone())
            .to_vec())
    }

    pub fn entity_index(&self) -> &EntityIndex {
        &self.entity_index
    }

    /// Relation whose pairs mirror "any relation to this target" and
    /// "target of this relation".
    pub fn wildcard(&self) -> &Relation {
        &self.wildcard
    }

    /// Inheritance relation: `IsA(base)` copies the components of `base` and
    /// of its own `IsA` ancestors onto the subject.
    pub fn is_a(&self) -> &Relation {
        &self.is_a
    }

    pub fn prefab(&self) -> &Component {
        &self.prefab
    }

    /// Forgets every entity, registration and query. Observers go with their
    /// queries and components; `Wildcard`, `IsA` and `Prefab` stay usable.
    pub fn reset(&mut self) {
        *self = World::assemble(
            self.config.clone(),
            self.wildcard.clone(),
            self.is_a.clone(),
            self.prefab.clone(),
        );
        debug!("world reset");
    }

    /// Consumes the world. Handles such as relations and components outlive
    /// it but mean nothing to other worlds' bookkeeping.
    pub fn delete(self) {
        debug!(
            "world deleted with {} entities and {} queries",
            self.entity_index.alive_count(),
            self.query_manager.len()
        );
    }
}

fn new_entity_index(config: &WorldConfig) -> EntityIndex {
    let mut index = match config.version_bits {
        None => EntityIndex::new(),
        Some(bits) => EntityIndex::with_versioning(bits),
    };
    index.reserve(config.entity_capacity);
    index
}
