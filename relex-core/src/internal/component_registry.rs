use crate::component::Component;
use crate::component::ComponentId;
use crate::entity_key::EntityId;
use crate::internal::entity_masks::EntityMasks;
use crate::internal::filter_manager::QueryKey;
use crate::internal::world_core::World;
use crate::utils::observable::GetCallback;
use crate::utils::observable::Observable;
use crate::utils::observable::SetCallback;
use crate::utils::observable::Unsubscribe;
use crate::utils::typed_index_vec::TiVec;
use crate::world_result::WorldResult;
use log::debug;
use log::trace;
use std::any::Any;
use std::collections::HashMap;
use std::collections::HashSet;
use std::rc::Rc;

/// Bookkeeping the world keeps for one registered component.
pub struct ComponentData {
    id: ComponentId,
    generation: usize,
    bitflag: u32,
    component: Component,
    pub(crate) queries: Vec<QueryKey>,
    pub(crate) set_observable: Observable<SetCallback>,
    pub(crate) get_observable: Observable<GetCallback>,
}

impl ComponentData {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Index of the mask row holding [`ComponentData::bitflag`].
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn bitflag(&self) -> u32 {
        self.bitflag
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Number of live queries mentioning the component.
    pub fn query_count(&self) -> usize {
        self.queries.len()
    }
}

pub(crate) struct ComponentRegistry {
    components: TiVec<ComponentId, ComponentData>,
    by_component: HashMap<Component, ComponentId>,
    generation: usize,
    bitflag: u32,
}

impl ComponentRegistry {
    pub(crate) fn new() -> ComponentRegistry {
        ComponentRegistry {
            components: TiVec::new(),
            by_component: HashMap::new(),
            generation: 0,
            bitflag: 1,
        }
    }

    pub(crate) fn lookup(&self, component: &Component) -> Option<ComponentId> {
        self.by_component.get(component).copied()
    }

    pub(crate) fn get(&self, id: ComponentId) -> &ComponentData {
        &self.components[id]
    }

    pub(crate) fn get_mut(&mut self, id: ComponentId) -> &mut ComponentData {
        &mut self.components[id]
    }

    /// Idempotent. A bitflag is a single bit doubled from 1; once it shifts out
    /// of the `u32` the next component opens a new mask row.
    pub(crate) fn register(&mut self, component: &Component, masks: &mut EntityMasks) -> ComponentId {
        if let Some(id) = self.lookup(component) {
            return id;
        }
        if self.bitflag == 0 {
            self.generation = masks.push_row();
            self.bitflag = 1;
            debug!("bitflags exhausted, mask generation {} opened", self.generation);
        }
        let generation = self.generation;
        let bitflag = self.bitflag;
        self.bitflag = bitflag.checked_mul(2).unwrap_or(0);
        let id = self.components.push_with_key(|id| ComponentData {
            id: *id,
            generation,
            bitflag,
            component: component.clone(),
            queries: vec![],
            set_observable: Observable::default(),
            get_observable: Observable::default(),
        });
        self.by_component.insert(component.clone(), id);
        debug!(
            "component {} registered as {} (generation {}, bitflag {:#x})",
            component, id, generation, bitflag
        );
        id
    }
}

impl World {
    /// Registers `component` unless known and returns its bookkeeping.
    pub fn register_component(&mut self, component: &Component) -> &ComponentData {
        let id = self.component_id(component);
        self.registry.get(id)
    }

    pub(crate) fn component_id(&mut self, component: &Component) -> ComponentId {
        self.registry.register(component, &mut self.entity_masks)
    }

    /// `false` for dead entities and for components never used in this world.
    pub fn has_component(&self, entity: EntityId, component: &Component) -> bool {
        let Ok(slot) = self.entity_index.validate(entity) else {
            return false;
        };
        match self.registry.lookup(component) {
            None => false,
            Some(id) => self.has_component_id(slot, id),
        }
    }

    #[inline]
    pub(crate) fn has_component_id(&self, slot: usize, id: ComponentId) -> bool {
        let data = self.registry.get(id);
        self.entity_masks.has(data.generation, slot, data.bitflag)
    }

    pub(crate) fn is_prefab(&self, slot: usize) -> bool {
        self.has_component_id(slot, self.prefab_id)
    }

    /// Returns whether the component was newly added.
    pub fn add_component(&mut self, entity: EntityId, component: &Component) -> WorldResult<bool> {
        self.insert_component(entity, component, None, &mut HashSet::new())
    }

    /// Adds the component if missing, then hands `data` to the component's set
    /// observers. The set observers run after every add observer, also when
    /// the component was already present.
    pub fn add_component_with<T: Any>(
        &mut self,
        entity: EntityId,
        component: &Component,
        data: T,
    ) -> WorldResult<bool> {
        self.insert_component(entity, component, Some(&data), &mut HashSet::new())
    }

    pub fn set_component<T: Any>(
        &mut self,
        entity: EntityId,
        component: &Component,
        data: T,
    ) -> WorldResult<bool> {
        self.add_component_with(entity, component, data)
    }

    pub(crate) fn insert_component(
        &mut self,
        entity: EntityId,
        component: &Component,
        data: Option<&dyn Any>,
        inherited: &mut HashSet<EntityId>,
    ) -> WorldResult<bool> {
        let slot = self.entity_index.validate(entity)?;
        let id = self.component_id(component);
        if self.has_component_id(slot, id) {
            if let Some(data) = data {
                self.registry.get(id).set_observable.notify(entity, data);
            }
            return Ok(false);
        }
        let edge = self.edge_of(component);
        if let Some((_, target)) = &edge {
            self.check_target(target)?;
        }
        self.set_component_bit(entity, slot, id);
        if let Some((relation, target)) = &edge {
            self.link_pair(entity, relation, target, inherited)?;
            self.drop_other_targets(entity, relation, target)?;
        }
        if let Some(data) = data {
            self.registry.get(id).set_observable.notify(entity, data);
        }
        Ok(true)
    }

    pub(crate) fn set_component_bit(&mut self, entity: EntityId, slot: usize, id: ComponentId) {
        let data = self.registry.get(id);
        trace!("add {} to {}", data.component, entity);
        self.entity_masks.set(data.generation, slot, data.bitflag);
        self.entity_components.add(slot, id);
        if id == self.prefab_id {
            self.query_manager
                .refresh_all(&self.entity_masks, entity, slot, true);
        } else {
            let is_prefab = self.is_prefab(slot);
            self.query_manager
                .refresh(&data.queries, &self.entity_masks, entity, slot, is_prefab);
        }
    }

    /// Returns whether the entity carried the component.
    pub fn remove_component(&mut self, entity: EntityId, component: &Component) -> WorldResult<bool> {
        let slot = self.entity_index.validate(entity)?;
        let Some(id) = self.registry.lookup(component) else {
            return Ok(false);
        };
        if !self.has_component_id(slot, id) {
            return Ok(false);
        }
        self.clear_component_bit(entity, slot, id);
        if let Some((relation, target)) = self.edge_of(component) {
            self.unlink_pair(entity, &relation, &target)?;
        }
        Ok(true)
    }

    fn clear_component_bit(&mut self, entity: EntityId, slot: usize, id: ComponentId) {
        let data = self.registry.get(id);
        trace!("remove {} from {}", data.component, entity);
        self.entity_masks.clear(data.generation, slot, data.bitflag);
        self.entity_components.remove(slot, id);
        if id == self.prefab_id {
            self.query_manager
                .refresh_all(&self.entity_masks, entity, slot, false);
        } else {
            let is_prefab = self.is_prefab(slot);
            self.query_manager
                .refresh(&data.queries, &self.entity_masks, entity, slot, is_prefab);
        }
    }

    /// Asks the component's get observers for the entity's value; the last
    /// observer returning `Some` wins. `None` when the entity lacks the
    /// component or nobody answers.
    pub fn get_component_data(&self, entity: EntityId, component: &Component) -> Option<Box<dyn Any>> {
        if !self.has_component(entity, component) {
            return None;
        }
        let id = self.registry.lookup(component)?;
        self.registry.get(id).get_observable.notify(entity)
    }

    pub fn observe_set(
        &mut self,
        component: &Component,
        callback: impl Fn(EntityId, &dyn Any) + 'static,
    ) -> Unsubscribe {
        let id = self.component_id(component);
        self.registry
            .get(id)
            .set_observable
            .subscribe(Rc::new(callback))
    }

    pub fn observe_get(
        &mut self,
        component: &Component,
        callback: impl Fn(EntityId) -> Option<Box<dyn Any>> + 'static,
    ) -> Unsubscribe {
        let id = self.component_id(component);
        self.registry
            .get(id)
            .get_observable
            .subscribe(Rc::new(callback))
    }
}
