use crate::component::Component;
use crate::entity_key::EntityId;
use crate::internal::world_core::World;
use crate::relation::Relation;
use crate::relation::Target;
use crate::relation::TargetRemovedCallback;
use crate::world_result::RelationError;
use crate::world_result::WorldResult;
use log::debug;
use log::trace;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::rc::Rc;

impl World {
    /// Relation and target of a concrete pair. Wildcard mirrors are not edges.
    pub(crate) fn edge_of(&self, component: &Component) -> Option<(Relation, Target)> {
        let relation = component.relation()?;
        let target = component.target()?;
        if *relation == self.wildcard || *target == Target::Wildcard {
            return None;
        }
        Some((relation.clone(), target.clone()))
    }

    pub(crate) fn check_target(&self, target: &Target) -> WorldResult {
        if let Target::Entity(target) = target {
            if !self.entity_index.is_alive(*target) {
                return Err(RelationError::TargetNotExists(*target).into());
            }
        }
        Ok(())
    }

    /// Runs once the new pair is linked, so the shared `Rel(*)` mirror stays
    /// in place while the previous targets go.
    pub(crate) fn drop_other_targets(
        &mut self,
        subject: EntityId,
        relation: &Relation,
        target: &Target,
    ) -> WorldResult {
        if !relation.is_exclusive() {
            return Ok(());
        }
        for other in self.relations.targets(subject, relation) {
            if other != *target {
                let component = relation.pair(other);
                trace!("{} is exclusive, dropping {} from {}", relation, component, subject);
                self.remove_component(subject, &component)?;
            }
        }
        Ok(())
    }

    pub(crate) fn link_pair(
        &mut self,
        subject: EntityId,
        relation: &Relation,
        target: &Target,
        inherited: &mut HashSet<EntityId>,
    ) -> WorldResult {
        self.relations.link(subject, relation, target);
        let any_target = relation.pair(Target::Wildcard);
        self.insert_component(subject, &any_target, None, inherited)?;
        let any_relation = self.wildcard.pair(target.clone());
        self.insert_component(subject, &any_relation, None, inherited)?;
        if let Target::Entity(target) = target {
            let pointed_at = self.wildcard.pair(relation);
            self.insert_component(*target, &pointed_at, None, inherited)?;
            if *relation == self.is_a {
                self.inherit(subject, *target, inherited)?;
            }
        }
        Ok(())
    }

    /// Drops the mirrors of a removed pair that no remaining edge justifies.
    pub(crate) fn unlink_pair(
        &mut self,
        subject: EntityId,
        relation: &Relation,
        target: &Target,
    ) -> WorldResult {
        self.relations.unlink(subject, relation, target);
        if !self.relations.holds_target(subject, target) {
            let any_relation = self.wildcard.pair(target.clone());
            self.remove_component(subject, &any_relation)?;
        }
        if !self.relations.holds_relation(subject, relation) {
            self.remove_component(subject, &relation.pair(Target::Wildcard))?;
        }
        if let Target::Entity(target) = target {
            self.unlink_target(*target, relation)?;
        }
        Ok(())
    }

    fn unlink_target(&mut self, target: EntityId, relation: &Relation) -> WorldResult {
        if self.entity_index.is_alive(target) && !self.relations.has_subjects(target, relation) {
            let pointed_at = self.wildcard.pair(relation);
            self.remove_component(target, &pointed_at)?;
        }
        Ok(())
    }

    /// Concrete entity targets `entity` holds through `relation`, in id order.
    pub fn get_relation_targets(&self, entity: EntityId, relation: &Relation) -> Vec<EntityId> {
        if !self.entity_index.is_alive(entity) {
            return vec![];
        }
        let mut targets: Vec<EntityId> = self
            .relations
            .targets(entity, relation)
            .iter()
            .filter_map(Target::entity)
            .collect();
        targets.sort();
        targets
    }

    fn inherit(
        &mut self,
        subject: EntityId,
        base: EntityId,
        inherited: &mut HashSet<EntityId>,
    ) -> WorldResult {
        if base == subject || !inherited.insert(base) {
            return Ok(());
        }
        trace!("{} inherits from {}", subject, base);
        let is_a = self.is_a.pair(base);
        self.insert_component(subject, &is_a, None, inherited)?;

        let base_slot = self.entity_index.validate(base)?;
        let components: Vec<Component> = self
            .entity_components
            .get(base_slot)
            .iter()
            .map(|id| self.registry.get(*id).component().clone())
            .filter(|it| *it != self.prefab && !self.is_mirror(it) && !self.is_inheritance(it))
            .collect();
        for component in components {
            if self.has_component(subject, &component) {
                continue;
            }
            self.insert_component(subject, &component, None, inherited)?;
            if let Some(data) = self.get_component_data(base, &component) {
                let id = self.component_id(&component);
                self.registry
                    .get(id)
                    .set_observable
                    .notify(subject, &*data);
            }
        }

        for ancestor in self.get_relation_targets(base, &self.is_a) {
            self.inherit(subject, ancestor, inherited)?;
        }
        Ok(())
    }

    fn is_mirror(&self, component: &Component) -> bool {
        component.is_pair() && self.edge_of(component).is_none()
    }

    fn is_inheritance(&self, component: &Component) -> bool {
        component.relation().map_or(false, |it| *it == self.is_a)
    }

    /// Removes `entity` and unwinds the relation graph around it: subjects of
    /// auto-removing relations go with it, other subjects lose the edge and
    /// get `on_target_removed`. Returns `false` if the entity was not alive.
    pub fn remove_entity(&mut self, entity: EntityId) -> WorldResult<bool> {
        if !self.entity_index.is_alive(entity) {
            return Ok(false);
        }
        let mut queue = VecDeque::from([entity]);
        let mut visited = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) || !self.entity_index.is_alive(current) {
                continue;
            }
            let mut callbacks: Vec<(Rc<TargetRemovedCallback>, EntityId)> = vec![];
            let incoming = if self.relations.participates(current) {
                self.relations.incoming(current)
            } else {
                vec![]
            };
            for (subject, relation) in incoming {
                if subject == current || !self.entity_index.is_alive(subject) {
                    continue;
                }
                self.remove_component(subject, &relation.pair(current))?;
                if relation.auto_removes_subject() {
                    trace!("{} goes with its target {}", subject, current);
                    queue.push_back(subject);
                } else if let Some(callback) = relation.target_removed_callback() {
                    callbacks.push((callback, subject));
                }
            }
            for (callback, subject) in callbacks {
                (*callback)(self, subject, current);
            }
            self.destroy_entity(current)?;
        }
        debug!("{} removed, {} entities visited", entity, visited.len());
        Ok(true)
    }

    fn destroy_entity(&mut self, entity: EntityId) -> WorldResult {
        let Ok(slot) = self.entity_index.validate(entity) else {
            return Ok(());
        };
        // edges a target-removed callback aimed back at the entity
        for (subject, relation) in self.relations.incoming(entity) {
            if subject != entity && self.entity_index.is_alive(subject) {
                trace!("{} loses late edge {} to {}", subject, relation, entity);
                self.remove_component(subject, &relation.pair(entity))?;
            }
        }
        let outgoing: Vec<(Relation, EntityId)> = self
            .relations
            .edges(entity)
            .into_iter()
            .filter_map(|(relation, target)| Some((relation, target.entity()?)))
            .filter(|(_, target)| *target != entity)
            .collect();
        self.query_manager.evict(entity, slot);
        self.entity_masks.zero(slot);
        self.entity_components.clear(slot);
        self.entity_index.free(entity);
        self.relations.forget(entity);
        trace!("entity destroyed {}", entity);
        for (relation, target) in outgoing {
            self.unlink_target(target, &relation)?;
        }
        Ok(())
    }
}
