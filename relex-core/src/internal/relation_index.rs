use crate::entity_key::EntityId;
use crate::relation::Relation;
use crate::relation::Target;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;

/// Concrete relation edges, indexed from both ends.
///
/// Wildcard mirrors are derived from this index: a subject keeps `Rel(*)`
/// while it holds any target of `Rel`, and `Wildcard(t)` while any relation
/// points it at `t`. A target keeps `Wildcard(Rel)` while it has subjects.
#[derive(Default)]
pub(crate) struct RelationIndex {
    outgoing: HashMap<EntityId, Outgoing>,
    incoming: HashMap<EntityId, HashMap<Relation, BTreeSet<EntityId>>>,
}

#[derive(Default)]
struct Outgoing {
    by_relation: HashMap<Relation, HashSet<Target>>,
    by_target: HashMap<Target, usize>,
}

impl RelationIndex {
    pub fn link(&mut self, subject: EntityId, relation: &Relation, target: &Target) {
        let outgoing = self.outgoing.entry(subject).or_default();
        if !outgoing
            .by_relation
            .entry(relation.clone())
            .or_default()
            .insert(target.clone())
        {
            return;
        }
        *outgoing.by_target.entry(target.clone()).or_default() += 1;
        if let Target::Entity(target) = target {
            self.incoming
                .entry(*target)
                .or_default()
                .entry(relation.clone())
                .or_default()
                .insert(subject);
        }
    }

    pub fn unlink(&mut self, subject: EntityId, relation: &Relation, target: &Target) {
        let Some(outgoing) = self.outgoing.get_mut(&subject) else {
            return;
        };
        let Some(targets) = outgoing.by_relation.get_mut(relation) else {
            return;
        };
        if !targets.remove(target) {
            return;
        }
        if targets.is_empty() {
            outgoing.by_relation.remove(relation);
        }
        if let Some(count) = outgoing.by_target.get_mut(target) {
            *count -= 1;
            if *count == 0 {
                outgoing.by_target.remove(target);
            }
        }
        if outgoing.by_relation.is_empty() {
            self.outgoing.remove(&subject);
        }
        if let Target::Entity(target) = target {
            self.forget_subject(*target, relation, subject);
        }
    }

    fn forget_subject(&mut self, target: EntityId, relation: &Relation, subject: EntityId) {
        let Some(by_relation) = self.incoming.get_mut(&target) else {
            return;
        };
        if let Some(subjects) = by_relation.get_mut(relation) {
            subjects.remove(&subject);
            if subjects.is_empty() {
                by_relation.remove(relation);
            }
        }
        if by_relation.is_empty() {
            self.incoming.remove(&target);
        }
    }

    pub fn holds_relation(&self, subject: EntityId, relation: &Relation) -> bool {
        self.outgoing
            .get(&subject)
            .map_or(false, |it| it.by_relation.contains_key(relation))
    }

    pub fn holds_target(&self, subject: EntityId, target: &Target) -> bool {
        self.outgoing
            .get(&subject)
            .map_or(false, |it| it.by_target.contains_key(target))
    }

    pub fn targets(&self, subject: EntityId, relation: &Relation) -> Vec<Target> {
        self.outgoing
            .get(&subject)
            .and_then(|it| it.by_relation.get(relation))
            .map_or_else(Vec::new, |it| it.iter().cloned().collect())
    }

    /// Every edge leaving `subject`.
    pub fn edges(&self, subject: EntityId) -> Vec<(Relation, Target)> {
        let Some(outgoing) = self.outgoing.get(&subject) else {
            return vec![];
        };
        outgoing
            .by_relation
            .iter()
            .flat_map(|(relation, targets)| {
                targets
                    .iter()
                    .map(move |target| (relation.clone(), target.clone()))
            })
            .collect()
    }

    pub fn has_subjects(&self, target: EntityId, relation: &Relation) -> bool {
        self.incoming
            .get(&target)
            .map_or(false, |it| it.contains_key(relation))
    }

    /// Every edge arriving at `target`, ordered by subject.
    pub fn incoming(&self, target: EntityId) -> Vec<(EntityId, Relation)> {
        let Some(by_relation) = self.incoming.get(&target) else {
            return vec![];
        };
        let mut edges: Vec<(EntityId, Relation)> = by_relation
            .iter()
            .flat_map(|(relation, subjects)| {
                subjects
                    .iter()
                    .map(move |subject| (*subject, relation.clone()))
            })
            .collect();
        edges.sort_by_key(|(subject, _)| *subject);
        edges
    }

    /// Drops every edge leaving `entity` along with what is left arriving at it.
    pub fn forget(&mut self, entity: EntityId) {
        for (relation, target) in self.edges(entity) {
            self.unlink(entity, &relation, &target);
        }
        self.incoming.remove(&entity);
    }

    pub fn participates(&self, entity: EntityId) -> bool {
        self.outgoing.contains_key(&entity) || self.incoming.contains_key(&entity)
    }
}

#[cfg(test)]
mod tests {
    use crate::entity_key::EntityId;
    use crate::internal::relation_index::RelationIndex;
    use crate::relation::Relation;
    use crate::relation::Target;

    fn entity(raw: u32) -> EntityId {
        EntityId::from_raw(raw)
    }

    #[test]
    fn edge_seen_from_both_ends() {
        let likes = Relation::new("Likes");
        let mut index = RelationIndex::default();
        index.link(entity(1), &likes, &entity(2).into());

        assert!(index.holds_relation(entity(1), &likes));
        assert!(index.holds_target(entity(1), &entity(2).into()));
        assert!(index.has_subjects(entity(2), &likes));
        assert_eq!(index.incoming(entity(2)), vec![(entity(1), likes.clone())]);
        assert!(index.participates(entity(2)));
    }

    #[test]
    fn target_counted_across_relations() {
        let likes = Relation::new("Likes");
        let eats = Relation::new("Eats");
        let mut index = RelationIndex::default();
        index.link(entity(1), &likes, &entity(2).into());
        index.link(entity(1), &eats, &entity(2).into());

        index.unlink(entity(1), &likes, &entity(2).into());
        assert!(!index.holds_relation(entity(1), &likes));
        assert!(index.holds_target(entity(1), &entity(2).into()));
        assert!(!index.has_subjects(entity(2), &likes));
        assert!(index.has_subjects(entity(2), &eats));

        index.unlink(entity(1), &eats, &entity(2).into());
        assert!(!index.holds_target(entity(1), &entity(2).into()));
        assert!(!index.participates(entity(1)));
        assert!(!index.participates(entity(2)));
    }

    #[test]
    fn repeated_link_counted_once() {
        let likes = Relation::new("Likes");
        let mut index = RelationIndex::default();
        index.link(entity(1), &likes, &entity(2).into());
        index.link(entity(1), &likes, &entity(2).into());
        index.unlink(entity(1), &likes, &entity(2).into());

        assert!(!index.holds_target(entity(1), &entity(2).into()));
        assert!(index.edges(entity(1)).is_empty());
    }

    #[test]
    fn forget_clears_both_directions() {
        let likes = Relation::new("Likes");
        let mut index = RelationIndex::default();
        index.link(entity(1), &likes, &entity(2).into());
        index.link(entity(3), &likes, &entity(1).into());
        index.link(entity(1), &likes, &Target::Relation(likes.clone()));

        index.forget(entity(1));
        assert!(!index.participates(entity(1)));
        assert!(!index.has_subjects(entity(2), &likes));
        assert!(index.holds_relation(entity(3), &likes));
    }
}
