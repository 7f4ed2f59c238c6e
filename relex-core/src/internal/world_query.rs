use crate::entity_key::EntityId;
use crate::filter::collect_terms;
use crate::filter::filter_desc::QuerySignature;
use crate::filter::HookKind;
use crate::filter::QueryHook;
use crate::filter::QueryResult;
use crate::filter::Term;
use crate::internal::filter::Query;
use crate::internal::filter_manager::QueryKey;
use crate::internal::world_core::World;
use crate::utils::observable::Unsubscribe;
use std::rc::Rc;

impl World {
    /// Entities matching `terms` right now.
    ///
    /// Pending removals of every query are committed first. The returned
    /// snapshot is not affected by later mutations of the world.
    pub fn query<I, T>(&mut self, terms: I) -> QueryResult
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let key = self.register_query(terms);
        self.query_by_key(key)
    }

    /// Compiles and caches the query without reading it. Equivalent term
    /// lists share one key.
    pub fn register_query<I, T>(&mut self, terms: I) -> QueryKey
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.compile_query(collect_terms(terms))
    }

    /// Like [`World::query`] without compiling the terms again. A removed
    /// query reads as empty.
    pub fn query_by_key(&mut self, key: QueryKey) -> QueryResult {
        self.commit_removals();
        match self.query_manager.get(key) {
            None => QueryResult::default(),
            Some(query) => query.snapshot(),
        }
    }

    /// Compacts the entities every query has dropped since the last commit.
    pub fn commit_removals(&mut self) {
        self.query_manager.commit_removals();
    }

    fn signature_of(&mut self, terms: Vec<Term>) -> QuerySignature {
        let mut all = vec![];
        let mut none = vec![];
        let mut any = vec![];
        for term in terms {
            match term {
                Term::With(component) => all.push(self.component_id(&component)),
                Term::Not(components) => {
                    none.extend(components.iter().map(|it| self.component_id(it)))
                }
                Term::Or(components) => {
                    any.push(components.iter().map(|it| self.component_id(it)).collect())
                }
            }
        }
        QuerySignature::new(all, none, any)
    }

    pub(crate) fn compile_query(&mut self, terms: Vec<Term>) -> QueryKey {
        let signature = self.signature_of(terms);
        if let Some(key) = self.query_manager.find(&signature) {
            return key;
        }
        let key = self.query_manager.next_key();
        let components = signature.components();
        let mut query = Query::new(key, signature, &self.registry, self.prefab_id);
        for entity in self.entity_index.alive() {
            let slot = self.entity_index.slot(*entity);
            if query.matches(&self.entity_masks, slot, self.is_prefab(slot)) {
                query.seed(*entity, slot);
            }
        }
        for component in components {
            self.registry.get_mut(component).queries.push(key);
        }
        self.query_manager.insert(query)
    }

    /// Destroys the cached query for `terms`. Returns `false` if none existed.
    pub fn remove_query<I, T>(&mut self, terms: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let signature = self.signature_of(collect_terms(terms));
        match self.query_manager.find(&signature) {
            None => false,
            Some(key) => self.remove_query_by_key(key),
        }
    }

    pub fn remove_query_by_key(&mut self, key: QueryKey) -> bool {
        let Some(query) = self.query_manager.remove(key) else {
            return false;
        };
        for component in query.signature.components() {
            self.registry
                .get_mut(component)
                .queries
                .retain(|it| *it != key);
        }
        true
    }

    /// Number of live cached queries.
    pub fn query_count(&self) -> usize {
        self.query_manager.len()
    }

    /// Subscribes to entities entering ([`crate::on_add`]) or leaving
    /// ([`crate::on_remove`]) the query of the hook's terms.
    ///
    /// The callback receives only the entity: the world is mid-mutation while
    /// observers run.
    pub fn observe(&mut self, hook: QueryHook, callback: impl Fn(EntityId) + 'static) -> Unsubscribe {
        let key = self.compile_query(hook.terms);
        let query = self
            .query_manager
            .get(key)
            .expect("query compiled just above");
        match hook.kind {
            HookKind::Add => query.add_observable.subscribe(Rc::new(callback)),
            HookKind::Remove => query.remove_observable.subscribe(Rc::new(callback)),
        }
    }
}
