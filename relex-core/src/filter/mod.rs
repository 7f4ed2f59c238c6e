use crate::component::Component;
use crate::entity_key::EntityId;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::ops::Deref;
use std::rc::Rc;
use to_vec::ToVec;

pub mod filter_desc;

/// One clause of a query.
#[derive(Clone, Debug)]
pub enum Term {
    /// The entity has the component.
    With(Component),
    /// The entity has none of the components.
    Not(Vec<Component>),
    /// The entity has at least one of the components.
    Or(Vec<Component>),
}

impl From<&Component> for Term {
    fn from(value: &Component) -> Self {
        Term::With(value.clone())
    }
}

impl From<Component> for Term {
    fn from(value: Component) -> Self {
        Term::With(value)
    }
}

pub fn not<'a>(components: impl IntoIterator<Item = &'a Component>) -> Term {
    Term::Not(components.into_iter().cloned().to_vec())
}

pub fn or<'a>(components: impl IntoIterator<Item = &'a Component>) -> Term {
    Term::Or(components.into_iter().cloned().to_vec())
}

pub(crate) fn collect_terms<I, T>(terms: I) -> Vec<Term>
where
    I: IntoIterator<Item = T>,
    T: Into<Term>,
{
    terms.into_iter().map(Into::into).collect()
}

/// Ids matched by a query at the moment of the call.
///
/// The ids are shared with the query until the query changes, at which point
/// the query moves on to a private copy. A result therefore never changes
/// while it is held, whatever the caller does to the world in the meantime.
#[derive(Clone, Default)]
pub struct QueryResult {
    entities: Rc<Vec<EntityId>>,
}

impl QueryResult {
    pub(crate) fn new(entities: Rc<Vec<EntityId>>) -> QueryResult {
        QueryResult { entities }
    }
}

impl Deref for QueryResult {
    type Target = [EntityId];

    fn deref(&self) -> &[EntityId] {
        self.entities.as_slice()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a EntityId;
    type IntoIter = std::slice::Iter<'a, EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

impl Debug for QueryResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entities.iter()).finish()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum HookKind {
    Add,
    Remove,
}

/// Entry or exit of a term combination, see [`crate::World::observe`].
pub struct QueryHook {
    pub(crate) kind: HookKind,
    pub(crate) terms: Vec<Term>,
}

/// Fires when an entity starts matching `terms`.
pub fn on_add<I, T>(terms: I) -> QueryHook
where
    I: IntoIterator<Item = T>,
    T: Into<Term>,
{
    QueryHook {
        kind: HookKind::Add,
        terms: collect_terms(terms),
    }
}

/// Fires when an entity stops matching `terms`, before the query drops it.
pub fn on_remove<I, T>(terms: I) -> QueryHook
where
    I: IntoIterator<Item = T>,
    T: Into<Term>,
{
    QueryHook {
        kind: HookKind::Remove,
        terms: collect_terms(terms),
    }
}
