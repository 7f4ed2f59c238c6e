use crate::component::Component;
use crate::component::ComponentInner;
use crate::entity_key::EntityId;
use crate::internal::world_core::World;
use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::rc::Rc;
use std::rc::Weak;

pub type TargetRemovedCallback = dyn Fn(&mut World, EntityId, EntityId);

type StoreFactory = dyn Fn() -> Rc<dyn Any>;

/// What a pair component points at.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum Target {
    Entity(EntityId),
    Wildcard,
    Relation(Relation),
}

impl Target {
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Target::Entity(entity) => Some(*entity),
            _ => None,
        }
    }
}

impl From<EntityId> for Target {
    fn from(value: EntityId) -> Self {
        Target::Entity(value)
    }
}

impl From<&Relation> for Target {
    fn from(value: &Relation) -> Self {
        Target::Relation(value.clone())
    }
}

impl From<Relation> for Target {
    fn from(value: Relation) -> Self {
        Target::Relation(value)
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Entity(entity) => Display::fmt(entity, f),
            Target::Wildcard => f.write_str("*"),
            Target::Relation(relation) => f.write_str(relation.name()),
        }
    }
}

impl Debug for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Behaviour flags of a relation.
///
/// ```
/// use relex_core::{Relation, RelationOptions};
/// let child_of = Relation::with_options(
///     "ChildOf",
///     RelationOptions::new().exclusive().auto_remove_subject(),
/// );
/// assert!(child_of.is_exclusive());
/// ```
#[derive(Clone, Default)]
pub struct RelationOptions {
    store: Option<Rc<StoreFactory>>,
    exclusive: bool,
    auto_remove_subject: bool,
    on_target_removed: Option<Rc<TargetRemovedCallback>>,
}

impl RelationOptions {
    pub fn new() -> RelationOptions {
        RelationOptions::default()
    }

    /// Every pair minted by the relation gets its own store built by `factory`.
    pub fn with_store<T: Any>(mut self, factory: impl Fn() -> T + 'static) -> RelationOptions {
        self.store = Some(Rc::new(move || Rc::new(factory()) as Rc<dyn Any>));
        self
    }

    /// A subject holds at most one concrete target of the relation.
    pub fn exclusive(mut self) -> RelationOptions {
        self.exclusive = true;
        self
    }

    /// Removing a target removes every subject pointing at it.
    pub fn auto_remove_subject(mut self) -> RelationOptions {
        self.auto_remove_subject = true;
        self
    }

    /// Called with `(world, subject, target)` after the edge to a removed
    /// target has been stripped from the subject.
    pub fn on_target_removed(
        mut self,
        callback: impl Fn(&mut World, EntityId, EntityId) + 'static,
    ) -> RelationOptions {
        self.on_target_removed = Some(Rc::new(callback));
        self
    }
}

/// Factory of pair components, one per distinct target.
#[derive(Clone)]
pub struct Relation {
    pub(crate) inner: Rc<RelationInner>,
}

pub(crate) struct RelationInner {
    name: Cow<'static, str>,
    options: RelationOptions,
    pairs: RefCell<HashMap<Target, Weak<ComponentInner>>>,
}

impl Relation {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Relation {
        Relation::with_options(name, RelationOptions::default())
    }

    pub fn with_options(name: impl Into<Cow<'static, str>>, options: RelationOptions) -> Relation {
        Relation {
            inner: Rc::new(RelationInner {
                name: name.into(),
                options,
                pairs: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_exclusive(&self) -> bool {
        self.inner.options.exclusive
    }

    pub fn auto_removes_subject(&self) -> bool {
        self.inner.options.auto_remove_subject
    }

    pub(crate) fn target_removed_callback(&self) -> Option<Rc<TargetRemovedCallback>> {
        self.inner.options.on_target_removed.clone()
    }

    /// The pair component for `target`. Repeated calls with an equal target
    /// return the same component for as long as any handle of it is alive.
    ///
    /// Pairs own their relation, the cache only holds them weakly.
    pub fn pair(&self, target: impl Into<Target>) -> Component {
        let target = target.into();
        let cached = self.inner.pairs.borrow().get(&target).and_then(Weak::upgrade);
        if let Some(inner) = cached {
            return Component { inner };
        }
        let store = self.inner.options.store.as_ref().map(|factory| factory());
        let component = Component::new_pair(self, target.clone(), store);
        let mut pairs = self.inner.pairs.borrow_mut();
        if pairs.len() == pairs.capacity() {
            pairs.retain(|_, it| it.strong_count() > 0);
        }
        pairs.insert(target, Rc::downgrade(&component.inner));
        component
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Relation {}

impl Hash for Relation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.inner) as *const () as usize).hash(state)
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner.name)
    }
}

impl Debug for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Relation({})", self.inner.name)
    }
}
