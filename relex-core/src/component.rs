use crate::relation::Relation;
use crate::relation::Target;
use crate::utils::typed_index_vec::TiVecKey;
use std::any::Any;
use std::borrow::Cow;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::rc::Rc;

/// Registration order of a component within one world.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct ComponentId(pub(crate) u32);

impl TiVecKey for ComponentId {
    fn from_index(index: usize) -> Self {
        ComponentId(index as u32)
    }
    fn as_index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Handle of a caller-owned component store.
///
/// Identity is the handle itself: clones are the same component, two handles
/// created with the same name are not. The optional store is never touched by
/// the world, it only travels along so callers can reach it through the handle.
#[derive(Clone)]
pub struct Component {
    pub(crate) inner: Rc<ComponentInner>,
}

pub(crate) struct ComponentInner {
    name: Cow<'static, str>,
    store: Option<Rc<dyn Any>>,
    pair: Option<PairInfo>,
}

struct PairInfo {
    relation: Relation,
    target: Target,
}

impl Component {
    /// Tag component without a store.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Component {
        Component {
            inner: Rc::new(ComponentInner {
                name: name.into(),
                store: None,
                pair: None,
            }),
        }
    }

    pub fn with_store<T: Any>(name: impl Into<Cow<'static, str>>, store: T) -> Component {
        Component {
            inner: Rc::new(ComponentInner {
                name: name.into(),
                store: Some(Rc::new(store)),
                pair: None,
            }),
        }
    }

    pub(crate) fn new_pair(relation: &Relation, target: Target, store: Option<Rc<dyn Any>>) -> Component {
        Component {
            inner: Rc::new(ComponentInner {
                name: format!("{}({})", relation.name(), target).into(),
                store,
                pair: Some(PairInfo {
                    relation: relation.clone(),
                    target,
                }),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn store<T: Any>(&self) -> Option<&T> {
        self.inner.store.as_deref()?.downcast_ref::<T>()
    }

    pub fn is_pair(&self) -> bool {
        self.inner.pair.is_some()
    }

    /// Owning relation of a pair component. The pair keeps it alive.
    pub fn relation(&self) -> Option<&Relation> {
        self.inner.pair.as_ref().map(|it| &it.relation)
    }

    pub fn target(&self) -> Option<&Target> {
        self.inner.pair.as_ref().map(|it| &it.target)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.inner) as *const () as usize).hash(state)
    }
}

impl Display for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner.name)
    }
}

impl Debug for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Component({})", self.inner.name)
    }
}
