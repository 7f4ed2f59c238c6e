use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;

/// Opaque entity identifier.
///
/// Without versioning the raw value is the slot index itself. With versioning
/// enabled the low bits hold the slot and the high bits a wrapping version
/// counter, see [`crate::EntityIndex::with_versioning`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    pub const fn from_raw(raw: u32) -> EntityId {
        EntityId(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Debug for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<EntityId> for u32 {
    fn from(value: EntityId) -> Self {
        value.0
    }
}
