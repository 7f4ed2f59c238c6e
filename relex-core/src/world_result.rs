use crate::entity_key::EntityId;
use justerror::Error;

pub type WorldResult<T = ()> = Result<T, WorldError>;

#[Error]
#[derive(Eq, PartialEq)]
pub enum WorldError {
    Entity(#[from] EntityError),
    Relation(#[from] RelationError),
}

#[Error]
#[derive(Eq, PartialEq)]
pub enum EntityError {
    NotExists(EntityId),
    IsStale(EntityId),
}

#[Error]
#[derive(Eq, PartialEq)]
pub enum RelationError {
    TargetNotExists(EntityId),
}
