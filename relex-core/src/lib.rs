#![allow(clippy::new_without_default)]

pub(crate) mod component;
pub(crate) mod entity_key;
pub(crate) mod filter;
pub(crate) mod internal;
pub(crate) mod relation;
pub(crate) mod utils;
pub(crate) mod world_result;

pub use component::*;
pub use entity_key::*;
pub use filter::filter_desc::QuerySignature;
pub use filter::not;
pub use filter::on_add;
pub use filter::on_remove;
pub use filter::or;
pub use filter::QueryHook;
pub use filter::QueryResult;
pub use filter::Term;
pub use internal::component_registry::ComponentData;
pub use internal::entity_index::EntityIndex;
pub use internal::entity_index::DEFAULT_VERSION_BITS;
pub use internal::filter_manager::QueryKey;
pub use internal::world_configure::ConfigurableWorld;
pub use internal::world_configure::WorldConfig;
pub use internal::world_core::World;
pub use relation::*;
pub use utils::observable::Unsubscribe;
pub use world_result::*;
