pub(crate) mod component_registry;
pub(crate) mod entity_component_index;
pub(crate) mod entity_index;
pub(crate) mod entity_masks;
pub(crate) mod filter;
pub(crate) mod filter_manager;
pub(crate) mod relation_graph;
pub(crate) mod relation_index;
pub(crate) mod world_configure;
pub(crate) mod world_core;
pub(crate) mod world_query;
