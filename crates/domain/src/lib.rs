pub mod chain_cache_entity;
pub mod chain_cache_entity_service;
pub mod cross_chain_sync_state;

pub use chain_cache_entity::*;
pub use chain_cache_entity_service::*;
pub use cross_chain_sync_state::*;
