pub mod cross_chain_service;
pub mod cross_chain_sync_service;

pub use cross_chain_service::*;
pub use cross_chain_sync_service::*;
