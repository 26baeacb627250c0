//! Shared types for cross-chain indexing: identifiers, block pointers, the
//! registry data model, configuration, errors and the interfaces the cache
//! orchestrator consumes from the rest of the node.
pub mod block;
pub mod block_provider;
pub mod chain_id;
pub mod config;
pub mod cross_chain;
pub mod error;
pub mod h256;
pub mod service_handle;
pub mod time;
pub mod traced;

pub use block::*;
pub use block_provider::*;
pub use chain_id::*;
pub use config::*;
pub use cross_chain::*;
pub use error::*;
pub use h256::*;
pub use service_handle::*;
pub use time::*;
pub use traced::*;
