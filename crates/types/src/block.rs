use crate::{BlockHash, ChainId, H256};
use serde::{Deserialize, Serialize};

pub type BlockHeight = u64;

/// Height of the first block of any chain. Heights below it are never
/// actionable for cross-chain indexing.
pub const GENESIS_BLOCK_HEIGHT: BlockHeight = 1;

/// Target height reported for a chain id the cache has never seen.
pub const UNKNOWN_CHAIN_TARGET_HEIGHT: BlockHeight = 0;

/// The node's last irreversible block pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibIdHeight {
    pub block_hash: BlockHash,
    pub block_height: BlockHeight,
}

impl LibIdHeight {
    pub fn new(block_hash: BlockHash, block_height: BlockHeight) -> Self {
        Self {
            block_hash,
            block_height,
        }
    }
}

/// An irreversible block of the local chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub hash: BlockHash,
    pub previous_block_hash: BlockHash,
    pub height: BlockHeight,
    pub chain_id: ChainId,
    pub transaction_ids: Vec<H256>,
}

/// A pending entry in a chain's cache window: block data produced by a
/// linked chain that the local chain has not indexed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCacheEntity {
    pub chain_id: ChainId,
    pub height: BlockHeight,
    pub block_hash: BlockHash,
    pub transaction_status_merkle_root: H256,
}
