//! Interfaces the cross-chain core consumes from the rest of the node. Kept in
//! `xchain-types` so implementations (the node's stores, the in-memory ledger
//! used in tests) do not depend on the orchestrator.

use crate::{
    Block, BlockHash, BlockHeight, ChainId, ChainIdHeightPairs, ChainInitializationData,
    CrossChainResult, LibIdHeight,
};

/// Access to the node's notion of finality.
#[async_trait::async_trait]
pub trait IrreversibleBlockStateProvider: Send + Sync {
    /// Whether enough local state exists to bootstrap the cross-chain cache
    /// (the chain is past genesis and has a committed irreversible block).
    async fn validate_irreversible_block_existing(&self) -> CrossChainResult<bool>;

    /// Current last irreversible block. Callers check readiness first.
    async fn get_last_irreversible_block_hash_and_height(&self) -> CrossChainResult<LibIdHeight>;

    /// An irreversible block not yet reflected in cross-chain indexing, or
    /// `None` if nothing has been produced at `height` yet.
    async fn get_not_indexed_irreversible_block_by_height(
        &self,
        height: BlockHeight,
    ) -> CrossChainResult<Option<Block>>;
}

/// Read-only view of the cross-chain registry contract, bound to the state
/// as of one block.
#[async_trait::async_trait]
pub trait ChainStateReader: Send + Sync {
    async fn get_all_chains_id_and_height(&self) -> CrossChainResult<ChainIdHeightPairs>;

    /// Fails with [`crate::CrossChainError::ChainNotFound`] when `chain_id` is
    /// unknown at the bound snapshot.
    async fn get_chain_initialization_data(
        &self,
        chain_id: ChainId,
    ) -> CrossChainResult<ChainInitializationData>;
}

/// Produces readers for a `(block_hash, block_height)` snapshot. Identical
/// inputs must yield identical results for the same ledger state.
pub trait ChainStateReaderFactory: Send + Sync {
    type Reader: ChainStateReader;

    fn create(&self, block_hash: BlockHash, block_height: BlockHeight) -> Self::Reader;
}
