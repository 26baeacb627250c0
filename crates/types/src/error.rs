use crate::{BlockHash, BlockHeight, ChainId};

/// Errors surfaced by the irreversible block provider, the state readers and
/// the cross-chain orchestrator built on top of them.
///
/// A block that has not been produced yet is not an error; it is reported as
/// `None` by [`crate::IrreversibleBlockStateProvider`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrossChainError {
    #[error("irreversible block state is not ready yet")]
    NotReady,
    #[error("chain {0} is unknown to the registry contract")]
    ChainNotFound(ChainId),
    #[error("no state snapshot for block {} at height {block_height}", block_hash.to_base58())]
    SnapshotNotFound {
        block_hash: BlockHash,
        block_height: BlockHeight,
    },
    #[error("transient I/O failure: {0}")]
    TransientIo(String),
    #[error("cross-chain service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl CrossChainError {
    /// Whether a later call with the same inputs may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NotReady | Self::TransientIo(_) | Self::ServiceUnavailable(_)
        )
    }
}

pub type CrossChainResult<T> = Result<T, CrossChainError>;
