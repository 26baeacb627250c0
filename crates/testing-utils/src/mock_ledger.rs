use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use xchain_types::{
    Block, BlockHash, BlockHeight, ChainId, ChainIdHeightPairs, ChainInitializationData,
    ChainStateReader, ChainStateReaderFactory, CrossChainError, CrossChainResult,
    IrreversibleBlockStateProvider, LibIdHeight, UnixTimestamp,
};

/// Collaborator call that [`MockLedger::inject_failure`] can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    ValidateIrreversibleBlockExisting,
    GetLastIrreversibleBlock,
    GetNotIndexedBlock,
    GetAllChainsIdAndHeight,
    GetChainInitializationData,
}

#[derive(Debug, Default)]
struct Snapshot {
    chains: ChainIdHeightPairs,
    initialization_data: BTreeMap<ChainId, ChainInitializationData>,
}

#[derive(Debug, Default)]
struct LedgerState {
    ready: bool,
    lib: Option<LibIdHeight>,
    snapshots: HashMap<(BlockHash, BlockHeight), Snapshot>,
    blocks: BTreeMap<BlockHeight, Block>,
    failures: HashMap<MockOperation, VecDeque<CrossChainError>>,
    created_readers: Vec<(BlockHash, BlockHeight)>,
}

/// In-memory ledger implementing both [`IrreversibleBlockStateProvider`] and
/// [`ChainStateReaderFactory`].
///
/// Registry state is stored per `(block_hash, block_height)` snapshot, so a
/// reader only sees what was inserted for the exact block it was created for.
/// Clones share state, which lets a test keep scripting the ledger after
/// handing it to a service.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ready ledger whose LIB is `(block_hash, block_height)`, with the given
    /// chain table recorded at that block.
    pub fn ready_at(
        block_hash: BlockHash,
        block_height: BlockHeight,
        chains: impl IntoIterator<Item = (ChainId, BlockHeight)>,
    ) -> Self {
        let ledger = Self::new();
        ledger.set_lib(block_hash, block_height);
        ledger.insert_snapshot(block_hash, block_height, chains);
        ledger
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.write().unwrap().ready = ready;
    }

    /// Moves the LIB pointer and marks the ledger ready.
    pub fn set_lib(&self, block_hash: BlockHash, block_height: BlockHeight) {
        let mut state = self.state.write().unwrap();
        state.ready = true;
        state.lib = Some(LibIdHeight::new(block_hash, block_height));
    }

    pub fn insert_snapshot(
        &self,
        block_hash: BlockHash,
        block_height: BlockHeight,
        chains: impl IntoIterator<Item = (ChainId, BlockHeight)>,
    ) {
        let mut state = self.state.write().unwrap();
        state
            .snapshots
            .entry((block_hash, block_height))
            .or_default()
            .chains = chains.into_iter().collect();
    }

    pub fn insert_initialization_data(
        &self,
        block_hash: BlockHash,
        block_height: BlockHeight,
        data: ChainInitializationData,
    ) {
        let mut state = self.state.write().unwrap();
        state
            .snapshots
            .entry((block_hash, block_height))
            .or_default()
            .initialization_data
            .insert(data.chain_id, data);
    }

    pub fn insert_block(&self, block: Block) {
        self.state
            .write()
            .unwrap()
            .blocks
            .insert(block.height, block);
    }

    /// Makes the next call of `operation` fail with `error`. Queued failures
    /// are consumed one per call.
    pub fn inject_failure(&self, operation: MockOperation, error: CrossChainError) {
        self.state
            .write()
            .unwrap()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Snapshots readers were created for, in creation order.
    pub fn created_readers(&self) -> Vec<(BlockHash, BlockHeight)> {
        self.state.read().unwrap().created_readers.clone()
    }

    fn take_failure(&self, operation: MockOperation) -> CrossChainResult<()> {
        let mut state = self.state.write().unwrap();
        match state
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl IrreversibleBlockStateProvider for MockLedger {
    async fn validate_irreversible_block_existing(&self) -> CrossChainResult<bool> {
        self.take_failure(MockOperation::ValidateIrreversibleBlockExisting)?;
        let state = self.state.read().unwrap();
        Ok(state.ready && state.lib.is_some())
    }

    async fn get_last_irreversible_block_hash_and_height(&self) -> CrossChainResult<LibIdHeight> {
        self.take_failure(MockOperation::GetLastIrreversibleBlock)?;
        let state = self.state.read().unwrap();
        state
            .lib
            .filter(|_| state.ready)
            .ok_or(CrossChainError::NotReady)
    }

    async fn get_not_indexed_irreversible_block_by_height(
        &self,
        height: BlockHeight,
    ) -> CrossChainResult<Option<Block>> {
        self.take_failure(MockOperation::GetNotIndexedBlock)?;
        Ok(self.state.read().unwrap().blocks.get(&height).cloned())
    }
}

impl ChainStateReaderFactory for MockLedger {
    type Reader = MockChainStateReader;

    fn create(&self, block_hash: BlockHash, block_height: BlockHeight) -> Self::Reader {
        self.state
            .write()
            .unwrap()
            .created_readers
            .push((block_hash, block_height));
        MockChainStateReader {
            ledger: self.clone(),
            block_hash,
            block_height,
        }
    }
}

/// Reader bound to one snapshot of a [`MockLedger`].
#[derive(Debug, Clone)]
pub struct MockChainStateReader {
    ledger: MockLedger,
    block_hash: BlockHash,
    block_height: BlockHeight,
}

impl MockChainStateReader {
    fn with_snapshot<T>(
        &self,
        f: impl FnOnce(&Snapshot) -> CrossChainResult<T>,
    ) -> CrossChainResult<T> {
        let state = self.ledger.state.read().unwrap();
        let snapshot = state
            .snapshots
            .get(&(self.block_hash, self.block_height))
            .ok_or(CrossChainError::SnapshotNotFound {
                block_hash: self.block_hash,
                block_height: self.block_height,
            })?;
        f(snapshot)
    }
}

#[async_trait::async_trait]
impl ChainStateReader for MockChainStateReader {
    async fn get_all_chains_id_and_height(&self) -> CrossChainResult<ChainIdHeightPairs> {
        self.ledger.take_failure(MockOperation::GetAllChainsIdAndHeight)?;
        self.with_snapshot(|snapshot| Ok(snapshot.chains.clone()))
    }

    async fn get_chain_initialization_data(
        &self,
        chain_id: ChainId,
    ) -> CrossChainResult<ChainInitializationData> {
        self.ledger.take_failure(MockOperation::GetChainInitializationData)?;
        self.with_snapshot(|snapshot| {
            snapshot
                .initialization_data
                .get(&chain_id)
                .cloned()
                .ok_or(CrossChainError::ChainNotFound(chain_id))
        })
    }
}

/// Plausible initialization data for `chain_id`.
pub fn sample_initialization_data(chain_id: ChainId) -> ChainInitializationData {
    ChainInitializationData {
        chain_id,
        creator: "2XDRhxzMbaYRCTe3NxRpARkBpjfQpyWdBKscQpc3Tph3m6dqHG".to_owned(),
        creation_timestamp: UnixTimestamp::from_secs(1_600_000_000),
        creation_height_on_parent_chain: 120,
        chain_creator_privilege_preserved: false,
        consensus_info: vec![1, 2, 3],
        native_token_info: b"ELF".to_vec(),
    }
}
