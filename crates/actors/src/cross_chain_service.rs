use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use xchain_domain::{ChainCacheEntityService, CrossChainSyncState};
use xchain_types::{
    Block, BlockCacheEntity, BlockHash, BlockHeight, ChainId, ChainIdHeightPairs,
    ChainInitializationData, ChainStateReader as _, ChainStateReaderFactory, CrossChainConfig,
    CrossChainResult, IrreversibleBlockStateProvider, GENESIS_BLOCK_HEIGHT,
};

/// Result of one bootstrap attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSyncStatus {
    /// No irreversible block yet. Nothing was registered; call again later.
    Pending,
    Completed { chains_registered: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibSkipReason {
    /// Initial sync has not completed.
    Bootstrapping,
    AtOrBelowGenesis,
    /// A higher LIB height was already applied.
    Stale { last_applied: BlockHeight },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibUpdateOutcome {
    Skipped(LibSkipReason),
    Applied { chains: usize },
}

/// Keeps the per-chain cache in line with the local chain's finality.
///
/// Reads the registry contract as of an irreversible block through the
/// reader factory, registers chains it has not seen and evicts cached entries
/// the contract reports as already indexed. Provider and reader failures are
/// returned to the caller as-is; nothing here retries.
#[derive(Debug)]
pub struct CrossChainService<P, F> {
    block_state_provider: P,
    reader_factory: F,
    cache_entity_service: ChainCacheEntityService,
    sync_state: CrossChainSyncState,
}

impl<P, F> CrossChainService<P, F>
where
    P: IrreversibleBlockStateProvider,
    F: ChainStateReaderFactory,
{
    pub fn new(block_state_provider: P, reader_factory: F, config: &CrossChainConfig) -> Self {
        Self::with_parts(
            block_state_provider,
            reader_factory,
            ChainCacheEntityService::new(config.max_cached_entries_per_chain),
            CrossChainSyncState::new(config.data_validation_ignored),
        )
    }

    /// Builds the service around an existing cache and sync state, e.g. ones
    /// already shared with a validator.
    pub fn with_parts(
        block_state_provider: P,
        reader_factory: F,
        cache_entity_service: ChainCacheEntityService,
        sync_state: CrossChainSyncState,
    ) -> Self {
        Self {
            block_state_provider,
            reader_factory,
            cache_entity_service,
            sync_state,
        }
    }

    pub fn sync_state(&self) -> &CrossChainSyncState {
        &self.sync_state
    }

    pub fn cache_entity_service(&self) -> &ChainCacheEntityService {
        &self.cache_entity_service
    }

    /// Leaves the bootstrapping phase and seeds the cache from the chain table
    /// at the current LIB.
    ///
    /// Returns [`InitialSyncStatus::Pending`] without touching any state when
    /// irreversible state is not available yet. Safe to call repeatedly:
    /// chains that are already tracked are left as they are.
    #[tracing::instrument(level = "trace", skip_all)]
    pub async fn finish_initial_sync(&self) -> CrossChainResult<InitialSyncStatus> {
        if !self
            .block_state_provider
            .validate_irreversible_block_existing()
            .await?
        {
            debug!("Irreversible block state not ready, initial cross-chain sync pending");
            return Ok(InitialSyncStatus::Pending);
        }

        if self.sync_state.mark_ready() {
            info!("Initial sync finished, cross-chain data validation enabled");
        }

        let lib = self
            .block_state_provider
            .get_last_irreversible_block_hash_and_height()
            .await?;
        let chain_id_height_pairs = self
            .get_all_chain_id_height_pairs(lib.block_hash, lib.block_height)
            .await?;

        for (chain_id, height) in chain_id_height_pairs.iter() {
            self.cache_entity_service.register_new_chain(chain_id, height);
        }
        self.sync_state.try_advance_lib_height(lib.block_height);
        self.sync_state.mark_cache_seeded();

        info!(
            lib.height = lib.block_height,
            chains = chain_id_height_pairs.len(),
            "Cross-chain cache seeded"
        );
        Ok(InitialSyncStatus::Completed {
            chains_registered: chain_id_height_pairs.len(),
        })
    }

    /// Next height needed from every tracked chain. Chains whose target is
    /// below genesis are left out.
    pub fn get_needed_chain_id_and_height_pairs(&self) -> BTreeMap<ChainId, BlockHeight> {
        self.cache_entity_service
            .get_cached_chain_ids()
            .into_iter()
            .filter_map(|chain_id| {
                let height = self
                    .cache_entity_service
                    .get_target_height_for_chain_cache_entity(chain_id);
                (height >= GENESIS_BLOCK_HEIGHT).then_some((chain_id, height))
            })
            .collect()
    }

    /// `Ok(None)` means no block has been produced at `height` yet.
    pub async fn get_non_indexed_block(
        &self,
        height: BlockHeight,
    ) -> CrossChainResult<Option<Block>> {
        self.block_state_provider
            .get_not_indexed_irreversible_block_by_height(height)
            .await
    }

    /// Initialization data of `chain_id` as recorded at the current LIB.
    #[tracing::instrument(level = "trace", skip_all, fields(%chain_id))]
    pub async fn get_chain_initialization_data(
        &self,
        chain_id: ChainId,
    ) -> CrossChainResult<ChainInitializationData> {
        let lib = self
            .block_state_provider
            .get_last_irreversible_block_hash_and_height()
            .await?;
        self.reader_factory
            .create(lib.block_hash, lib.block_height)
            .get_chain_initialization_data(chain_id)
            .await
    }

    /// Applies a newly irreversible block: registers chains that appeared in
    /// the chain table and evicts what each chain reports as indexed.
    ///
    /// Chains are processed one by one. If the read succeeds the whole table
    /// is applied; there is no rollback of chains already processed.
    #[tracing::instrument(level = "trace", skip_all, fields(block.height = block_height))]
    pub async fn update_with_lib(
        &self,
        block_hash: BlockHash,
        block_height: BlockHeight,
    ) -> CrossChainResult<LibUpdateOutcome> {
        if self.sync_state.is_data_validation_ignored() {
            return Ok(LibUpdateOutcome::Skipped(LibSkipReason::Bootstrapping));
        }
        if block_height <= GENESIS_BLOCK_HEIGHT {
            return Ok(LibUpdateOutcome::Skipped(LibSkipReason::AtOrBelowGenesis));
        }
        let last_applied = self.sync_state.last_applied_lib_height();
        if block_height < last_applied {
            return Ok(skip_stale(block_height, last_applied));
        }

        let chain_id_height_pairs = self
            .get_all_chain_id_height_pairs(block_hash, block_height)
            .await?;

        // another update may have been applied while reading
        if !self.sync_state.try_advance_lib_height(block_height) {
            let last_applied = self.sync_state.last_applied_lib_height();
            return Ok(skip_stale(block_height, last_applied));
        }

        for (chain_id, height) in chain_id_height_pairs.iter() {
            self.cache_entity_service
                .register_and_clear_out_of_date(chain_id, height);
            debug!("Clear chain {} cache by height {}", chain_id, height);
        }

        Ok(LibUpdateOutcome::Applied {
            chains: chain_id_height_pairs.len(),
        })
    }

    /// Offers fetched block data to the chain's cache window.
    pub fn try_cache_block_data(&self, entity: BlockCacheEntity) -> bool {
        self.cache_entity_service.try_add_block_cache_entity(entity)
    }

    pub fn get_cached_block_data(
        &self,
        chain_id: ChainId,
        height: BlockHeight,
    ) -> Option<BlockCacheEntity> {
        self.cache_entity_service
            .try_get_block_cache_entity(chain_id, height)
    }

    async fn get_all_chain_id_height_pairs(
        &self,
        block_hash: BlockHash,
        block_height: BlockHeight,
    ) -> CrossChainResult<ChainIdHeightPairs> {
        self.reader_factory
            .create(block_hash, block_height)
            .get_all_chains_id_and_height()
            .await
    }
}

fn skip_stale(block_height: BlockHeight, last_applied: BlockHeight) -> LibUpdateOutcome {
    warn!(
        block.height = block_height,
        lib.last_applied = last_applied,
        "Ignoring stale LIB update"
    );
    LibUpdateOutcome::Skipped(LibSkipReason::Stale { last_applied })
}
