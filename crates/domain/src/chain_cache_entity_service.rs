use crate::ChainCacheEntity;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, trace};
use xchain_types::{BlockCacheEntity, BlockHeight, ChainId, UNKNOWN_CHAIN_TARGET_HEIGHT};

/// Registry of every linked chain the node tracks, one [`ChainCacheEntity`]
/// per chain id.
///
/// Records live in a sharded map. Each operation touches a single chain
/// through one entry guard, so updates to the same chain are linearizable
/// while unrelated chains proceed in parallel. Guards are never held across
/// an `.await`; none of these methods are async.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone)]
pub struct ChainCacheEntityService {
    chains: Arc<DashMap<ChainId, ChainCacheEntity>>,
    max_cached_entries_per_chain: usize,
}

impl ChainCacheEntityService {
    pub fn new(max_cached_entries_per_chain: usize) -> Self {
        Self {
            chains: Arc::new(DashMap::new()),
            max_cached_entries_per_chain,
        }
    }

    /// Starts tracking `chain_id` with `height` as its first target. Does
    /// nothing if the chain is already tracked, whatever `height` is.
    pub fn register_new_chain(&self, chain_id: ChainId, height: BlockHeight) {
        self.chains.entry(chain_id).or_insert_with(|| {
            debug!(%chain_id, height, "registering chain");
            ChainCacheEntity::new(chain_id, height, self.max_cached_entries_per_chain)
        });
    }

    pub fn get_cached_chain_ids(&self) -> BTreeSet<ChainId> {
        self.chains.iter().map(|record| *record.key()).collect()
    }

    /// Next height needed from `chain_id`, or [`UNKNOWN_CHAIN_TARGET_HEIGHT`]
    /// (below genesis) if the chain is not tracked.
    pub fn get_target_height_for_chain_cache_entity(&self, chain_id: ChainId) -> BlockHeight {
        self.chains
            .get(&chain_id)
            .map_or(UNKNOWN_CHAIN_TARGET_HEIGHT, |record| record.target_height())
    }

    /// Evicts entries of `chain_id` at or below `height`. Unknown chains are
    /// ignored.
    pub fn clear_out_of_date_cross_chain_cache(&self, chain_id: ChainId, height: BlockHeight) {
        if let Some(mut record) = self.chains.get_mut(&chain_id) {
            let removed = record.clear_out_of_date(height);
            trace!(%chain_id, height, removed, "evicted cached entries");
        }
    }

    /// Registers `chain_id` at `height` if it is new, then evicts its entries
    /// at or below `height`. Both steps run under the same entry guard, so no
    /// other update to the chain can land between them.
    pub fn register_and_clear_out_of_date(
        &self,
        chain_id: ChainId,
        height: BlockHeight,
    ) -> usize {
        let mut record = self.chains.entry(chain_id).or_insert_with(|| {
            debug!(%chain_id, height, "registering chain");
            ChainCacheEntity::new(chain_id, height, self.max_cached_entries_per_chain)
        });
        let removed = record.clear_out_of_date(height);
        trace!(%chain_id, height, removed, "evicted cached entries");
        removed
    }

    /// Offers a pending entry to its chain's window. Returns false when the
    /// chain is unknown or the window rejects it.
    pub fn try_add_block_cache_entity(&self, entity: BlockCacheEntity) -> bool {
        self.chains
            .get_mut(&entity.chain_id)
            .is_some_and(|mut record| record.try_add(entity))
    }

    pub fn try_get_block_cache_entity(
        &self,
        chain_id: ChainId,
        height: BlockHeight,
    ) -> Option<BlockCacheEntity> {
        self.chains
            .get(&chain_id)
            .and_then(|record| record.try_get(height))
    }

    pub fn cached_heights(&self, chain_id: ChainId) -> Vec<BlockHeight> {
        self.chains
            .get(&chain_id)
            .map(|record| record.cached_heights())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xchain_types::{H256, GENESIS_BLOCK_HEIGHT};

    fn entity(chain_id: ChainId, height: BlockHeight) -> BlockCacheEntity {
        BlockCacheEntity {
            chain_id,
            height,
            block_hash: H256::from_low_u64_be(height),
            transaction_status_merkle_root: H256::zero(),
        }
    }

    fn fill(service: &ChainCacheEntityService, chain_id: ChainId, count: u64) {
        let start = service.get_target_height_for_chain_cache_entity(chain_id);
        for height in start..start + count {
            assert!(service.try_add_block_cache_entity(entity(chain_id, height)));
        }
    }

    #[test]
    fn unknown_chain_reports_sentinel_below_genesis() {
        let service = ChainCacheEntityService::new(8);
        let target = service.get_target_height_for_chain_cache_entity(ChainId::new(42));

        assert_eq!(target, UNKNOWN_CHAIN_TARGET_HEIGHT);
        assert!(target < GENESIS_BLOCK_HEIGHT);
        assert!(service.is_empty());
    }

    #[test]
    fn register_new_chain_is_idempotent() {
        let service = ChainCacheEntityService::new(8);
        let chain_id = ChainId::new(7);

        service.register_new_chain(chain_id, 10);
        service.register_new_chain(chain_id, 10);
        service.register_new_chain(chain_id, 5);
        service.register_new_chain(chain_id, 99);

        assert_eq!(service.get_target_height_for_chain_cache_entity(chain_id), 10);
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn cached_chain_ids_ignore_cache_content() {
        let service = ChainCacheEntityService::new(8);
        service.register_new_chain(ChainId::new(3), 1);
        service.register_new_chain(ChainId::new(1), 0);
        fill(&service, ChainId::new(3), 2);

        assert_eq!(
            service.get_cached_chain_ids(),
            BTreeSet::from([ChainId::new(1), ChainId::new(3)])
        );
    }

    #[test]
    fn clear_removes_exactly_the_out_of_date_entries() {
        let service = ChainCacheEntityService::new(8);
        let chain_id = ChainId::new(7);
        let other = ChainId::new(8);
        service.register_new_chain(chain_id, 10);
        service.register_new_chain(other, 10);
        fill(&service, chain_id, 6);
        fill(&service, other, 3);

        service.clear_out_of_date_cross_chain_cache(chain_id, 12);

        assert_eq!(service.cached_heights(chain_id), vec![13, 14, 15]);
        assert_eq!(service.cached_heights(other), vec![10, 11, 12]);
        assert_eq!(service.try_get_block_cache_entity(chain_id, 12), None);
        assert_eq!(
            service.try_get_block_cache_entity(chain_id, 13),
            Some(entity(chain_id, 13))
        );
    }

    #[test]
    fn clear_on_unknown_chain_is_a_no_op() {
        let service = ChainCacheEntityService::new(8);
        service.clear_out_of_date_cross_chain_cache(ChainId::new(5), 100);

        assert!(service.is_empty());
        assert!(service.cached_heights(ChainId::new(5)).is_empty());
    }

    #[test]
    fn entities_for_unknown_chains_are_rejected() {
        let service = ChainCacheEntityService::new(8);
        assert!(!service.try_add_block_cache_entity(entity(ChainId::new(5), 0)));
        assert!(service.is_empty());
    }

    #[test]
    fn register_and_clear_handles_new_and_known_chains() {
        let service = ChainCacheEntityService::new(8);
        let known = ChainId::new(7);
        service.register_new_chain(known, 10);
        fill(&service, known, 4);

        assert_eq!(service.register_and_clear_out_of_date(known, 11), 2);
        assert_eq!(service.cached_heights(known), vec![12, 13]);
        assert_eq!(service.get_target_height_for_chain_cache_entity(known), 14);

        let fresh = ChainId::new(8);
        assert_eq!(service.register_and_clear_out_of_date(fresh, 30), 0);
        assert_eq!(service.get_target_height_for_chain_cache_entity(fresh), 31);

        // nothing indexed yet: tracked, but still below genesis
        let empty = ChainId::new(9);
        assert_eq!(service.register_and_clear_out_of_date(empty, 0), 0);
        assert_eq!(service.get_target_height_for_chain_cache_entity(empty), 0);
        assert_eq!(service.len(), 3);
    }

    #[test]
    fn clones_share_state() {
        let service = ChainCacheEntityService::new(8);
        let handle = service.clone();
        handle.register_new_chain(ChainId::new(9), 4);

        assert_eq!(
            service.get_target_height_for_chain_cache_entity(ChainId::new(9)),
            4
        );
    }

    #[test]
    fn concurrent_updates_on_disjoint_chains_match_sequential_application() {
        let service = ChainCacheEntityService::new(64);
        let chains = (1..=16).map(ChainId::new).collect::<Vec<_>>();

        std::thread::scope(|scope| {
            for &chain_id in &chains {
                let service = &service;
                scope.spawn(move || {
                    let base = u64::from(chain_id.value().unsigned_abs()) * 10;
                    service.register_new_chain(chain_id, base);
                    for round in 0..20_u64 {
                        let target = service.get_target_height_for_chain_cache_entity(chain_id);
                        assert!(service.try_add_block_cache_entity(entity(chain_id, target)));
                        if round % 4 == 3 {
                            service.clear_out_of_date_cross_chain_cache(chain_id, target - 1);
                        }
                        service.register_new_chain(chain_id, 0);
                    }
                });
            }
        });

        for &chain_id in &chains {
            let base = u64::from(chain_id.value().unsigned_abs()) * 10;
            // 20 accepted entries, the last eviction happened at base + 18
            assert_eq!(
                service.get_target_height_for_chain_cache_entity(chain_id),
                base + 20
            );
            assert_eq!(service.cached_heights(chain_id), vec![base + 19]);
        }
        assert_eq!(service.len(), chains.len());
    }
}
