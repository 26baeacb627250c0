use std::collections::BTreeMap;
use xchain_types::{BlockCacheEntity, BlockHeight, ChainId, GENESIS_BLOCK_HEIGHT};

/// Cache state of one linked chain: where it was registered, the next height
/// to request from it, and the window of entries it produced that the local
/// chain has not indexed yet.
///
/// `target_height` never decreases. Registration sets it once; afterwards only
/// accepted entries and eviction move it forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainCacheEntity {
    chain_id: ChainId,
    registered_height: BlockHeight,
    target_height: BlockHeight,
    cached_entries: BTreeMap<BlockHeight, BlockCacheEntity>,
    capacity: usize,
}

impl ChainCacheEntity {
    pub fn new(chain_id: ChainId, height: BlockHeight, capacity: usize) -> Self {
        Self {
            chain_id,
            registered_height: height,
            target_height: height,
            cached_entries: BTreeMap::new(),
            capacity,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn registered_height(&self) -> BlockHeight {
        self.registered_height
    }

    pub fn target_height(&self) -> BlockHeight {
        self.target_height
    }

    pub fn len(&self) -> usize {
        self.cached_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cached_entries.is_empty()
    }

    /// Appends `entity` if it is the next expected height for this chain and
    /// the window has room. Returns whether the entry was accepted.
    pub fn try_add(&mut self, entity: BlockCacheEntity) -> bool {
        if entity.chain_id != self.chain_id
            || entity.height != self.target_height
            || self.cached_entries.len() >= self.capacity
        {
            return false;
        }
        self.cached_entries.insert(entity.height, entity);
        self.target_height = self.target_height.saturating_add(1);
        true
    }

    pub fn try_get(&self, height: BlockHeight) -> Option<BlockCacheEntity> {
        self.cached_entries.get(&height).cloned()
    }

    /// Drops every entry at or below `height` and returns how many were
    /// removed. Heights up to `height` are indexed, so they are never
    /// requested again. A height below genesis means the chain has nothing
    /// indexed yet and leaves the target alone.
    pub fn clear_out_of_date(&mut self, height: BlockHeight) -> usize {
        let before = self.cached_entries.len();
        match height.checked_add(1) {
            Some(next) => {
                // split_off keeps keys >= next in the returned map
                self.cached_entries = self.cached_entries.split_off(&next);
                if height >= GENESIS_BLOCK_HEIGHT {
                    self.target_height = self.target_height.max(next);
                }
            }
            None => {
                self.cached_entries.clear();
                self.target_height = BlockHeight::MAX;
            }
        }
        before - self.cached_entries.len()
    }

    pub fn cached_heights(&self) -> Vec<BlockHeight> {
        self.cached_entries.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use xchain_types::H256;

    const CHAIN: ChainId = ChainId::new(7);

    fn entity(chain_id: ChainId, height: BlockHeight) -> BlockCacheEntity {
        BlockCacheEntity {
            chain_id,
            height,
            block_hash: H256::from_low_u64_be(height),
            transaction_status_merkle_root: H256::zero(),
        }
    }

    fn filled(from: BlockHeight, to: BlockHeight) -> ChainCacheEntity {
        let mut record = ChainCacheEntity::new(CHAIN, from, 64);
        for height in from..=to {
            assert!(record.try_add(entity(CHAIN, height)));
        }
        record
    }

    #[test]
    fn new_record_targets_registration_height() {
        let record = ChainCacheEntity::new(CHAIN, 10, 8);
        assert_eq!(record.registered_height(), 10);
        assert_eq!(record.target_height(), 10);
        assert!(record.is_empty());
    }

    #[test]
    fn try_add_accepts_only_the_next_height() {
        let mut record = ChainCacheEntity::new(CHAIN, 10, 8);

        assert!(!record.try_add(entity(CHAIN, 11)));
        assert!(!record.try_add(entity(ChainId::new(8), 10)));
        assert!(record.try_add(entity(CHAIN, 10)));
        assert!(!record.try_add(entity(CHAIN, 10)));
        assert!(record.try_add(entity(CHAIN, 11)));

        assert_eq!(record.target_height(), 12);
        assert_eq!(record.cached_heights(), vec![10, 11]);
        assert_eq!(record.try_get(11), Some(entity(CHAIN, 11)));
        assert_eq!(record.try_get(12), None);
    }

    #[test]
    fn try_add_respects_capacity() {
        let mut record = ChainCacheEntity::new(CHAIN, 1, 2);
        assert!(record.try_add(entity(CHAIN, 1)));
        assert!(record.try_add(entity(CHAIN, 2)));
        assert!(!record.try_add(entity(CHAIN, 3)));
        assert_eq!(record.target_height(), 3);

        assert_eq!(record.clear_out_of_date(1), 1);
        assert!(record.try_add(entity(CHAIN, 3)));
    }

    #[rstest]
    #[case(9, vec![10, 11, 12, 13, 14], 15)]
    #[case(10, vec![11, 12, 13, 14], 15)]
    #[case(12, vec![13, 14], 15)]
    #[case(14, vec![], 15)]
    #[case(20, vec![], 21)]
    fn clear_out_of_date_removes_at_or_below(
        #[case] height: BlockHeight,
        #[case] remaining: Vec<BlockHeight>,
        #[case] target: BlockHeight,
    ) {
        let mut record = filled(10, 14);
        let removed = record.clear_out_of_date(height);

        assert_eq!(removed, 5 - remaining.len());
        assert_eq!(record.cached_heights(), remaining);
        assert_eq!(record.target_height(), target);
    }

    #[test]
    fn target_height_never_decreases() {
        let mut record = ChainCacheEntity::new(CHAIN, 10, 8);
        record.clear_out_of_date(15);
        assert_eq!(record.target_height(), 16);
        record.clear_out_of_date(3);
        assert_eq!(record.target_height(), 16);
    }

    #[test]
    fn clear_out_of_date_on_empty_window_is_harmless() {
        let mut record = ChainCacheEntity::new(CHAIN, 5, 8);
        assert_eq!(record.clear_out_of_date(5), 0);
        assert_eq!(record.target_height(), 6);
        assert_eq!(record.clear_out_of_date(BlockHeight::MAX), 0);
        assert_eq!(record.target_height(), BlockHeight::MAX);
    }

    #[test]
    fn clear_below_genesis_keeps_target() {
        let mut record = ChainCacheEntity::new(CHAIN, 0, 8);
        assert_eq!(record.clear_out_of_date(0), 0);
        assert_eq!(record.target_height(), 0);
        assert_eq!(record.registered_height(), 0);

        assert_eq!(record.clear_out_of_date(GENESIS_BLOCK_HEIGHT), 0);
        assert_eq!(record.target_height(), GENESIS_BLOCK_HEIGHT + 1);
    }
}
