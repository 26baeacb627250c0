use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use xchain_types::BlockHeight;

/// Where the node stands with respect to cross-chain data validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Initial catch-up: incoming cross-chain data is not validated and LIB
    /// updates are ignored.
    Bootstrapping,
    /// Validation enforced and LIB updates drive eviction. Never left once
    /// entered.
    Ready,
}

/// Shared cross-chain sync state. Cheap to clone; all clones observe the same
/// flags, so external validators can hold one and branch on
/// [`Self::is_data_validation_ignored`].
#[derive(Clone, Debug)]
pub struct CrossChainSyncState {
    validation_ignored: Arc<AtomicBool>,
    cache_seeded: Arc<AtomicBool>,
    last_applied_lib_height: Arc<AtomicU64>,
}

impl CrossChainSyncState {
    pub fn new(data_validation_ignored: bool) -> Self {
        Self {
            validation_ignored: Arc::new(AtomicBool::new(data_validation_ignored)),
            cache_seeded: Arc::new(AtomicBool::new(false)),
            last_applied_lib_height: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        if self.is_data_validation_ignored() {
            SyncPhase::Bootstrapping
        } else {
            SyncPhase::Ready
        }
    }

    pub fn is_data_validation_ignored(&self) -> bool {
        self.validation_ignored.load(Ordering::SeqCst)
    }

    /// Publishes the transition to [`SyncPhase::Ready`]. Returns true only for
    /// the call that performed the transition.
    pub fn mark_ready(&self) -> bool {
        self.validation_ignored.swap(false, Ordering::SeqCst)
    }

    pub fn is_cache_seeded(&self) -> bool {
        self.cache_seeded.load(Ordering::SeqCst)
    }

    pub fn mark_cache_seeded(&self) {
        self.cache_seeded.store(true, Ordering::SeqCst);
    }

    /// Records `height` as the latest applied LIB height unless a higher one
    /// was already applied. Re-applying the current height is allowed.
    pub fn try_advance_lib_height(&self, height: BlockHeight) -> bool {
        let previous = self
            .last_applied_lib_height
            .fetch_max(height, Ordering::SeqCst);
        height >= previous
    }

    pub fn last_applied_lib_height(&self) -> BlockHeight {
        self.last_applied_lib_height.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_configured_phase() {
        assert_eq!(CrossChainSyncState::new(true).phase(), SyncPhase::Bootstrapping);
        assert_eq!(CrossChainSyncState::new(false).phase(), SyncPhase::Ready);
    }

    #[test]
    fn ready_transition_is_one_way_and_shared() {
        let state = CrossChainSyncState::new(true);
        let observer = state.clone();

        assert!(state.mark_ready());
        assert!(!state.mark_ready());
        assert_eq!(observer.phase(), SyncPhase::Ready);
        assert!(!observer.is_data_validation_ignored());
    }

    #[test]
    fn stale_lib_heights_are_refused() {
        let state = CrossChainSyncState::new(false);

        assert!(state.try_advance_lib_height(10));
        assert!(state.try_advance_lib_height(10));
        assert!(!state.try_advance_lib_height(9));
        assert!(state.try_advance_lib_height(12));
        assert_eq!(state.last_applied_lib_height(), 12);
    }

    #[test]
    fn cache_seeded_flag() {
        let state = CrossChainSyncState::new(true);
        assert!(!state.is_cache_seeded());
        state.clone().mark_cache_seeded();
        assert!(state.is_cache_seeded());
    }
}
