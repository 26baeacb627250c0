use crate::{BlockHeight, ChainId, UnixTimestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chain id to indexed height, as recorded by the cross-chain registry
/// contract at one specific block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainIdHeightPairs {
    pub id_height_dict: BTreeMap<ChainId, BlockHeight>,
}

impl ChainIdHeightPairs {
    pub fn new(id_height_dict: BTreeMap<ChainId, BlockHeight>) -> Self {
        Self { id_height_dict }
    }

    pub fn len(&self) -> usize {
        self.id_height_dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_height_dict.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChainId, BlockHeight)> + '_ {
        self.id_height_dict
            .iter()
            .map(|(chain_id, height)| (*chain_id, *height))
    }
}

impl FromIterator<(ChainId, BlockHeight)> for ChainIdHeightPairs {
    fn from_iter<T: IntoIterator<Item = (ChainId, BlockHeight)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Bootstrap data a newly registered chain needs from the registry contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInitializationData {
    pub chain_id: ChainId,
    /// Base58 address of the account that proposed the chain.
    pub creator: String,
    pub creation_timestamp: UnixTimestamp,
    pub creation_height_on_parent_chain: BlockHeight,
    pub chain_creator_privilege_preserved: bool,
    pub consensus_info: Vec<u8>,
    pub native_token_info: Vec<u8>,
}
