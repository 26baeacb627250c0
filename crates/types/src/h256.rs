use base58::{FromBase58 as _, ToBase58 as _};
use fixed_hash::construct_fixed_hash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

construct_fixed_hash! {
    /// A 256-bit hash, displayed and serialized as base58.
    pub struct H256(32);
}

/// Hash identifying a block of the local chain.
pub type BlockHash = H256;

impl H256 {
    pub fn to_base58(&self) -> String {
        self.0.to_base58()
    }

    pub fn from_base58(s: &str) -> eyre::Result<Self> {
        let bytes = s
            .from_base58()
            .map_err(|e| eyre::eyre!("failed to decode H256 from base58: {e:?}"))?;
        eyre::ensure!(
            bytes.len() == 32,
            "expected 32 bytes for H256, found {}",
            bytes.len()
        );
        Ok(Self::from_slice(&bytes))
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}
