use base58::{FromBase58 as _, ToBase58 as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a linked chain taking part in cross-chain indexing.
///
/// Chain ids are plain `i32` values on the wire but are always rendered in
/// their base58 form in logs, e.g. `9992731` is `AELF`.
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct ChainId(pub i32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainIdParseError {
    #[error("invalid base58 chain id `{0}`")]
    InvalidBase58(String),
    #[error("chain id `{input}` decodes to {len} bytes, at most 4 are allowed")]
    TooLong { input: String, len: usize },
}

impl ChainId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Little-endian bytes of the id, base58 encoded. A zero high byte is
    /// dropped so that 3-byte ids produce their short readable form.
    pub fn to_base58(&self) -> String {
        let bytes = self.0.to_le_bytes();
        let len = if bytes[3] == 0 { 3 } else { 4 };
        bytes[..len].to_base58()
    }

    pub fn from_base58(s: &str) -> Result<Self, ChainIdParseError> {
        let decoded = s
            .from_base58()
            .map_err(|_| ChainIdParseError::InvalidBase58(s.to_owned()))?;
        if decoded.len() > 4 {
            return Err(ChainIdParseError::TooLong {
                input: s.to_owned(),
                len: decoded.len(),
            });
        }
        let mut bytes = [0_u8; 4];
        bytes[..decoded.len()].copy_from_slice(&decoded);
        Ok(Self(i32::from_le_bytes(bytes)))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({}:{})", self.0, self.to_base58())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(9_992_731, "AELF")]
    #[case(1_866_392, "tDVV")]
    fn renders_known_chain_ids(#[case] id: i32, #[case] expected: &str) {
        let chain_id = ChainId::new(id);
        assert_eq!(chain_id.to_string(), expected);
        assert_eq!(ChainId::from_base58(expected).unwrap(), chain_id);
    }

    #[test]
    fn four_byte_ids_survive_a_round_trip() {
        let chain_id = ChainId::new(i32::MAX);
        assert_eq!(ChainId::from_base58(&chain_id.to_base58()).unwrap(), chain_id);
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(
            ChainId::from_base58("0OIl"),
            Err(ChainIdParseError::InvalidBase58("0OIl".to_owned()))
        );
        let too_long = [1_u8; 5].to_base58();
        assert!(matches!(
            ChainId::from_base58(&too_long),
            Err(ChainIdParseError::TooLong { len: 5, .. })
        ));
    }
}
