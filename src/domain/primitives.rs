//! Domain primitives: Address, TxHash, TokenId, Timestamp.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The all-zeroes placeholder used for not-yet-known addresses.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Contract or wallet address (lowercase hex string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Address(String);

// Wire input may carry checksummed (mixed-case) hex; identity derivation
// depends on the normalized form, so normalize on the way in.
impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Address::new(raw))
    }
}

impl Address {
    /// Create an Address, normalizing to lowercase.
    pub fn new(addr: impl Into<String>) -> Self {
        Address(addr.into().trim().to_lowercase())
    }

    /// The zero-address sentinel.
    pub fn zero() -> Self {
        Address(ZERO_ADDRESS.to_string())
    }

    /// True if this is the zero-address sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_ADDRESS
    }

    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address: {0}")]
pub struct AddressParseError(String);

impl FromStr for Address {
    type Err = AddressParseError;

    /// Parse and validate a 0x-prefixed 20-byte hex address.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError(s.to_string()))?;
        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressParseError(s.to_string()));
        }
        Ok(Address::new(trimmed))
    }
}

/// Transaction hash (lowercase hex string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TxHash(String);

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TxHash::new(raw))
    }
}

impl TxHash {
    /// Create a TxHash, normalizing to lowercase.
    pub fn new(hash: impl Into<String>) -> Self {
        TxHash(hash.into().trim().to_lowercase())
    }

    /// Get the hash as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NFT token id identifying one liquidity position within a vault.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TokenId(pub u64);

impl TokenId {
    pub fn new(id: u64) -> Self {
        TokenId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block timestamp in seconds since Unix epoch. Zero is the
/// not-yet-observed sentinel on entity timestamps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn new(secs: i64) -> Self {
        Timestamp(secs)
    }

    /// The not-yet-observed sentinel.
    pub fn zero() -> Self {
        Timestamp(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalizes_case() {
        let addr = Address::new("0xABCdef0000000000000000000000000000000001");
        assert_eq!(addr.as_str(), "0xabcdef0000000000000000000000000000000001");
    }

    #[test]
    fn test_zero_address_sentinel() {
        assert!(Address::zero().is_zero());
        assert!(!Address::new("0xabcdef0000000000000000000000000000000001").is_zero());
    }

    #[test]
    fn test_address_parse_rejects_garbage() {
        assert!(Address::from_str("not-an-address").is_err());
        assert!(Address::from_str("0x123").is_err());
        assert!(Address::from_str("0xgggggggggggggggggggggggggggggggggggggggg").is_err());
    }

    #[test]
    fn test_address_parse_accepts_checksummed() {
        let addr = Address::from_str("0xAbCdEF0000000000000000000000000000000001").unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0000000000000000000000000000000001");
    }

    #[test]
    fn test_tx_hash_normalizes() {
        let hash = TxHash::new(" 0xDEADBEEF ");
        assert_eq!(hash.as_str(), "0xdeadbeef");
    }

    #[test]
    fn test_address_deserialization_normalizes() {
        let addr: Address =
            serde_json::from_str("\"0xABCdef0000000000000000000000000000000001\"").unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0000000000000000000000000000000001");
    }

    #[test]
    fn test_timestamp_sentinel() {
        assert!(Timestamp::zero().is_zero());
        assert!(!Timestamp::new(1_700_000_000).is_zero());
    }

    #[test]
    fn test_token_id_display() {
        assert_eq!(TokenId::new(42).to_string(), "42");
    }
}
