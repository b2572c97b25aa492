//! Append-only audit records.
//!
//! Configuration-change records capture each delivered update event with
//! its payload and block timestamp; they are never read back by the
//! projector and never updated. Factory event mirrors are 1:1 copies of
//! the factory-level stream.

use crate::domain::{identity, Address, Amount, EventMeta, Timestamp};
use serde::{Deserialize, Serialize};

/// Audit record for a TreasuryUpdated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryUpdate {
    pub event_key: String,
    pub vault: Address,
    pub treasury: Address,
    pub treasury_fee_percent: Amount,
    pub block_timestamp: Timestamp,
}

/// Audit record for a TokenPairUpdated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPairUpdate {
    pub event_key: String,
    pub vault: Address,
    pub token0: Address,
    pub token1: Address,
    pub block_timestamp: Timestamp,
}

/// Audit record for an AmountLimitsUpdated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountLimitsUpdate {
    pub event_key: String,
    pub vault: Address,
    pub min_amount0: Amount,
    pub max_amount0: Amount,
    pub min_amount1: Amount,
    pub max_amount1: Amount,
    pub block_timestamp: Timestamp,
}

/// Kind discriminator for factory event mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FactoryEventKind {
    AccountDeployed,
    VaultAdded,
    VaultRemoved,
    WalletOwnershipSet,
}

impl FactoryEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactoryEventKind::AccountDeployed => "accountDeployed",
            FactoryEventKind::VaultAdded => "vaultAdded",
            FactoryEventKind::VaultRemoved => "vaultRemoved",
            FactoryEventKind::WalletOwnershipSet => "walletOwnershipSet",
        }
    }
}

/// 1:1 mirror of a factory-level event. Pure audit trail; no derived-state
/// role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryEventRecord {
    pub event_key: String,
    pub kind: FactoryEventKind,
    pub owner: Option<Address>,
    pub wallet: Option<Address>,
    pub account: Option<Address>,
    pub vault: Option<Address>,
    pub block_number: u64,
    pub block_timestamp: Timestamp,
}

impl FactoryEventRecord {
    /// Empty mirror for the given event's metadata; callers fill the
    /// kind-specific payload fields.
    pub fn from_meta(meta: &EventMeta, kind: FactoryEventKind) -> Self {
        FactoryEventRecord {
            event_key: identity::event_record_id(&meta.tx_hash, meta.log_index),
            kind,
            owner: None,
            wallet: None,
            account: None,
            vault: None,
            block_number: meta.block_number,
            block_timestamp: meta.block_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TxHash;

    #[test]
    fn test_factory_event_kind_strings() {
        assert_eq!(FactoryEventKind::AccountDeployed.as_str(), "accountDeployed");
        assert_eq!(FactoryEventKind::VaultRemoved.as_str(), "vaultRemoved");
    }

    #[test]
    fn test_mirror_takes_key_from_meta() {
        let meta = EventMeta {
            emitter: Address::new("0xfac"),
            tx_sender: Address::new("0xaaa"),
            tx_hash: TxHash::new("0xbeef"),
            log_index: 4,
            block_number: 100,
            block_timestamp: Timestamp::new(1_700_000_000),
        };
        let record = FactoryEventRecord::from_meta(&meta, FactoryEventKind::VaultAdded);
        assert_eq!(record.event_key, "0xbeef-4");
        assert_eq!(record.block_number, 100);
        assert!(record.vault.is_none());
    }
}
