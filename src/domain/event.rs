//! Typed domain events.
//!
//! Decoding raw log data into these records happens upstream; the
//! projector consumes them as-is. Every event carries the same metadata
//! envelope plus a kind-specific payload.

use crate::domain::{identity, Address, Amount, Timestamp, TokenId, TxHash};
use serde::{Deserialize, Serialize};

/// Metadata shared by every contract log event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    /// Emitting contract: the vault for vault-scoped events, the factory
    /// for factory-scoped ones.
    pub emitter: Address,
    /// Top-level transaction sender, used as the position-owner proxy.
    pub tx_sender: Address,
    pub tx_hash: TxHash,
    pub log_index: u32,
    pub block_number: u64,
    pub block_timestamp: Timestamp,
}

impl EventMeta {
    /// Stable per-delivery key: (transaction hash, log index).
    pub fn event_key(&self) -> String {
        identity::event_record_id(&self.tx_hash, self.log_index)
    }
}

/// Kind-specific event payload, one variant per contract log kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventBody {
    #[serde(rename_all = "camelCase")]
    Minted { token_id: TokenId, liquidity: Amount },
    #[serde(rename_all = "camelCase")]
    Burned { token_id: TokenId },
    #[serde(rename_all = "camelCase")]
    LiquidityIncreased {
        token_id: TokenId,
        liquidity_added: Amount,
    },
    #[serde(rename_all = "camelCase")]
    LiquidityDecreased {
        token_id: TokenId,
        liquidity_removed: Amount,
    },
    #[serde(rename_all = "camelCase")]
    Rebalanced {
        old_token_id: TokenId,
        new_token_id: TokenId,
        new_liquidity: Amount,
    },
    #[serde(rename_all = "camelCase")]
    CollectFee {
        token_id: TokenId,
        treasury_amount0: Amount,
        treasury_amount1: Amount,
    },
    #[serde(rename_all = "camelCase")]
    TreasuryUpdated {
        treasury: Address,
        treasury_fee_percent: Amount,
    },
    #[serde(rename_all = "camelCase")]
    TokenPairUpdated { token0: Address, token1: Address },
    #[serde(rename_all = "camelCase")]
    AmountLimitsUpdated {
        min_amount0: Amount,
        max_amount0: Amount,
        min_amount1: Amount,
        max_amount1: Amount,
    },
    #[serde(rename_all = "camelCase")]
    AccountDeployed { owner: Address, account: Address },
    #[serde(rename_all = "camelCase")]
    VaultAdded { vault: Address },
    #[serde(rename_all = "camelCase")]
    VaultRemoved { vault: Address },
    #[serde(rename_all = "camelCase")]
    WalletOwnershipSet { owner: Address, wallet: Address },
}

impl EventBody {
    /// Event kind name as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            EventBody::Minted { .. } => "minted",
            EventBody::Burned { .. } => "burned",
            EventBody::LiquidityIncreased { .. } => "liquidityIncreased",
            EventBody::LiquidityDecreased { .. } => "liquidityDecreased",
            EventBody::Rebalanced { .. } => "rebalanced",
            EventBody::CollectFee { .. } => "collectFee",
            EventBody::TreasuryUpdated { .. } => "treasuryUpdated",
            EventBody::TokenPairUpdated { .. } => "tokenPairUpdated",
            EventBody::AmountLimitsUpdated { .. } => "amountLimitsUpdated",
            EventBody::AccountDeployed { .. } => "accountDeployed",
            EventBody::VaultAdded { .. } => "vaultAdded",
            EventBody::VaultRemoved { .. } => "vaultRemoved",
            EventBody::WalletOwnershipSet { .. } => "walletOwnershipSet",
        }
    }
}

/// One delivered contract log event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub meta: EventMeta,
    #[serde(flatten)]
    pub body: EventBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> EventMeta {
        EventMeta {
            emitter: Address::new("0x1111111111111111111111111111111111111111"),
            tx_sender: Address::new("0x2222222222222222222222222222222222222222"),
            tx_hash: TxHash::new("0xabc"),
            log_index: 2,
            block_number: 10,
            block_timestamp: Timestamp::new(1_700_000_000),
        }
    }

    #[test]
    fn test_event_key_shape() {
        assert_eq!(meta().event_key(), "0xabc-2");
    }

    #[test]
    fn test_event_json_roundtrip() {
        let event = DomainEvent {
            meta: meta(),
            body: EventBody::Minted {
                token_id: TokenId::new(7),
                liquidity: Amount::from(1_000u64),
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_event_kind_tag_on_wire() {
        let event = DomainEvent {
            meta: meta(),
            body: EventBody::VaultAdded {
                vault: Address::new("0x3333333333333333333333333333333333333333"),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "vaultAdded");
        assert_eq!(json["meta"]["logIndex"], 2);
    }

    #[test]
    fn test_rebalanced_payload_roundtrip() {
        let event = DomainEvent {
            meta: meta(),
            body: EventBody::Rebalanced {
                old_token_id: TokenId::new(1),
                new_token_id: TokenId::new(2),
                new_liquidity: Amount::from(100u64),
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["oldTokenId"], 1);
        assert_eq!(json["newLiquidity"], "100");
        let back: DomainEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
