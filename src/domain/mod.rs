//! Domain types for the derived entity graph.
//!
//! This module provides:
//! - Primitives: Address, TxHash, TokenId, Timestamp, lossless Amount
//! - Typed contract events with a shared metadata envelope
//! - Derived entities: Account, Vault, VaultDeposit, Position
//! - Append-only audit record types
//! - Deterministic identity and ordering helpers

pub mod amount;
pub mod audit;
pub mod entity;
pub mod event;
pub mod identity;
pub mod ordering;
pub mod primitives;

pub use amount::Amount;
pub use audit::{
    AmountLimitsUpdate, FactoryEventKind, FactoryEventRecord, TokenPairUpdate, TreasuryUpdate,
};
pub use entity::{Account, Position, PositionSeed, Vault, VaultDeposit, VaultDepositSeed};
pub use event::{DomainEvent, EventBody, EventMeta};
pub use ordering::{sort_events_deterministic, EventOrderingKey};
pub use primitives::{Address, AddressParseError, Timestamp, TokenId, TxHash, ZERO_ADDRESS};
