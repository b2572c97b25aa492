//! Deterministic entity identifiers.
//!
//! Every id is a pure function of event fields, so re-delivery of an event
//! always resolves to the same entities. Positions use the composite
//! `vault-account-tokenId` scheme: a numeric token id alone would collide
//! when two vaults (or, degenerately, two users within one vault's
//! numbering) reuse the same id.
//!
//! The owning account for vault-scoped events is resolved from the
//! transaction sender. That is an approximation: the true owner can differ
//! when the call goes through a relayer or a smart account.

use crate::domain::{Address, TokenId, TxHash};

/// Account id: the owning external address.
pub fn account_id(owner: &Address) -> String {
    owner.as_str().to_string()
}

/// Vault id: the vault contract address.
pub fn vault_id(vault: &Address) -> String {
    vault.as_str().to_string()
}

/// VaultDeposit id: one row per (vault, account) relationship.
pub fn vault_deposit_id(vault: &Address, account: &Address) -> String {
    format!("{}-{}", vault.as_str(), account.as_str())
}

/// Position id: composite of (vault, account, token id).
pub fn position_id(vault: &Address, account: &Address, token_id: TokenId) -> String {
    format!("{}-{}-{}", vault.as_str(), account.as_str(), token_id)
}

/// Audit record key: (transaction hash, log index), unique per chain event.
pub fn event_record_id(tx_hash: &TxHash, log_index: u32) -> String {
    format!("{}-{}", tx_hash.as_str(), log_index)
}
