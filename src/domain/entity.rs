//! Derived entities maintained by the projector.

use crate::domain::{identity, Address, Amount, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

/// An external address that owns deposits and positions.
///
/// Created on first reference from any event naming the address; never
/// deleted. `nonce` is bumped whenever one of the account's positions or
/// deposits changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub address: Address,
    /// Factory that deployed the account's smart wallet, zero until known.
    pub factory: Address,
    /// Deployed smart-account address, zero until known.
    pub smart_account: Address,
    pub nonce: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    /// Zero-valued account for the given owner address.
    pub fn with_defaults(owner: Address) -> Self {
        Account {
            id: identity::account_id(&owner),
            address: owner,
            factory: Address::zero(),
            smart_account: Address::zero(),
            nonce: 0,
            created_at: Timestamp::zero(),
            updated_at: Timestamp::zero(),
        }
    }
}

/// A liquidity-management vault contract instance.
///
/// Removal is logical: `active` flips to false but the row stays so history
/// remains queryable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub id: String,
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub treasury: Address,
    pub treasury_fee_percent: Amount,
    pub min_amount0: Amount,
    pub max_amount0: Amount,
    pub min_amount1: Amount,
    pub max_amount1: Amount,
    pub tick_spacing: i64,
    pub position_manager: Address,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Vault {
    /// Zero-valued vault for the given contract address.
    pub fn with_defaults(address: Address) -> Self {
        Vault {
            id: identity::vault_id(&address),
            address,
            token0: Address::zero(),
            token1: Address::zero(),
            treasury: Address::zero(),
            treasury_fee_percent: Amount::zero(),
            min_amount0: Amount::zero(),
            max_amount0: Amount::zero(),
            min_amount1: Amount::zero(),
            max_amount1: Amount::zero(),
            tick_spacing: 0,
            position_manager: Address::zero(),
            active: false,
            created_at: Timestamp::zero(),
            updated_at: Timestamp::zero(),
        }
    }
}

/// Seed naming one (vault, account) relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultDepositSeed {
    pub vault: Address,
    pub account: Address,
}

/// The aggregate relationship between one account and one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDeposit {
    pub id: String,
    pub vault: Address,
    pub account: Address,
    /// Count of this deposit's positions with `active = true`, maintained
    /// incrementally. Never negative.
    pub active_position_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VaultDeposit {
    pub fn with_defaults(seed: VaultDepositSeed) -> Self {
        VaultDeposit {
            id: identity::vault_deposit_id(&seed.vault, &seed.account),
            vault: seed.vault,
            account: seed.account,
            active_position_count: 0,
            created_at: Timestamp::zero(),
            updated_at: Timestamp::zero(),
        }
    }
}

/// Seed naming one position under the composite identity scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSeed {
    pub vault: Address,
    pub account: Address,
    pub token_id: TokenId,
}

/// A single liquidity position (by token id) owned by one account within
/// one vault.
///
/// Once retired (burn or rebalance migration) the id never hosts a live
/// position again; fee and liquidity history stays queryable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub token_id: TokenId,
    pub account: Address,
    pub vault: Address,
    /// Id of the owning VaultDeposit; always matches (vault, account).
    pub vault_deposit: String,
    pub fee0: Amount,
    pub fee1: Amount,
    pub liquidity: Amount,
    /// Revision counter, incremented on every state-changing event after
    /// creation.
    pub nonce: i64,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Position {
    pub fn with_defaults(seed: PositionSeed) -> Self {
        Position {
            id: identity::position_id(&seed.vault, &seed.account, seed.token_id),
            token_id: seed.token_id,
            vault_deposit: identity::vault_deposit_id(&seed.vault, &seed.account),
            account: seed.account,
            vault: seed.vault,
            fee0: Amount::zero(),
            fee1: Amount::zero(),
            liquidity: Amount::zero(),
            nonce: 0,
            active: false,
            created_at: Timestamp::zero(),
            updated_at: Timestamp::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: &str) -> Address {
        Address::new(format!("0x{:0>40}", last))
    }

    #[test]
    fn test_account_defaults_are_fully_specified() {
        let account = Account::with_defaults(addr("01"));
        assert_eq!(account.id, addr("01").as_str());
        assert!(account.factory.is_zero());
        assert!(account.smart_account.is_zero());
        assert_eq!(account.nonce, 0);
        assert!(account.created_at.is_zero());
    }

    #[test]
    fn test_vault_defaults_use_zero_sentinels() {
        let vault = Vault::with_defaults(addr("02"));
        assert!(vault.token0.is_zero());
        assert!(vault.treasury.is_zero());
        assert!(vault.treasury_fee_percent.is_zero());
        assert_eq!(vault.tick_spacing, 0);
        assert!(!vault.active);
    }

    #[test]
    fn test_position_defaults_reference_matching_deposit() {
        let seed = PositionSeed {
            vault: addr("02"),
            account: addr("01"),
            token_id: TokenId::new(9),
        };
        let position = Position::with_defaults(seed);
        assert_eq!(
            position.vault_deposit,
            identity::vault_deposit_id(&position.vault, &position.account),
        );
        assert!(position.liquidity.is_zero());
        assert!(!position.active);
        assert_eq!(position.nonce, 0);
    }
}
