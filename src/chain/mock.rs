//! Mock config reader for tests.

use crate::domain::{Address, Amount};
use async_trait::async_trait;
use std::collections::HashMap;

use super::{AmountLimits, VaultConfigReader};

/// Mock reader returning predefined per-vault configuration. Any field not
/// configured behaves as a reverted read.
#[derive(Debug, Clone, Default)]
pub struct MockConfigReader {
    treasuries: HashMap<Address, Address>,
    fee_percents: HashMap<Address, Amount>,
    token_pairs: HashMap<Address, (Address, Address)>,
    tick_spacings: HashMap<Address, i64>,
    amount_limits: HashMap<Address, AmountLimits>,
    position_managers: HashMap<Address, Address>,
}

impl MockConfigReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_treasury(mut self, vault: Address, treasury: Address) -> Self {
        self.treasuries.insert(vault, treasury);
        self
    }

    pub fn with_fee_percent(mut self, vault: Address, percent: Amount) -> Self {
        self.fee_percents.insert(vault, percent);
        self
    }

    pub fn with_token_pair(mut self, vault: Address, token0: Address, token1: Address) -> Self {
        self.token_pairs.insert(vault, (token0, token1));
        self
    }

    pub fn with_tick_spacing(mut self, vault: Address, spacing: i64) -> Self {
        self.tick_spacings.insert(vault, spacing);
        self
    }

    pub fn with_amount_limits(mut self, vault: Address, limits: AmountLimits) -> Self {
        self.amount_limits.insert(vault, limits);
        self
    }

    pub fn with_position_manager(mut self, vault: Address, manager: Address) -> Self {
        self.position_managers.insert(vault, manager);
        self
    }
}

#[async_trait]
impl VaultConfigReader for MockConfigReader {
    async fn treasury(&self, vault: &Address) -> Option<Address> {
        self.treasuries.get(vault).cloned()
    }

    async fn treasury_fee_percent(&self, vault: &Address) -> Option<Amount> {
        self.fee_percents.get(vault).copied()
    }

    async fn token_pair(&self, vault: &Address) -> Option<(Address, Address)> {
        self.token_pairs.get(vault).cloned()
    }

    async fn tick_spacing(&self, vault: &Address) -> Option<i64> {
        self.tick_spacings.get(vault).copied()
    }

    async fn amount_limits(&self, vault: &Address) -> Option<AmountLimits> {
        self.amount_limits.get(vault).cloned()
    }

    async fn position_manager(&self, vault: &Address) -> Option<Address> {
        self.position_managers.get(vault).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reader_returns_configured_values() {
        let vault = Address::new("0x1111111111111111111111111111111111111111");
        let treasury = Address::new("0x2222222222222222222222222222222222222222");
        let reader = MockConfigReader::new()
            .with_treasury(vault.clone(), treasury.clone())
            .with_tick_spacing(vault.clone(), 60);

        assert_eq!(reader.treasury(&vault).await, Some(treasury));
        assert_eq!(reader.tick_spacing(&vault).await, Some(60));
        assert!(reader.token_pair(&vault).await.is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_vault_reads_as_reverted() {
        let reader = MockConfigReader::new();
        let vault = Address::new("0x1111111111111111111111111111111111111111");
        assert!(reader.treasury(&vault).await.is_none());
        assert!(reader.position_manager(&vault).await.is_none());
    }
}
