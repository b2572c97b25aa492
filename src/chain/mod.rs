//! On-chain collaborators: best-effort vault configuration reads and the
//! dynamic vault subscription registry.

use crate::domain::{Address, Amount};
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod registry;
pub mod rpc;

pub use mock::MockConfigReader;
pub use registry::InMemoryVaultRegistry;
pub use rpc::RpcConfigReader;

/// A vault's amount bounds, read together from one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountLimits {
    pub min_amount0: Amount,
    pub max_amount0: Amount,
    pub min_amount1: Amount,
    pub max_amount1: Amount,
}

/// Best-effort reads of a vault's static configuration.
///
/// Each method is independently fallible: `None` means the call reverted
/// or was otherwise unavailable. Implementations never return an error;
/// the projector leaves the field at its default and moves on.
#[async_trait]
pub trait VaultConfigReader: Send + Sync + fmt::Debug {
    async fn treasury(&self, vault: &Address) -> Option<Address>;
    async fn treasury_fee_percent(&self, vault: &Address) -> Option<Amount>;
    async fn token_pair(&self, vault: &Address) -> Option<(Address, Address)>;
    async fn tick_spacing(&self, vault: &Address) -> Option<i64>;
    async fn amount_limits(&self, vault: &Address) -> Option<AmountLimits>;
    async fn position_manager(&self, vault: &Address) -> Option<Address>;
}

/// Registration of newly discovered vaults for event delivery.
///
/// Invoked once per VaultAdded event; registering the same address twice
/// is a no-op.
#[async_trait]
pub trait VaultRegistry: Send + Sync + fmt::Debug {
    async fn register_vault(&self, vault: &Address);
}

/// Config reader used when no RPC endpoint is configured: every read is
/// unavailable.
#[derive(Debug, Clone, Default)]
pub struct NullConfigReader;

#[async_trait]
impl VaultConfigReader for NullConfigReader {
    async fn treasury(&self, _vault: &Address) -> Option<Address> {
        None
    }

    async fn treasury_fee_percent(&self, _vault: &Address) -> Option<Amount> {
        None
    }

    async fn token_pair(&self, _vault: &Address) -> Option<(Address, Address)> {
        None
    }

    async fn tick_spacing(&self, _vault: &Address) -> Option<i64> {
        None
    }

    async fn amount_limits(&self, _vault: &Address) -> Option<AmountLimits> {
        None
    }

    async fn position_manager(&self, _vault: &Address) -> Option<Address> {
        None
    }
}
