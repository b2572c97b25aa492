//! Tracked-vault registry.

use crate::domain::Address;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::info;

use super::VaultRegistry;

/// Process-local registry of vault addresses discovered via VaultAdded.
///
/// The upstream log subscriber consults this set to know which vault
/// contracts to deliver events for.
#[derive(Debug, Default)]
pub struct InMemoryVaultRegistry {
    vaults: Mutex<HashSet<Address>>,
}

impl InMemoryVaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the vault has been registered.
    pub fn contains(&self, vault: &Address) -> bool {
        self.vaults.lock().expect("registry lock poisoned").contains(vault)
    }

    /// Snapshot of all registered vault addresses.
    pub fn all(&self) -> Vec<Address> {
        let mut vaults: Vec<Address> = self
            .vaults
            .lock()
            .expect("registry lock poisoned")
            .iter()
            .cloned()
            .collect();
        vaults.sort();
        vaults
    }

    /// Number of registered vaults.
    pub fn len(&self) -> usize {
        self.vaults.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VaultRegistry for InMemoryVaultRegistry {
    async fn register_vault(&self, vault: &Address) {
        let inserted = self
            .vaults
            .lock()
            .expect("registry lock poisoned")
            .insert(vault.clone());
        if inserted {
            info!(vault = %vault, "registered vault for event delivery");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let registry = InMemoryVaultRegistry::new();
        let vault = Address::new("0x1111111111111111111111111111111111111111");

        registry.register_vault(&vault).await;
        registry.register_vault(&vault).await;

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&vault));
    }

    #[tokio::test]
    async fn test_all_returns_sorted_snapshot() {
        let registry = InMemoryVaultRegistry::new();
        let a = Address::new("0x2222222222222222222222222222222222222222");
        let b = Address::new("0x1111111111111111111111111111111111111111");

        registry.register_vault(&a).await;
        registry.register_vault(&b).await;

        assert_eq!(registry.all(), vec![b, a]);
    }
}
