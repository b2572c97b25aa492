//! Projection rules for factory-scoped events.
//!
//! Every factory event leaves a 1:1 mirror row regardless of how the
//! derived state reacts; the mirrors are the audit trail of the factory
//! stream itself.

use crate::domain::{
    identity, Account, Address, EventMeta, FactoryEventKind, FactoryEventRecord, Vault,
};
use crate::store::StoreError;
use tracing::warn;

use super::{Projection, Projector, SkipReason};

impl Projector {
    pub(super) async fn handle_account_deployed(
        &self,
        meta: &EventMeta,
        owner: &Address,
        account: &Address,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let (mut entity, _) = self.ensure_entity::<Account>(owner.clone()).await?;
        if entity.factory.is_zero() {
            entity.factory = meta.emitter.clone();
        }
        if entity.smart_account.is_zero() {
            entity.smart_account = account.clone();
        }
        if entity.created_at.is_zero() {
            entity.created_at = at;
        }
        entity.updated_at = at;
        self.save_entity(&entity).await?;

        let mut record = FactoryEventRecord::from_meta(meta, FactoryEventKind::AccountDeployed);
        record.owner = Some(owner.clone());
        record.account = Some(account.clone());
        self.append_audit(&record).await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_vault_added(
        &self,
        meta: &EventMeta,
        vault_addr: &Address,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let (mut vault, _) = self.ensure_entity::<Vault>(vault_addr.clone()).await?;
        vault.active = true;
        if vault.created_at.is_zero() {
            vault.created_at = at;
        }
        self.backfill_vault_config(&mut vault, vault_addr).await;
        vault.updated_at = at;
        self.save_entity(&vault).await?;

        self.vault_registry().register_vault(vault_addr).await;

        let mut record = FactoryEventRecord::from_meta(meta, FactoryEventKind::VaultAdded);
        record.vault = Some(vault_addr.clone());
        self.append_audit(&record).await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_vault_removed(
        &self,
        meta: &EventMeta,
        vault_addr: &Address,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;

        let mut record = FactoryEventRecord::from_meta(meta, FactoryEventKind::VaultRemoved);
        record.vault = Some(vault_addr.clone());
        self.append_audit(&record).await?;

        let id = identity::vault_id(vault_addr);
        let Some(mut vault) = self.load_entity::<Vault>(&id).await? else {
            warn!(event = "vaultRemoved", vault = %id, "dropping event for missing vault");
            return Ok(Projection::Skipped(SkipReason::MissingVault(id)));
        };

        // Logical deletion only; the row stays queryable.
        vault.active = false;
        vault.updated_at = at;
        self.save_entity(&vault).await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_wallet_ownership_set(
        &self,
        meta: &EventMeta,
        owner: &Address,
        wallet: &Address,
    ) -> Result<Projection, StoreError> {
        // Ownership linkage is not modeled; the event only guarantees the
        // account exists and leaves its mirror row.
        let (mut entity, created) = self.ensure_entity::<Account>(owner.clone()).await?;
        if created && entity.created_at.is_zero() {
            entity.created_at = meta.block_timestamp;
            entity.updated_at = meta.block_timestamp;
            self.save_entity(&entity).await?;
        }

        let mut record = FactoryEventRecord::from_meta(meta, FactoryEventKind::WalletOwnershipSet);
        record.owner = Some(owner.clone());
        record.wallet = Some(wallet.clone());
        self.append_audit(&record).await?;
        Ok(Projection::Applied)
    }

    /// Backfill still-defaulted static configuration, each read
    /// independently fallible and individually skipped on failure. Fields
    /// already holding real data are never overwritten from chain reads.
    async fn backfill_vault_config(&self, vault: &mut Vault, vault_addr: &Address) {
        let reader = self.config_reader();

        if vault.treasury.is_zero() {
            if let Some(treasury) = reader.treasury(vault_addr).await {
                vault.treasury = treasury;
            }
        }
        if vault.treasury_fee_percent.is_zero() {
            if let Some(percent) = reader.treasury_fee_percent(vault_addr).await {
                vault.treasury_fee_percent = percent;
            }
        }
        if vault.token0.is_zero() || vault.token1.is_zero() {
            if let Some((token0, token1)) = reader.token_pair(vault_addr).await {
                vault.token0 = token0;
                vault.token1 = token1;
            }
        }
        if vault.tick_spacing == 0 {
            if let Some(spacing) = reader.tick_spacing(vault_addr).await {
                vault.tick_spacing = spacing;
            }
        }
        let limits_unset = vault.min_amount0.is_zero()
            && vault.max_amount0.is_zero()
            && vault.min_amount1.is_zero()
            && vault.max_amount1.is_zero();
        if limits_unset {
            if let Some(limits) = reader.amount_limits(vault_addr).await {
                vault.min_amount0 = limits.min_amount0;
                vault.max_amount0 = limits.max_amount0;
                vault.min_amount1 = limits.min_amount1;
                vault.max_amount1 = limits.max_amount1;
            }
        }
        if vault.position_manager.is_zero() {
            if let Some(manager) = reader.position_manager(vault_addr).await {
                vault.position_manager = manager;
            }
        }
    }
}
