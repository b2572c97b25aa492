//! The event projector: one state-transition rule per domain event kind.
//!
//! Every rule reads entities through the store traits, mutates them and
//! writes them back. Domain-level problems (a referenced position or vault
//! that does not exist) never fail the stream: the event is dropped with a
//! skip outcome and a structured log line. Only store backend failures
//! propagate as errors.

mod factory_events;
mod vault_events;

use crate::chain::{VaultConfigReader, VaultRegistry};
use crate::domain::{
    Account, Address, DomainEvent, EventBody, Timestamp, VaultDeposit,
};
use crate::store::{get_or_create, AuditRecord, AuditSink, EntityStore, Store, StoreError, StoredEntity};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of projecting one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Applied,
    Skipped(SkipReason),
}

/// Why an event was dropped without any derived-state write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingPosition(String),
    MissingVault(String),
    /// Rebalance naming the same token id as source and target.
    SelfRebalance(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingPosition(id) => write!(f, "missing position {}", id),
            SkipReason::MissingVault(id) => write!(f, "missing vault {}", id),
            SkipReason::SelfRebalance(id) => write!(f, "rebalance into itself for {}", id),
        }
    }
}

/// Projects domain events onto the entity graph.
pub struct Projector {
    store: Arc<dyn Store>,
    config: Arc<dyn VaultConfigReader>,
    registry: Arc<dyn VaultRegistry>,
}

impl Projector {
    pub fn new(
        store: Arc<dyn Store>,
        config: Arc<dyn VaultConfigReader>,
        registry: Arc<dyn VaultRegistry>,
    ) -> Self {
        Self {
            store,
            config,
            registry,
        }
    }

    /// Apply a single event. Must be driven strictly sequentially; the
    /// ingestor serializes calls.
    pub async fn apply(&self, event: &DomainEvent) -> Result<Projection, StoreError> {
        let meta = &event.meta;
        match &event.body {
            EventBody::Minted {
                token_id,
                liquidity,
            } => self.handle_minted(meta, *token_id, *liquidity).await,
            EventBody::Burned { token_id } => self.handle_burned(meta, *token_id).await,
            EventBody::LiquidityIncreased {
                token_id,
                liquidity_added,
            } => {
                self.handle_liquidity_increased(meta, *token_id, *liquidity_added)
                    .await
            }
            EventBody::LiquidityDecreased {
                token_id,
                liquidity_removed,
            } => {
                self.handle_liquidity_decreased(meta, *token_id, *liquidity_removed)
                    .await
            }
            EventBody::Rebalanced {
                old_token_id,
                new_token_id,
                new_liquidity,
            } => {
                self.handle_rebalanced(meta, *old_token_id, *new_token_id, *new_liquidity)
                    .await
            }
            EventBody::CollectFee {
                token_id,
                treasury_amount0,
                treasury_amount1,
            } => {
                self.handle_collect_fee(meta, *token_id, *treasury_amount0, *treasury_amount1)
                    .await
            }
            EventBody::TreasuryUpdated {
                treasury,
                treasury_fee_percent,
            } => {
                self.handle_treasury_updated(meta, treasury, *treasury_fee_percent)
                    .await
            }
            EventBody::TokenPairUpdated { token0, token1 } => {
                self.handle_token_pair_updated(meta, token0, token1).await
            }
            EventBody::AmountLimitsUpdated {
                min_amount0,
                max_amount0,
                min_amount1,
                max_amount1,
            } => {
                self.handle_amount_limits_updated(
                    meta,
                    *min_amount0,
                    *max_amount0,
                    *min_amount1,
                    *max_amount1,
                )
                .await
            }
            EventBody::AccountDeployed { owner, account } => {
                self.handle_account_deployed(meta, owner, account).await
            }
            EventBody::VaultAdded { vault } => self.handle_vault_added(meta, vault).await,
            EventBody::VaultRemoved { vault } => self.handle_vault_removed(meta, vault).await,
            EventBody::WalletOwnershipSet { owner, wallet } => {
                self.handle_wallet_ownership_set(meta, owner, wallet).await
            }
        }
    }

    fn config_reader(&self) -> &dyn VaultConfigReader {
        self.config.as_ref()
    }

    fn vault_registry(&self) -> &dyn VaultRegistry {
        self.registry.as_ref()
    }

    pub(crate) async fn load_entity<E>(&self, id: &str) -> Result<Option<E>, StoreError>
    where
        E: StoredEntity,
        dyn Store: EntityStore<E>,
    {
        EntityStore::<E>::load(self.store.as_ref(), id).await
    }

    pub(crate) async fn save_entity<E>(&self, entity: &E) -> Result<(), StoreError>
    where
        E: StoredEntity,
        dyn Store: EntityStore<E>,
    {
        EntityStore::<E>::upsert(self.store.as_ref(), entity).await
    }

    pub(crate) async fn ensure_entity<E>(&self, seed: E::Seed) -> Result<(E, bool), StoreError>
    where
        E: StoredEntity,
        dyn Store: EntityStore<E>,
    {
        get_or_create(self.store.as_ref(), seed).await
    }

    pub(crate) async fn append_audit<R>(&self, record: &R) -> Result<(), StoreError>
    where
        R: AuditRecord,
        dyn Store: AuditSink<R>,
    {
        AuditSink::<R>::append(self.store.as_ref(), record).await?;
        debug!(kind = R::KIND, event_key = record.event_key(), "audit record appended");
        Ok(())
    }

    /// Refresh the owning account after one of its positions/deposits
    /// changed: bump the revision nonce and the update timestamp.
    pub(crate) async fn touch_owner(
        &self,
        owner: &Address,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        let (mut account, _) = self.ensure_entity::<Account>(owner.clone()).await?;
        if account.created_at.is_zero() {
            account.created_at = at;
        }
        account.nonce += 1;
        account.updated_at = at;
        self.save_entity(&account).await
    }
}

/// Decrement a deposit's active-position counter, clamping at zero.
///
/// A clamp means the stream was inconsistent; state degrades locally but
/// the counter never goes negative.
pub(crate) fn decrement_active_positions(deposit: &mut VaultDeposit) {
    if deposit.active_position_count == 0 {
        warn!(
            deposit = %deposit.id,
            "active position count already zero, clamping decrement"
        );
        return;
    }
    deposit.active_position_count -= 1;
}
