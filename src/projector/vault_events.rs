//! Projection rules for vault-scoped events.
//!
//! The owning account for position events is resolved from the transaction
//! sender. That is a known approximation: the true owner can differ when
//! the call goes through a relayer or a smart account.

use crate::domain::{
    identity, Address, Amount, AmountLimitsUpdate, EventMeta, Position, PositionSeed, TokenId,
    TokenPairUpdate, TreasuryUpdate, Vault, VaultDeposit, VaultDepositSeed,
};
use crate::store::StoreError;
use tracing::warn;

use super::{decrement_active_positions, Projection, Projector, SkipReason};

impl Projector {
    pub(super) async fn handle_minted(
        &self,
        meta: &EventMeta,
        token_id: TokenId,
        liquidity: Amount,
    ) -> Result<Projection, StoreError> {
        let vault_addr = meta.emitter.clone();
        let owner = meta.tx_sender.clone();
        let at = meta.block_timestamp;

        let (mut vault, _) = self.ensure_entity::<Vault>(vault_addr.clone()).await?;
        if vault.position_manager.is_zero() {
            if let Some(manager) = self.config_reader().position_manager(&vault_addr).await {
                vault.position_manager = manager;
                vault.updated_at = at;
                self.save_entity(&vault).await?;
            }
        }

        let (mut deposit, _) = self
            .ensure_entity::<VaultDeposit>(VaultDepositSeed {
                vault: vault_addr.clone(),
                account: owner.clone(),
            })
            .await?;
        let (mut position, created) = self
            .ensure_entity::<Position>(PositionSeed {
                vault: vault_addr,
                account: owner.clone(),
                token_id,
            })
            .await?;

        // Liquidity is the minted amount, absolute. A re-delivered mint
        // overwrites it again but neither re-counts the position nor
        // resurrects a retired one.
        position.liquidity = liquidity;
        if created {
            position.active = true;
        }
        if position.created_at.is_zero() {
            position.created_at = at;
        }
        position.updated_at = at;
        self.save_entity(&position).await?;

        if created {
            deposit.active_position_count += 1;
        }
        if deposit.created_at.is_zero() {
            deposit.created_at = at;
        }
        deposit.updated_at = at;
        self.save_entity(&deposit).await?;

        self.touch_owner(&owner, at).await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_burned(
        &self,
        meta: &EventMeta,
        token_id: TokenId,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let id = identity::position_id(&meta.emitter, &meta.tx_sender, token_id);
        let Some(mut position) = self.load_entity::<Position>(&id).await? else {
            warn!(event = "burned", position = %id, "dropping event for missing position");
            return Ok(Projection::Skipped(SkipReason::MissingPosition(id)));
        };

        let was_active = position.active;
        position.liquidity = Amount::zero();
        position.active = false;
        position.updated_at = at;
        self.save_entity(&position).await?;

        if was_active {
            let (mut deposit, _) = self
                .ensure_entity::<VaultDeposit>(VaultDepositSeed {
                    vault: position.vault.clone(),
                    account: position.account.clone(),
                })
                .await?;
            decrement_active_positions(&mut deposit);
            deposit.updated_at = at;
            self.save_entity(&deposit).await?;
        }

        self.touch_owner(&position.account, at).await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_liquidity_increased(
        &self,
        meta: &EventMeta,
        token_id: TokenId,
        liquidity_added: Amount,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let id = identity::position_id(&meta.emitter, &meta.tx_sender, token_id);
        let Some(mut position) = self.load_entity::<Position>(&id).await? else {
            warn!(event = "liquidityIncreased", position = %id, "dropping event for missing position");
            return Ok(Projection::Skipped(SkipReason::MissingPosition(id)));
        };

        position.liquidity = position.liquidity + liquidity_added;
        position.nonce += 1;
        position.updated_at = at;
        self.save_entity(&position).await?;

        self.touch_owner(&position.account, at).await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_liquidity_decreased(
        &self,
        meta: &EventMeta,
        token_id: TokenId,
        liquidity_removed: Amount,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let id = identity::position_id(&meta.emitter, &meta.tx_sender, token_id);
        let Some(mut position) = self.load_entity::<Position>(&id).await? else {
            warn!(event = "liquidityDecreased", position = %id, "dropping event for missing position");
            return Ok(Projection::Skipped(SkipReason::MissingPosition(id)));
        };

        // Reaching exactly zero does not retire the position; retirement is
        // an explicit burn.
        let (remaining, clamped) = position.liquidity.saturating_sub(liquidity_removed);
        if clamped {
            warn!(
                position = %id,
                removed = %liquidity_removed,
                held = %position.liquidity,
                "liquidity decrease exceeds held liquidity, clamping at zero"
            );
        }
        position.liquidity = remaining;
        position.nonce += 1;
        position.updated_at = at;
        self.save_entity(&position).await?;

        self.touch_owner(&position.account, at).await?;
        Ok(Projection::Applied)
    }

    /// The only two-position transition: retire the old position and
    /// migrate its economic state into the new token id.
    pub(super) async fn handle_rebalanced(
        &self,
        meta: &EventMeta,
        old_token_id: TokenId,
        new_token_id: TokenId,
        new_liquidity: Amount,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let old_id = identity::position_id(&meta.emitter, &meta.tx_sender, old_token_id);

        if old_token_id == new_token_id {
            warn!(position = %old_id, "dropping rebalance into the same token id");
            return Ok(Projection::Skipped(SkipReason::SelfRebalance(old_id)));
        }

        let Some(mut old) = self.load_entity::<Position>(&old_id).await? else {
            warn!(event = "rebalanced", position = %old_id, "dropping event for missing position");
            return Ok(Projection::Skipped(SkipReason::MissingPosition(old_id)));
        };

        let new_id = identity::position_id(&old.vault, &old.account, new_token_id);
        let existing = self.load_entity::<Position>(&new_id).await?;
        let fresh = existing.is_none();

        let mut target = match existing {
            // Liquidity migrates into a pre-existing position: fee balances
            // merge, they are not overwritten.
            Some(mut position) => {
                position.fee0 = position.fee0 + old.fee0;
                position.fee1 = position.fee1 + old.fee1;
                position.nonce += 1;
                position
            }
            None => Position {
                id: new_id.clone(),
                token_id: new_token_id,
                account: old.account.clone(),
                vault: old.vault.clone(),
                vault_deposit: old.vault_deposit.clone(),
                fee0: old.fee0,
                fee1: old.fee1,
                liquidity: Amount::zero(),
                nonce: old.nonce + 1,
                active: true,
                created_at: at,
                updated_at: at,
            },
        };
        // The event's liquidity value is absolute for the target either way.
        target.liquidity = new_liquidity;
        target.updated_at = at;
        self.save_entity(&target).await?;

        let was_active = old.active;
        old.liquidity = Amount::zero();
        old.active = false;
        old.updated_at = at;
        self.save_entity(&old).await?;

        let (mut deposit, _) = self
            .ensure_entity::<VaultDeposit>(VaultDepositSeed {
                vault: old.vault.clone(),
                account: old.account.clone(),
            })
            .await?;
        if fresh {
            deposit.active_position_count += 1;
        }
        if was_active {
            decrement_active_positions(&mut deposit);
        }
        deposit.updated_at = at;
        self.save_entity(&deposit).await?;

        self.touch_owner(&old.account, at).await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_collect_fee(
        &self,
        meta: &EventMeta,
        token_id: TokenId,
        treasury_amount0: Amount,
        treasury_amount1: Amount,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let id = identity::position_id(&meta.emitter, &meta.tx_sender, token_id);
        let Some(mut position) = self.load_entity::<Position>(&id).await? else {
            warn!(event = "collectFee", position = %id, "dropping event for missing position");
            return Ok(Projection::Skipped(SkipReason::MissingPosition(id)));
        };

        position.fee0 = position.fee0 + treasury_amount0;
        position.fee1 = position.fee1 + treasury_amount1;
        position.nonce += 1;
        position.updated_at = at;
        self.save_entity(&position).await?;

        self.touch_owner(&position.account, at).await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_treasury_updated(
        &self,
        meta: &EventMeta,
        treasury: &Address,
        treasury_fee_percent: Amount,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let (mut vault, _) = self.ensure_entity::<Vault>(meta.emitter.clone()).await?;
        vault.treasury = treasury.clone();
        vault.treasury_fee_percent = treasury_fee_percent;
        vault.updated_at = at;
        self.save_entity(&vault).await?;

        self.append_audit(&TreasuryUpdate {
            event_key: meta.event_key(),
            vault: meta.emitter.clone(),
            treasury: treasury.clone(),
            treasury_fee_percent,
            block_timestamp: at,
        })
        .await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_token_pair_updated(
        &self,
        meta: &EventMeta,
        token0: &Address,
        token1: &Address,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let (mut vault, _) = self.ensure_entity::<Vault>(meta.emitter.clone()).await?;
        vault.token0 = token0.clone();
        vault.token1 = token1.clone();
        vault.updated_at = at;
        self.save_entity(&vault).await?;

        self.append_audit(&TokenPairUpdate {
            event_key: meta.event_key(),
            vault: meta.emitter.clone(),
            token0: token0.clone(),
            token1: token1.clone(),
            block_timestamp: at,
        })
        .await?;
        Ok(Projection::Applied)
    }

    pub(super) async fn handle_amount_limits_updated(
        &self,
        meta: &EventMeta,
        min_amount0: Amount,
        max_amount0: Amount,
        min_amount1: Amount,
        max_amount1: Amount,
    ) -> Result<Projection, StoreError> {
        let at = meta.block_timestamp;
        let (mut vault, _) = self.ensure_entity::<Vault>(meta.emitter.clone()).await?;
        vault.min_amount0 = min_amount0;
        vault.max_amount0 = max_amount0;
        vault.min_amount1 = min_amount1;
        vault.max_amount1 = max_amount1;
        vault.updated_at = at;
        self.save_entity(&vault).await?;

        self.append_audit(&AmountLimitsUpdate {
            event_key: meta.event_key(),
            vault: meta.emitter.clone(),
            min_amount0,
            max_amount0,
            min_amount1,
            max_amount1,
            block_timestamp: at,
        })
        .await?;
        Ok(Projection::Applied)
    }
}
