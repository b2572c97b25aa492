use crate::api::AppState;
use crate::domain::{Address, AmountLimitsUpdate, TokenPairUpdate, TreasuryUpdate, Vault};
use crate::error::AppError;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Deserialize)]
pub struct ListVaultsQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultDto {
    pub address: String,
    pub token0: String,
    pub token1: String,
    pub treasury: String,
    pub treasury_fee_percent: String,
    pub min_amount0: String,
    pub max_amount0: String,
    pub min_amount1: String,
    pub max_amount1: String,
    pub tick_spacing: i64,
    pub position_manager: String,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Vault> for VaultDto {
    fn from(vault: &Vault) -> Self {
        VaultDto {
            address: vault.address.to_string(),
            token0: vault.token0.to_string(),
            token1: vault.token1.to_string(),
            treasury: vault.treasury.to_string(),
            treasury_fee_percent: vault.treasury_fee_percent.to_canonical_string(),
            min_amount0: vault.min_amount0.to_canonical_string(),
            max_amount0: vault.max_amount0.to_canonical_string(),
            min_amount1: vault.min_amount1.to_canonical_string(),
            max_amount1: vault.max_amount1.to_canonical_string(),
            tick_spacing: vault.tick_spacing,
            position_manager: vault.position_manager.to_string(),
            active: vault.active,
            created_at: vault.created_at.as_i64(),
            updated_at: vault.updated_at.as_i64(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVaultsResponse {
    pub vaults: Vec<VaultDto>,
}

pub async fn list_vaults(
    Query(params): Query<ListVaultsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ListVaultsResponse>, AppError> {
    let vaults = state
        .repo
        .list_vaults(params.active.unwrap_or(false))
        .await?;
    Ok(Json(ListVaultsResponse {
        vaults: vaults.iter().map(VaultDto::from).collect(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryUpdateDto {
    pub event_key: String,
    pub treasury: String,
    pub treasury_fee_percent: String,
    pub block_timestamp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairUpdateDto {
    pub event_key: String,
    pub token0: String,
    pub token1: String,
    pub block_timestamp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountLimitsUpdateDto {
    pub event_key: String,
    pub min_amount0: String,
    pub max_amount0: String,
    pub min_amount1: String,
    pub max_amount1: String,
    pub block_timestamp: i64,
}

impl From<&TreasuryUpdate> for TreasuryUpdateDto {
    fn from(update: &TreasuryUpdate) -> Self {
        TreasuryUpdateDto {
            event_key: update.event_key.clone(),
            treasury: update.treasury.to_string(),
            treasury_fee_percent: update.treasury_fee_percent.to_canonical_string(),
            block_timestamp: update.block_timestamp.as_i64(),
        }
    }
}

impl From<&TokenPairUpdate> for TokenPairUpdateDto {
    fn from(update: &TokenPairUpdate) -> Self {
        TokenPairUpdateDto {
            event_key: update.event_key.clone(),
            token0: update.token0.to_string(),
            token1: update.token1.to_string(),
            block_timestamp: update.block_timestamp.as_i64(),
        }
    }
}

impl From<&AmountLimitsUpdate> for AmountLimitsUpdateDto {
    fn from(update: &AmountLimitsUpdate) -> Self {
        AmountLimitsUpdateDto {
            event_key: update.event_key.clone(),
            min_amount0: update.min_amount0.to_canonical_string(),
            max_amount0: update.max_amount0.to_canonical_string(),
            min_amount1: update.min_amount1.to_canonical_string(),
            max_amount1: update.max_amount1.to_canonical_string(),
            block_timestamp: update.block_timestamp.as_i64(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultDetailResponse {
    pub vault: VaultDto,
    pub treasury_updates: Vec<TreasuryUpdateDto>,
    pub token_pair_updates: Vec<TokenPairUpdateDto>,
    pub amount_limits_updates: Vec<AmountLimitsUpdateDto>,
}

/// Vault snapshot plus its full configuration-change history.
pub async fn get_vault(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<VaultDetailResponse>, AppError> {
    let address = Address::from_str(&address)
        .map_err(|_| AppError::BadRequest("Invalid vault address".into()))?;

    let vault = state
        .repo
        .get_vault(&address)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vault {}", address)))?;

    let (treasury_updates, token_pair_updates, amount_limits_updates) = futures::try_join!(
        state.repo.query_treasury_updates(&address),
        state.repo.query_token_pair_updates(&address),
        state.repo.query_amount_limits_updates(&address),
    )?;

    Ok(Json(VaultDetailResponse {
        vault: VaultDto::from(&vault),
        treasury_updates: treasury_updates.iter().map(TreasuryUpdateDto::from).collect(),
        token_pair_updates: token_pair_updates
            .iter()
            .map(TokenPairUpdateDto::from)
            .collect(),
        amount_limits_updates: amount_limits_updates
            .iter()
            .map(AmountLimitsUpdateDto::from)
            .collect(),
    }))
}
