use crate::api::AppState;
use crate::domain::{Account, Address, VaultDeposit};
use crate::error::AppError;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub address: String,
    pub factory: String,
    pub smart_account: String,
    pub nonce: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Account> for AccountDto {
    fn from(account: &Account) -> Self {
        AccountDto {
            address: account.address.to_string(),
            factory: account.factory.to_string(),
            smart_account: account.smart_account.to_string(),
            nonce: account.nonce,
            created_at: account.created_at.as_i64(),
            updated_at: account.updated_at.as_i64(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultDepositDto {
    pub id: String,
    pub vault: String,
    pub active_position_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&VaultDeposit> for VaultDepositDto {
    fn from(deposit: &VaultDeposit) -> Self {
        VaultDepositDto {
            id: deposit.id.clone(),
            vault: deposit.vault.to_string(),
            active_position_count: deposit.active_position_count,
            created_at: deposit.created_at.as_i64(),
            updated_at: deposit.updated_at.as_i64(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetailResponse {
    pub account: AccountDto,
    pub deposits: Vec<VaultDepositDto>,
}

/// Account snapshot plus its per-vault deposit relationships.
pub async fn get_account(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccountDetailResponse>, AppError> {
    let address = Address::from_str(&address)
        .map_err(|_| AppError::BadRequest("Invalid account address".into()))?;

    let (account, deposits) = futures::try_join!(
        state.repo.get_account(&address),
        state.repo.query_vault_deposits(&address),
    )?;

    let account = account.ok_or_else(|| AppError::NotFound(format!("account {}", address)))?;

    Ok(Json(AccountDetailResponse {
        account: AccountDto::from(&account),
        deposits: deposits.iter().map(VaultDepositDto::from).collect(),
    }))
}
