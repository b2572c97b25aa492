use crate::api::AppState;
use crate::domain::{Address, Position};
use crate::error::AppError;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsQuery {
    pub account: Option<String>,
    pub vault: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub id: String,
    pub token_id: u64,
    pub account: String,
    pub vault: String,
    pub vault_deposit: String,
    pub fee0: String,
    pub fee1: String,
    pub liquidity: String,
    pub nonce: i64,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Position> for PositionDto {
    fn from(position: &Position) -> Self {
        PositionDto {
            id: position.id.clone(),
            token_id: position.token_id.as_u64(),
            account: position.account.to_string(),
            vault: position.vault.to_string(),
            vault_deposit: position.vault_deposit.clone(),
            fee0: position.fee0.to_canonical_string(),
            fee1: position.fee1.to_canonical_string(),
            liquidity: position.liquidity.to_canonical_string(),
            nonce: position.nonce,
            active: position.active,
            created_at: position.created_at.as_i64(),
            updated_at: position.updated_at.as_i64(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResponse {
    pub positions: Vec<PositionDto>,
}

pub async fn get_positions(
    Query(params): Query<PositionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<PositionsResponse>, AppError> {
    let account = match params.account.as_deref() {
        Some(raw) => Some(
            Address::from_str(raw)
                .map_err(|_| AppError::BadRequest("Invalid account address".into()))?,
        ),
        None => None,
    };
    let vault = match params.vault.as_deref() {
        Some(raw) => Some(
            Address::from_str(raw)
                .map_err(|_| AppError::BadRequest("Invalid vault address".into()))?,
        ),
        None => None,
    };
    if account.is_none() && vault.is_none() {
        return Err(AppError::BadRequest(
            "account or vault filter is required".into(),
        ));
    }

    let positions = state
        .repo
        .query_positions(
            account.as_ref(),
            vault.as_ref(),
            params.active.unwrap_or(false),
        )
        .await?;

    Ok(Json(PositionsResponse {
        positions: positions.iter().map(PositionDto::from).collect(),
    }))
}
