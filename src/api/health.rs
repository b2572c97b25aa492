use crate::api::AppState;
use crate::error::AppError;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness: the database must answer a trivial query.
pub async fn ready(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let account = crate::domain::Address::zero();
    state.repo.get_account(&account).await?;
    Ok(Json(json!({ "status": "ready" })))
}
