use crate::api::AppState;
use crate::domain::DomainEvent;
use crate::error::AppError;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// Delivery seam for the upstream log decoder: a batch of already-typed
/// events, projected in chain order.
pub async fn ingest_events(
    State(state): State<AppState>,
    Json(events): Json<Vec<DomainEvent>>,
) -> Result<Json<IngestResponse>, AppError> {
    let report = state.ingestor.ingest(events).await?;
    Ok(Json(IngestResponse {
        processed: report.processed,
        applied: report.applied,
        skipped: report.skipped,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub processed: usize,
    pub applied: usize,
    pub skipped: usize,
}
