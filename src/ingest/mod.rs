//! Batch ingestion: deterministic ordering and strictly sequential
//! projection.

use crate::domain::{sort_events_deterministic, DomainEvent};
use crate::projector::{Projection, Projector};
use crate::store::StoreError;
use thiserror::Error;
use tracing::{debug, info};

/// Drives batches of delivered events through the projector.
///
/// One event is projected fully (all reads, all writes) before the next is
/// considered; concurrent batches queue behind an internal lock.
pub struct Ingestor {
    projector: Projector,
    gate: tokio::sync::Mutex<()>,
}

/// Per-batch outcome counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub processed: usize,
    pub applied: usize,
    pub skipped: usize,
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Ingestor {
    pub fn new(projector: Projector) -> Self {
        Self {
            projector,
            gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Sort a batch into confirmed chain order and project each event.
    pub async fn ingest(&self, mut events: Vec<DomainEvent>) -> Result<IngestReport, IngestionError> {
        let _guard = self.gate.lock().await;

        sort_events_deterministic(&mut events);

        let mut applied = 0usize;
        let mut skipped = 0usize;
        for event in &events {
            match self.projector.apply(event).await? {
                Projection::Applied => applied += 1,
                Projection::Skipped(reason) => {
                    skipped += 1;
                    debug!(
                        kind = event.body.kind(),
                        event_key = %event.meta.event_key(),
                        %reason,
                        "event dropped without state change"
                    );
                }
            }
        }

        let report = IngestReport {
            processed: events.len(),
            applied,
            skipped,
        };
        info!(
            processed = report.processed,
            applied = report.applied,
            skipped = report.skipped,
            "batch projected"
        );
        Ok(report)
    }
}
