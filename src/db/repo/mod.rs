//! Repository layer for database operations.
//!
//! The `Repository` implements the store traits the projector writes
//! through (`EntityStore<E>`, `AuditSink<R>`) and the read-side queries
//! the API serves from. Methods are organized across submodules:
//! - `entities.rs` - entity load/upsert (the projector's write path)
//! - `audit.rs` - append-only audit records and their queries
//! - `queries.rs` - read-side filtering queries

mod audit;
mod entities;
mod queries;

use crate::domain::Amount;
use sqlx::sqlite::SqlitePool;
use std::str::FromStr;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Decode a canonical amount string from a row, falling back to zero on a
/// corrupt value rather than failing the read.
pub(crate) fn parse_amount(entity_id: &str, column: &str, raw: &str) -> Amount {
    Amount::from_str(raw).unwrap_or_else(|e| {
        warn!(
            entity = %entity_id,
            column,
            value = %raw,
            error = %e,
            "Failed to parse stored amount, using zero"
        );
        Amount::zero()
    })
}
