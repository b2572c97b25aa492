//! Append-only audit records: configuration changes and factory mirrors.
//!
//! Configuration records get one row per delivery (re-delivery appends
//! again); factory mirrors are at most one row per chain event.

use crate::domain::{
    Address, AmountLimitsUpdate, FactoryEventKind, FactoryEventRecord, Timestamp, TokenPairUpdate,
    TreasuryUpdate,
};
use crate::store::{AuditSink, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{parse_amount, Repository};

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl AuditSink<TreasuryUpdate> for Repository {
    async fn append(&self, record: &TreasuryUpdate) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO treasury_updates
                (event_key, vault, treasury, treasury_fee_percent, block_timestamp, ingested_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.event_key)
        .bind(record.vault.as_str())
        .bind(record.treasury.as_str())
        .bind(record.treasury_fee_percent.to_canonical_string())
        .bind(record.block_timestamp.as_i64())
        .bind(now_unix())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink<TokenPairUpdate> for Repository {
    async fn append(&self, record: &TokenPairUpdate) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO token_pair_updates
                (event_key, vault, token0, token1, block_timestamp, ingested_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.event_key)
        .bind(record.vault.as_str())
        .bind(record.token0.as_str())
        .bind(record.token1.as_str())
        .bind(record.block_timestamp.as_i64())
        .bind(now_unix())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink<AmountLimitsUpdate> for Repository {
    async fn append(&self, record: &AmountLimitsUpdate) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO amount_limits_updates
                (event_key, vault, min_amount0, max_amount0, min_amount1, max_amount1,
                 block_timestamp, ingested_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.event_key)
        .bind(record.vault.as_str())
        .bind(record.min_amount0.to_canonical_string())
        .bind(record.max_amount0.to_canonical_string())
        .bind(record.min_amount1.to_canonical_string())
        .bind(record.max_amount1.to_canonical_string())
        .bind(record.block_timestamp.as_i64())
        .bind(now_unix())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink<FactoryEventRecord> for Repository {
    async fn append(&self, record: &FactoryEventRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO factory_events
                (event_key, kind, owner, wallet, account, vault,
                 block_number, block_timestamp, ingested_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(event_key) DO NOTHING
            "#,
        )
        .bind(&record.event_key)
        .bind(record.kind.as_str())
        .bind(record.owner.as_ref().map(|a| a.as_str().to_string()))
        .bind(record.wallet.as_ref().map(|a| a.as_str().to_string()))
        .bind(record.account.as_ref().map(|a| a.as_str().to_string()))
        .bind(record.vault.as_ref().map(|a| a.as_str().to_string()))
        .bind(record.block_number as i64)
        .bind(record.block_timestamp.as_i64())
        .bind(now_unix())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

fn treasury_update_from_row(row: &SqliteRow) -> TreasuryUpdate {
    let event_key: String = row.get("event_key");
    TreasuryUpdate {
        vault: Address::new(row.get::<String, _>("vault")),
        treasury: Address::new(row.get::<String, _>("treasury")),
        treasury_fee_percent: parse_amount(
            &event_key,
            "treasury_fee_percent",
            row.get::<String, _>("treasury_fee_percent").as_str(),
        ),
        block_timestamp: Timestamp::new(row.get("block_timestamp")),
        event_key,
    }
}

fn token_pair_update_from_row(row: &SqliteRow) -> TokenPairUpdate {
    TokenPairUpdate {
        event_key: row.get("event_key"),
        vault: Address::new(row.get::<String, _>("vault")),
        token0: Address::new(row.get::<String, _>("token0")),
        token1: Address::new(row.get::<String, _>("token1")),
        block_timestamp: Timestamp::new(row.get("block_timestamp")),
    }
}

fn amount_limits_update_from_row(row: &SqliteRow) -> AmountLimitsUpdate {
    let event_key: String = row.get("event_key");
    AmountLimitsUpdate {
        vault: Address::new(row.get::<String, _>("vault")),
        min_amount0: parse_amount(
            &event_key,
            "min_amount0",
            row.get::<String, _>("min_amount0").as_str(),
        ),
        max_amount0: parse_amount(
            &event_key,
            "max_amount0",
            row.get::<String, _>("max_amount0").as_str(),
        ),
        min_amount1: parse_amount(
            &event_key,
            "min_amount1",
            row.get::<String, _>("min_amount1").as_str(),
        ),
        max_amount1: parse_amount(
            &event_key,
            "max_amount1",
            row.get::<String, _>("max_amount1").as_str(),
        ),
        block_timestamp: Timestamp::new(row.get("block_timestamp")),
        event_key,
    }
}

fn factory_event_from_row(row: &SqliteRow) -> FactoryEventRecord {
    let kind = match row.get::<String, _>("kind").as_str() {
        "accountDeployed" => FactoryEventKind::AccountDeployed,
        "vaultAdded" => FactoryEventKind::VaultAdded,
        "vaultRemoved" => FactoryEventKind::VaultRemoved,
        _ => FactoryEventKind::WalletOwnershipSet,
    };
    FactoryEventRecord {
        event_key: row.get("event_key"),
        kind,
        owner: row.get::<Option<String>, _>("owner").map(Address::new),
        wallet: row.get::<Option<String>, _>("wallet").map(Address::new),
        account: row.get::<Option<String>, _>("account").map(Address::new),
        vault: row.get::<Option<String>, _>("vault").map(Address::new),
        block_number: row.get::<i64, _>("block_number") as u64,
        block_timestamp: Timestamp::new(row.get("block_timestamp")),
    }
}

impl Repository {
    /// Treasury-change history for a vault, oldest first.
    pub async fn query_treasury_updates(
        &self,
        vault: &Address,
    ) -> Result<Vec<TreasuryUpdate>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT event_key, vault, treasury, treasury_fee_percent, block_timestamp
            FROM treasury_updates
            WHERE vault = ?
            ORDER BY block_timestamp ASC, id ASC
            "#,
        )
        .bind(vault.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().map(treasury_update_from_row).collect())
    }

    /// Token-pair-change history for a vault, oldest first.
    pub async fn query_token_pair_updates(
        &self,
        vault: &Address,
    ) -> Result<Vec<TokenPairUpdate>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT event_key, vault, token0, token1, block_timestamp
            FROM token_pair_updates
            WHERE vault = ?
            ORDER BY block_timestamp ASC, id ASC
            "#,
        )
        .bind(vault.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().map(token_pair_update_from_row).collect())
    }

    /// Amount-limit-change history for a vault, oldest first.
    pub async fn query_amount_limits_updates(
        &self,
        vault: &Address,
    ) -> Result<Vec<AmountLimitsUpdate>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT event_key, vault, min_amount0, max_amount0, min_amount1, max_amount1,
                   block_timestamp
            FROM amount_limits_updates
            WHERE vault = ?
            ORDER BY block_timestamp ASC, id ASC
            "#,
        )
        .bind(vault.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().map(amount_limits_update_from_row).collect())
    }

    /// Raw factory event mirrors, optionally filtered by kind, in chain
    /// order.
    pub async fn query_factory_events(
        &self,
        kind: Option<FactoryEventKind>,
    ) -> Result<Vec<FactoryEventRecord>, sqlx::Error> {
        let rows = match kind {
            Some(kind) => {
                sqlx::query(
                    r#"
                    SELECT event_key, kind, owner, wallet, account, vault,
                           block_number, block_timestamp
                    FROM factory_events
                    WHERE kind = ?
                    ORDER BY block_number ASC, event_key ASC
                    "#,
                )
                .bind(kind.as_str())
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT event_key, kind, owner, wallet, account, vault,
                           block_number, block_timestamp
                    FROM factory_events
                    ORDER BY block_number ASC, event_key ASC
                    "#,
                )
                .fetch_all(self.pool())
                .await?
            }
        };
        Ok(rows.iter().map(factory_event_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::domain::Amount;
    use tempfile::TempDir;

    async fn setup() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn addr(last: &str) -> Address {
        Address::new(format!("0x{:0>40}", last))
    }

    fn treasury_update(event_key: &str) -> TreasuryUpdate {
        TreasuryUpdate {
            event_key: event_key.to_string(),
            vault: addr("02"),
            treasury: addr("0t"),
            treasury_fee_percent: Amount::from(5u64),
            block_timestamp: Timestamp::new(1_700_000_000),
        }
    }

    #[tokio::test]
    async fn test_duplicate_delivery_appends_two_rows() {
        let (repo, _temp) = setup().await;

        let record = treasury_update("0xabc-1");
        AuditSink::<TreasuryUpdate>::append(&repo, &record).await.unwrap();
        AuditSink::<TreasuryUpdate>::append(&repo, &record).await.unwrap();

        let updates = repo.query_treasury_updates(&addr("02")).await.unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], record);
        assert_eq!(updates[1], record);
    }

    #[tokio::test]
    async fn test_factory_mirror_unique_per_event_key() {
        let (repo, _temp) = setup().await;

        let mut record = FactoryEventRecord {
            event_key: "0xabc-0".to_string(),
            kind: FactoryEventKind::VaultAdded,
            owner: None,
            wallet: None,
            account: None,
            vault: Some(addr("02")),
            block_number: 10,
            block_timestamp: Timestamp::new(1_700_000_000),
        };
        AuditSink::<FactoryEventRecord>::append(&repo, &record).await.unwrap();
        // Re-delivery of the same chain event leaves a single mirror row.
        AuditSink::<FactoryEventRecord>::append(&repo, &record).await.unwrap();

        record.event_key = "0xdef-0".to_string();
        AuditSink::<FactoryEventRecord>::append(&repo, &record).await.unwrap();

        let mirrors = repo
            .query_factory_events(Some(FactoryEventKind::VaultAdded))
            .await
            .unwrap();
        assert_eq!(mirrors.len(), 2);
    }

    #[tokio::test]
    async fn test_audit_queries_filter_by_vault() {
        let (repo, _temp) = setup().await;

        let mut record = treasury_update("0xabc-1");
        AuditSink::<TreasuryUpdate>::append(&repo, &record).await.unwrap();
        record.vault = addr("03");
        record.event_key = "0xabc-2".to_string();
        AuditSink::<TreasuryUpdate>::append(&repo, &record).await.unwrap();

        let updates = repo.query_treasury_updates(&addr("02")).await.unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].event_key, "0xabc-1");
    }

    #[tokio::test]
    async fn test_token_pair_update_roundtrip() {
        let (repo, _temp) = setup().await;

        let record = TokenPairUpdate {
            event_key: "0xabc-1".to_string(),
            vault: addr("02"),
            token0: addr("a0"),
            token1: addr("a1"),
            block_timestamp: Timestamp::new(1_700_000_000),
        };
        AuditSink::<TokenPairUpdate>::append(&repo, &record).await.unwrap();

        let updates = repo.query_token_pair_updates(&addr("02")).await.unwrap();
        assert_eq!(updates, vec![record]);
    }
}
