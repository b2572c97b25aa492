//! Entity load/upsert: the projector's write path.

use crate::domain::{Account, Address, Position, Timestamp, TokenId, Vault, VaultDeposit};
use crate::store::{EntityStore, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{parse_amount, Repository};

pub(crate) fn account_from_row(row: &SqliteRow) -> Account {
    Account {
        id: row.get("id"),
        address: Address::new(row.get::<String, _>("address")),
        factory: Address::new(row.get::<String, _>("factory")),
        smart_account: Address::new(row.get::<String, _>("smart_account")),
        nonce: row.get("nonce"),
        created_at: Timestamp::new(row.get("created_at")),
        updated_at: Timestamp::new(row.get("updated_at")),
    }
}

pub(crate) fn vault_from_row(row: &SqliteRow) -> Vault {
    let id: String = row.get("id");
    Vault {
        address: Address::new(row.get::<String, _>("address")),
        token0: Address::new(row.get::<String, _>("token0")),
        token1: Address::new(row.get::<String, _>("token1")),
        treasury: Address::new(row.get::<String, _>("treasury")),
        treasury_fee_percent: parse_amount(
            &id,
            "treasury_fee_percent",
            row.get::<String, _>("treasury_fee_percent").as_str(),
        ),
        min_amount0: parse_amount(&id, "min_amount0", row.get::<String, _>("min_amount0").as_str()),
        max_amount0: parse_amount(&id, "max_amount0", row.get::<String, _>("max_amount0").as_str()),
        min_amount1: parse_amount(&id, "min_amount1", row.get::<String, _>("min_amount1").as_str()),
        max_amount1: parse_amount(&id, "max_amount1", row.get::<String, _>("max_amount1").as_str()),
        tick_spacing: row.get("tick_spacing"),
        position_manager: Address::new(row.get::<String, _>("position_manager")),
        active: row.get("active"),
        created_at: Timestamp::new(row.get("created_at")),
        updated_at: Timestamp::new(row.get("updated_at")),
        id,
    }
}

pub(crate) fn vault_deposit_from_row(row: &SqliteRow) -> VaultDeposit {
    VaultDeposit {
        id: row.get("id"),
        vault: Address::new(row.get::<String, _>("vault")),
        account: Address::new(row.get::<String, _>("account")),
        active_position_count: row.get("active_position_count"),
        created_at: Timestamp::new(row.get("created_at")),
        updated_at: Timestamp::new(row.get("updated_at")),
    }
}

pub(crate) fn position_from_row(row: &SqliteRow) -> Position {
    let id: String = row.get("id");
    Position {
        token_id: TokenId::new(row.get::<i64, _>("token_id") as u64),
        account: Address::new(row.get::<String, _>("account")),
        vault: Address::new(row.get::<String, _>("vault")),
        vault_deposit: row.get("vault_deposit"),
        fee0: parse_amount(&id, "fee0", row.get::<String, _>("fee0").as_str()),
        fee1: parse_amount(&id, "fee1", row.get::<String, _>("fee1").as_str()),
        liquidity: parse_amount(&id, "liquidity", row.get::<String, _>("liquidity").as_str()),
        nonce: row.get("nonce"),
        active: row.get("active"),
        created_at: Timestamp::new(row.get("created_at")),
        updated_at: Timestamp::new(row.get("updated_at")),
        id,
    }
}

#[async_trait]
impl EntityStore<Account> for Repository {
    async fn load(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|r| account_from_row(&r)))
    }

    async fn upsert(&self, entity: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, address, factory, smart_account, nonce, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                address = excluded.address,
                factory = excluded.factory,
                smart_account = excluded.smart_account,
                nonce = excluded.nonce,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&entity.id)
        .bind(entity.address.as_str())
        .bind(entity.factory.as_str())
        .bind(entity.smart_account.as_str())
        .bind(entity.nonce)
        .bind(entity.created_at.as_i64())
        .bind(entity.updated_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Vault> for Repository {
    async fn load(&self, id: &str) -> Result<Option<Vault>, StoreError> {
        let row = sqlx::query("SELECT * FROM vaults WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|r| vault_from_row(&r)))
    }

    async fn upsert(&self, entity: &Vault) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO vaults (
                id, address, token0, token1, treasury, treasury_fee_percent,
                min_amount0, max_amount0, min_amount1, max_amount1,
                tick_spacing, position_manager, active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                address = excluded.address,
                token0 = excluded.token0,
                token1 = excluded.token1,
                treasury = excluded.treasury,
                treasury_fee_percent = excluded.treasury_fee_percent,
                min_amount0 = excluded.min_amount0,
                max_amount0 = excluded.max_amount0,
                min_amount1 = excluded.min_amount1,
                max_amount1 = excluded.max_amount1,
                tick_spacing = excluded.tick_spacing,
                position_manager = excluded.position_manager,
                active = excluded.active,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&entity.id)
        .bind(entity.address.as_str())
        .bind(entity.token0.as_str())
        .bind(entity.token1.as_str())
        .bind(entity.treasury.as_str())
        .bind(entity.treasury_fee_percent.to_canonical_string())
        .bind(entity.min_amount0.to_canonical_string())
        .bind(entity.max_amount0.to_canonical_string())
        .bind(entity.min_amount1.to_canonical_string())
        .bind(entity.max_amount1.to_canonical_string())
        .bind(entity.tick_spacing)
        .bind(entity.position_manager.as_str())
        .bind(entity.active)
        .bind(entity.created_at.as_i64())
        .bind(entity.updated_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore<VaultDeposit> for Repository {
    async fn load(&self, id: &str) -> Result<Option<VaultDeposit>, StoreError> {
        let row = sqlx::query("SELECT * FROM vault_deposits WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|r| vault_deposit_from_row(&r)))
    }

    async fn upsert(&self, entity: &VaultDeposit) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO vault_deposits (id, vault, account, active_position_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                vault = excluded.vault,
                account = excluded.account,
                active_position_count = excluded.active_position_count,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&entity.id)
        .bind(entity.vault.as_str())
        .bind(entity.account.as_str())
        .bind(entity.active_position_count)
        .bind(entity.created_at.as_i64())
        .bind(entity.updated_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Position> for Repository {
    async fn load(&self, id: &str) -> Result<Option<Position>, StoreError> {
        let row = sqlx::query("SELECT * FROM positions WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|r| position_from_row(&r)))
    }

    async fn upsert(&self, entity: &Position) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO positions (
                id, token_id, account, vault, vault_deposit,
                fee0, fee1, liquidity, nonce, active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                token_id = excluded.token_id,
                account = excluded.account,
                vault = excluded.vault,
                vault_deposit = excluded.vault_deposit,
                fee0 = excluded.fee0,
                fee1 = excluded.fee1,
                liquidity = excluded.liquidity,
                nonce = excluded.nonce,
                active = excluded.active,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&entity.id)
        .bind(entity.token_id.as_u64() as i64)
        .bind(entity.account.as_str())
        .bind(entity.vault.as_str())
        .bind(&entity.vault_deposit)
        .bind(entity.fee0.to_canonical_string())
        .bind(entity.fee1.to_canonical_string())
        .bind(entity.liquidity.to_canonical_string())
        .bind(entity.nonce)
        .bind(entity.active)
        .bind(entity.created_at.as_i64())
        .bind(entity.updated_at.as_i64())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::domain::{Amount, PositionSeed, VaultDepositSeed};
    use crate::store::get_or_create;
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

    #[tokio::test]
    async fn test_account_upsert_roundtrip() {
        let (repo, _temp) = setup().await;

        let mut account = Account::with_defaults(addr("01"));
        account.nonce = 3;
        account.factory = addr("0f");
        account.created_at = Timestamp::new(100);
        EntityStore::<Account>::upsert(&repo, &account).await.unwrap();

        let loaded: Option<Account> =
            EntityStore::<Account>::load(&repo, &account.id).await.unwrap();
        assert_eq!(loaded, Some(account));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_fields() {
        let (repo, _temp) = setup().await;

        let mut vault = Vault::with_defaults(addr("02"));
        EntityStore::<Vault>::upsert(&repo, &vault).await.unwrap();

        vault.treasury = addr("0t");
        vault.active = true;
        vault.tick_spacing = 60;
        EntityStore::<Vault>::upsert(&repo, &vault).await.unwrap();

        let loaded: Vault = EntityStore::<Vault>::load(&repo, &vault.id)
            .await
            .unwrap()
            .expect("vault missing");
        assert_eq!(loaded.treasury, addr("0t"));
        assert!(loaded.active);
        assert_eq!(loaded.tick_spacing, 60);
    }

    #[tokio::test]
    async fn test_position_amounts_roundtrip_losslessly() {
        let (repo, _temp) = setup().await;

        let seed = PositionSeed {
            vault: addr("02"),
            account: addr("01"),
            token_id: TokenId::new(7),
        };
        let mut position = Position::with_defaults(seed);
        position.liquidity = Amount::from_str_canonical("123456789012345678901234567").unwrap();
        position.fee0 = Amount::from(5u64);
        EntityStore::<Position>::upsert(&repo, &position).await.unwrap();

        let loaded: Position = EntityStore::<Position>::load(&repo, &position.id)
            .await
            .unwrap()
            .expect("position missing");
        assert_eq!(
            loaded.liquidity.to_canonical_string(),
            "123456789012345678901234567"
        );
        assert_eq!(loaded.fee0, Amount::from(5u64));
    }

    #[tokio::test]
    async fn test_get_or_create_persists_on_miss_only() {
        let (repo, _temp) = setup().await;

        let seed = VaultDepositSeed {
            vault: addr("02"),
            account: addr("01"),
        };
        let (first, created_first): (VaultDeposit, bool) =
            get_or_create(&repo, seed.clone()).await.unwrap();
        assert!(created_first);

        let (second, created_second): (VaultDeposit, bool) =
            get_or_create(&repo, seed).await.unwrap();
        assert!(!created_second);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let (repo, _temp) = setup().await;
        let loaded: Option<Position> = EntityStore::<Position>::load(&repo, "nope").await.unwrap();
        assert!(loaded.is_none());
    }
}
