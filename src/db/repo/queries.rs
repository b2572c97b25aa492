//! Read-side queries serving the API.

use crate::domain::{Account, Address, Position, Vault, VaultDeposit};
use sqlx::QueryBuilder;

use super::entities::{account_from_row, position_from_row, vault_deposit_from_row, vault_from_row};
use super::Repository;

impl Repository {
    /// Fetch one vault by contract address.
    pub async fn get_vault(&self, address: &Address) -> Result<Option<Vault>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM vaults WHERE id = ?")
            .bind(address.as_str())
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|r| vault_from_row(&r)))
    }

    /// Fetch one account by owner address.
    pub async fn get_account(&self, address: &Address) -> Result<Option<Account>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?")
            .bind(address.as_str())
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(|r| account_from_row(&r)))
    }

    /// List vaults, optionally only active ones, in creation order.
    pub async fn list_vaults(&self, active_only: bool) -> Result<Vec<Vault>, sqlx::Error> {
        let sql = if active_only {
            "SELECT * FROM vaults WHERE active = 1 ORDER BY created_at ASC, id ASC"
        } else {
            "SELECT * FROM vaults ORDER BY created_at ASC, id ASC"
        };
        let rows = sqlx::query(sql).fetch_all(self.pool()).await?;
        Ok(rows.iter().map(vault_from_row).collect())
    }

    /// Query positions filtered by account and/or vault, optionally only
    /// active ones, in creation order.
    pub async fn query_positions(
        &self,
        account: Option<&Address>,
        vault: Option<&Address>,
        active_only: bool,
    ) -> Result<Vec<Position>, sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT * FROM positions WHERE 1=1");
        if let Some(account) = account {
            builder.push(" AND account = ").push_bind(account.as_str());
        }
        if let Some(vault) = vault {
            builder.push(" AND vault = ").push_bind(vault.as_str());
        }
        if active_only {
            builder.push(" AND active = 1");
        }
        builder.push(" ORDER BY created_at ASC, id ASC");

        let rows = builder.build().fetch_all(self.pool()).await?;
        Ok(rows.iter().map(position_from_row).collect())
    }

    /// All vault deposits for an account, in creation order.
    pub async fn query_vault_deposits(
        &self,
        account: &Address,
    ) -> Result<Vec<VaultDeposit>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM vault_deposits WHERE account = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(account.as_str())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.iter().map(vault_deposit_from_row).collect())
    }
}
