use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, Transaction};

use crate::domain::{
    Account, AccountId, CatalogItem, Coins, InventoryEntry, InventoryHolding, ItemId, NewAccount,
    TransferDetail, TransferEntry, TransferRecord,
};

/// An open atomic scope over the ledger store.
///
/// Every row operation goes through the same underlying transaction. Nothing
/// written here is visible to other scopes until [`Scope::commit`]; dropping a
/// scope without committing rolls it back.
pub struct Scope {
    tx: Transaction<'static, Sqlite>,
}

impl Scope {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Publish every mutation made in this scope.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.context("Failed to commit scope")
    }

    /// Discard every mutation made in this scope.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await.context("Failed to roll back scope")
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a new account and return its id.
    pub async fn insert_account(&mut self, account: &NewAccount) -> Result<AccountId> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (username, credential_hash, balance, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&account.username)
        .bind(&account.credential_hash)
        .bind(account.balance)
        .bind(account.created_at.to_rfc3339())
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to insert account")?;

        Ok(row.get("id"))
    }

    /// Resolve a username to its account.
    pub async fn find_account_by_username(&mut self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, credential_hash, balance, created_at
            FROM accounts
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch account by username")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// Get an account by id.
    pub async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, credential_hash, balance, created_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    pub async fn account_exists(&mut self, id: AccountId) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?) AS present")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await
            .context("Failed to probe account")?;

        Ok(row.get::<i64, _>("present") != 0)
    }

    /// Current balance, or `None` when the account does not exist.
    pub async fn get_balance(&mut self, id: AccountId) -> Result<Option<Coins>> {
        let row = sqlx::query("SELECT balance FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .context("Failed to fetch balance")?;

        Ok(row.map(|row| row.get("balance")))
    }

    /// Subtract `amount` only where the balance covers it.
    /// Check and mutation are one statement; returns the number of rows changed.
    pub async fn debit_if_sufficient(&mut self, id: AccountId, amount: Coins) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance - ?
            WHERE id = ? AND balance >= ?
            "#,
        )
        .bind(amount)
        .bind(id)
        .bind(amount)
        .execute(&mut *self.tx)
        .await
        .context("Failed to debit account")?;

        Ok(result.rows_affected())
    }

    /// Add `amount` to the balance; returns the number of rows changed.
    pub async fn credit(&mut self, id: AccountId, amount: Coins) -> Result<u64> {
        let result = sqlx::query("UPDATE accounts SET balance = balance + ? WHERE id = ?")
            .bind(amount)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .context("Failed to credit account")?;

        Ok(result.rows_affected())
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let created_at_str: String = row.get("created_at");

        Ok(Account {
            id: row.get("id"),
            username: row.get("username"),
            credential_hash: row.get("credential_hash"),
            balance: row.get("balance"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Catalog and inventory operations
    // ========================

    /// Get a catalog item by name.
    pub async fn get_item_by_name(&mut self, name: &str) -> Result<Option<CatalogItem>> {
        let row = sqlx::query("SELECT id, name, price FROM catalog_items WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .context("Failed to fetch catalog item")?;

        Ok(row.map(|row| CatalogItem {
            id: row.get("id"),
            name: row.get("name"),
            price: row.get("price"),
        }))
    }

    /// List the whole catalog, ordered by name.
    pub async fn list_catalog(&mut self) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query("SELECT id, name, price FROM catalog_items ORDER BY name")
            .fetch_all(&mut *self.tx)
            .await
            .context("Failed to list catalog")?;

        Ok(rows
            .iter()
            .map(|row| CatalogItem {
                id: row.get("id"),
                name: row.get("name"),
                price: row.get("price"),
            })
            .collect())
    }

    pub async fn get_holding(
        &mut self,
        account_id: AccountId,
        item_id: ItemId,
    ) -> Result<Option<InventoryHolding>> {
        let row = sqlx::query(
            r#"
            SELECT account_id, item_id, quantity
            FROM inventory
            WHERE account_id = ? AND item_id = ?
            "#,
        )
        .bind(account_id)
        .bind(item_id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch inventory holding")?;

        Ok(row.map(|row| InventoryHolding {
            account_id: row.get("account_id"),
            item_id: row.get("item_id"),
            quantity: row.get("quantity"),
        }))
    }

    /// Create a holding with quantity 1.
    pub async fn insert_holding(&mut self, account_id: AccountId, item_id: ItemId) -> Result<()> {
        sqlx::query("INSERT INTO inventory (account_id, item_id, quantity) VALUES (?, ?, 1)")
            .bind(account_id)
            .bind(item_id)
            .execute(&mut *self.tx)
            .await
            .context("Failed to insert inventory holding")?;
        Ok(())
    }

    /// Bump an existing holding by one; returns the number of rows changed.
    pub async fn increment_holding(&mut self, account_id: AccountId, item_id: ItemId) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE inventory SET quantity = quantity + 1 WHERE account_id = ? AND item_id = ?",
        )
        .bind(account_id)
        .bind(item_id)
        .execute(&mut *self.tx)
        .await
        .context("Failed to update inventory holding")?;

        Ok(result.rows_affected())
    }

    /// Inventory grouped by item, ordered by item name.
    pub async fn list_inventory(&mut self, account_id: AccountId) -> Result<Vec<InventoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT c.name AS item_type, SUM(i.quantity) AS quantity
            FROM inventory AS i
            JOIN catalog_items AS c ON i.item_id = c.id
            WHERE i.account_id = ?
            GROUP BY c.name
            ORDER BY c.name
            "#,
        )
        .bind(account_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list inventory")?;

        Ok(rows
            .iter()
            .map(|row| InventoryEntry {
                item_type: row.get("item_type"),
                quantity: row.get("quantity"),
            })
            .collect())
    }

    // ========================
    // Transfer operations
    // ========================

    /// Append a transfer record. The store-assigned id is written back.
    pub async fn insert_transfer(&mut self, record: &mut TransferRecord) -> Result<()> {
        let row = sqlx::query(
            r#"
            INSERT INTO transfers (from_account_id, to_account_id, amount, recorded_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(record.from_account)
        .bind(record.to_account)
        .bind(record.amount)
        .bind(record.recorded_at.to_rfc3339())
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to insert transfer")?;

        record.id = row.get("id");
        Ok(())
    }

    /// Transfers received by an account, joined to the sender's username.
    pub async fn list_received(&mut self, account_id: AccountId) -> Result<Vec<TransferDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT a.username AS from_user, t.amount
            FROM transfers AS t
            JOIN accounts AS a ON t.from_account_id = a.id
            WHERE t.to_account_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(account_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list received transfers")?;

        Ok(rows
            .iter()
            .map(|row| {
                TransferDetail::received_from(row.get::<String, _>("from_user"), row.get("amount"))
            })
            .collect())
    }

    /// Transfers sent by an account, joined to the recipient's username.
    pub async fn list_sent(&mut self, account_id: AccountId) -> Result<Vec<TransferDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT a.username AS to_user, t.amount
            FROM transfers AS t
            JOIN accounts AS a ON t.to_account_id = a.id
            WHERE t.from_account_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(account_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list sent transfers")?;

        Ok(rows
            .iter()
            .map(|row| TransferDetail::sent_to(row.get::<String, _>("to_user"), row.get("amount")))
            .collect())
    }

    /// Every transfer touching an account, in insertion order, joined to
    /// both usernames.
    pub async fn list_transfers_for_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<TransferEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.from_account_id, t.to_account_id, t.amount, t.recorded_at,
                   sender.username AS from_user, recipient.username AS to_user
            FROM transfers AS t
            JOIN accounts AS sender ON t.from_account_id = sender.id
            JOIN accounts AS recipient ON t.to_account_id = recipient.id
            WHERE t.from_account_id = ? OR t.to_account_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(account_id)
        .bind(account_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list transfers for account")?;

        rows.iter()
            .map(|row| -> Result<TransferEntry> {
                Ok(TransferEntry {
                    transfer: Self::row_to_transfer(row)?,
                    from_user: row.get("from_user"),
                    to_user: row.get("to_user"),
                })
            })
            .collect()
    }

    fn row_to_transfer(row: &sqlx::sqlite::SqliteRow) -> Result<TransferRecord> {
        let recorded_at_str: String = row.get("recorded_at");

        Ok(TransferRecord {
            id: row.get("id"),
            from_account: row.get("from_account_id"),
            to_account: row.get("to_account_id"),
            amount: row.get("amount"),
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                .context("Invalid recorded_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
