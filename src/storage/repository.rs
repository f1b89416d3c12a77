use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::config::LedgerConfig;
use crate::domain::DEFAULT_CATALOG;

use super::{MIGRATION_001_INITIAL, Scope};

/// Owner of the store connection pool. Cheap to clone: every clone shares the pool.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the SQLite database named in `config`.
    /// With `create` set, a missing database file is created.
    pub async fn connect(config: &LedgerConfig, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.database)
            .create_if_missing(create)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {}", config.database))?;

        tracing::debug!(database = %config.database, "connected to ledger store");
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Insert the default merch catalog. Existing items are left untouched.
    pub async fn seed_catalog(&self) -> Result<()> {
        for (name, price) in DEFAULT_CATALOG {
            sqlx::query("INSERT OR IGNORE INTO catalog_items (name, price) VALUES (?, ?)")
                .bind(*name)
                .bind(*price)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to seed catalog item {}", name))?;
        }
        Ok(())
    }

    /// Initialize a new database (connect + migrate + seed).
    pub async fn init(config: &LedgerConfig) -> Result<Self> {
        let repo = Self::connect(config, true).await?;
        repo.migrate().await?;
        repo.seed_catalog().await?;
        Ok(repo)
    }

    /// Open a scope that will write.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock up front, so concurrent writers
    /// wait on the busy timeout instead of failing a lock upgrade mid-scope.
    pub async fn begin_write(&self) -> Result<Scope> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .context("Failed to open write scope")?;
        Ok(Scope::new(tx))
    }

    /// Open a scope for a consistent multi-read snapshot.
    pub async fn begin_read(&self) -> Result<Scope> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to open read scope")?;
        Ok(Scope::new(tx))
    }

    /// Direct pool access, for administration and fault injection in tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
