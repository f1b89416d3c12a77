use std::path::Path;

use crate::config::LedgerConfig;
use crate::storage::Repository;

use super::{AccountDirectory, LedgerError, PurchaseWorkflow, QueryWorkflow, TransferWorkflow, UnitOfWork};

/// Composition root: one store, one unit-of-work handle, and the workflows
/// built around it. This is the primary entry point for any client (CLI, HTTP, tests).
#[derive(Clone)]
pub struct Ledger {
    uow: UnitOfWork,
    accounts: AccountDirectory,
    purchases: PurchaseWorkflow,
    transfers: TransferWorkflow,
    queries: QueryWorkflow,
}

impl Ledger {
    /// Wire the workflows around an existing repository.
    pub fn new(repo: Repository, config: &LedgerConfig) -> Self {
        let uow = UnitOfWork::new(repo, config.scope_timeout);
        Self {
            accounts: AccountDirectory::new(uow.clone(), config.credential_salt.clone()),
            purchases: PurchaseWorkflow::new(uow.clone()),
            transfers: TransferWorkflow::new(uow.clone()),
            queries: QueryWorkflow::new(uow.clone()),
            uow,
        }
    }

    /// Create (if needed), migrate and seed the database, then wire the workflows.
    pub async fn init(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let repo = Repository::init(config).await?;
        Ok(Self::new(repo, config))
    }

    /// Connect to an existing database. A missing database file is reported
    /// as `NotInitialized` rather than as a store failure.
    pub async fn connect(config: &LedgerConfig) -> Result<Self, LedgerError> {
        if !Path::new(&config.database).exists() {
            return Err(LedgerError::NotInitialized(config.database.clone()));
        }
        let repo = Repository::connect(config, false).await?;
        Ok(Self::new(repo, config))
    }

    pub fn accounts(&self) -> &AccountDirectory {
        &self.accounts
    }

    pub fn purchases(&self) -> &PurchaseWorkflow {
        &self.purchases
    }

    pub fn transfers(&self) -> &TransferWorkflow {
        &self.transfers
    }

    pub fn queries(&self) -> &QueryWorkflow {
        &self.queries
    }

    pub fn unit_of_work(&self) -> &UnitOfWork {
        &self.uow
    }

    pub async fn close(&self) {
        self.uow.repository().close().await;
    }
}
