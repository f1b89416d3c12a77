use tracing::instrument;

use crate::domain::{AccountId, AccountInfo, CatalogItem, CoinHistory, TransferEntry};

use super::{LedgerError, UnitOfWork, balance, report_failure};

/// Read-only views of the ledger. Each call reads from a single snapshot.
#[derive(Clone)]
pub struct QueryWorkflow {
    uow: UnitOfWork,
}

impl QueryWorkflow {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Balance, inventory and coin history of one account.
    #[instrument(skip(self))]
    pub async fn get_account_info(&self, account_id: AccountId) -> Result<AccountInfo, LedgerError> {
        let outcome = self
            .uow
            .read(move |scope| {
                Box::pin(async move {
                    let coins = balance::balance_of(scope, account_id).await?;
                    let inventory = scope.list_inventory(account_id).await?;
                    let received = scope.list_received(account_id).await?;
                    let sent = scope.list_sent(account_id).await?;

                    Ok(AccountInfo {
                        coins,
                        inventory,
                        coin_history: CoinHistory { received, sent },
                    })
                })
            })
            .await;

        if let Err(err) = &outcome {
            report_failure("get_account_info", err);
        }
        outcome
    }

    /// The full catalog, ordered by item name.
    pub async fn catalog(&self) -> Result<Vec<CatalogItem>, LedgerError> {
        self.uow
            .read(|scope| Box::pin(async move { Ok(scope.list_catalog().await?) }))
            .await
    }

    /// Audit trail: every transfer the account took part in, oldest first.
    pub async fn transfers(&self, account_id: AccountId) -> Result<Vec<TransferEntry>, LedgerError> {
        self.uow
            .read(move |scope| {
                Box::pin(async move {
                    if !scope.account_exists(account_id).await? {
                        return Err(LedgerError::AccountNotFound(account_id));
                    }
                    Ok(scope.list_transfers_for_account(account_id).await?)
                })
            })
            .await
    }
}
