use serde::Serialize;
use tracing::instrument;

use crate::domain::{AccountId, Coins};

use super::{LedgerError, UnitOfWork, balance, report_failure};

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    pub item: String,
    pub price: Coins,
    /// Buyer's balance after the debit
    pub balance: Coins,
    /// Quantity of this item now held by the buyer
    pub quantity: i64,
}

/// Spends coins on catalog items.
#[derive(Clone)]
pub struct PurchaseWorkflow {
    uow: UnitOfWork,
}

impl PurchaseWorkflow {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Buy one unit of `item_name` for `account_id`.
    ///
    /// Debit and inventory change commit together or not at all. Nothing is
    /// retried; on failure the caller resubmits.
    #[instrument(skip(self))]
    pub async fn buy_item(
        &self,
        account_id: AccountId,
        item_name: &str,
    ) -> Result<PurchaseReceipt, LedgerError> {
        let item_name = item_name.to_string();

        let outcome = self
            .uow
            .run(move |scope| {
                Box::pin(async move {
                    let item = scope
                        .get_item_by_name(&item_name)
                        .await?
                        .ok_or_else(|| LedgerError::ItemNotFound(item_name.clone()))?;

                    let balance = balance::balance_of(scope, account_id).await?;
                    if item.price > balance {
                        return Err(LedgerError::InsufficientBalance {
                            account_id,
                            balance,
                            required: item.price,
                        });
                    }

                    // A concurrent debit may have landed since the read above
                    balance::debit(scope, account_id, item.price).await?;

                    let quantity = match scope.get_holding(account_id, item.id).await? {
                        Some(holding) => {
                            scope.increment_holding(account_id, item.id).await?;
                            holding.quantity + 1
                        }
                        None => {
                            scope.insert_holding(account_id, item.id).await?;
                            1
                        }
                    };

                    Ok(PurchaseReceipt {
                        item: item.name,
                        price: item.price,
                        balance: balance - item.price,
                        quantity,
                    })
                })
            })
            .await;

        match &outcome {
            Ok(receipt) => tracing::info!(
                account_id,
                item = %receipt.item,
                price = receipt.price,
                quantity = receipt.quantity,
                "purchase committed"
            ),
            Err(err) => report_failure("buy_item", err),
        }
        outcome
    }
}
