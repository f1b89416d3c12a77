use serde::Serialize;
use tracing::instrument;

use crate::domain::{AccountId, Coins, TransferRecord};

use super::{LedgerError, UnitOfWork, balance, report_failure};

/// Outcome of a successful coin transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub transfer: TransferRecord,
    pub recipient: String,
    /// Sender's balance after the debit
    pub balance: Coins,
}

/// Moves coins between accounts.
#[derive(Clone)]
pub struct TransferWorkflow {
    uow: UnitOfWork,
}

impl TransferWorkflow {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Send `amount` coins from `from_account` to the account named `to_username`.
    ///
    /// Debit, credit and the transfer record commit together. The record is
    /// only inserted once both balance mutations have succeeded.
    #[instrument(skip(self))]
    pub async fn send_coin(
        &self,
        from_account: AccountId,
        to_username: &str,
        amount: Coins,
    ) -> Result<TransferReceipt, LedgerError> {
        if let Err(err) = balance::ensure_positive(amount) {
            report_failure("send_coin", &err);
            return Err(err);
        }

        let to_username = to_username.to_string();

        let outcome = self
            .uow
            .run(move |scope| {
                Box::pin(async move {
                    let recipient = scope
                        .find_account_by_username(&to_username)
                        .await?
                        .ok_or_else(|| LedgerError::RecipientNotFound(to_username.clone()))?;

                    if recipient.id == from_account {
                        return Err(LedgerError::SelfTransfer);
                    }

                    let balance = balance::balance_of(scope, from_account).await?;
                    if amount > balance {
                        return Err(LedgerError::InsufficientBalance {
                            account_id: from_account,
                            balance,
                            required: amount,
                        });
                    }

                    balance::debit(scope, from_account, amount).await?;
                    balance::credit(scope, recipient.id, amount).await?;

                    let mut transfer = TransferRecord::new(from_account, recipient.id, amount);
                    scope.insert_transfer(&mut transfer).await?;

                    Ok(TransferReceipt {
                        transfer,
                        recipient: recipient.username,
                        balance: balance - amount,
                    })
                })
            })
            .await;

        match &outcome {
            Ok(receipt) => tracing::info!(
                from_account,
                to_account = receipt.transfer.to_account,
                amount,
                transfer_id = receipt.transfer.id,
                "transfer committed"
            ),
            Err(err) => report_failure("send_coin", err),
        }
        outcome
    }
}
