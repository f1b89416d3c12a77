//! Balance rules. Every balance mutation in the ledger goes through here.

use crate::domain::{AccountId, Coins};
use crate::storage::Scope;

use super::LedgerError;

/// Reduce an account's balance by `amount`, never below zero.
///
/// The guard and the subtraction are a single conditional update, so two
/// concurrent debits cannot both pass a stale balance check. When nothing is
/// updated, the account is probed in the same scope to tell an overdraw
/// (`InsufficientBalance`) from a vanished row (`AccountMissing`).
pub async fn debit(scope: &mut Scope, account_id: AccountId, amount: Coins) -> Result<(), LedgerError> {
    ensure_positive(amount)?;

    if scope.debit_if_sufficient(account_id, amount).await? == 1 {
        return Ok(());
    }

    match scope.get_balance(account_id).await? {
        Some(balance) => Err(LedgerError::InsufficientBalance {
            account_id,
            balance,
            required: amount,
        }),
        None => Err(LedgerError::AccountMissing(account_id)),
    }
}

/// Increase an account's balance by `amount`.
pub async fn credit(scope: &mut Scope, account_id: AccountId, amount: Coins) -> Result<(), LedgerError> {
    ensure_positive(amount)?;

    if scope.credit(account_id, amount).await? == 0 {
        return Err(LedgerError::AccountMissing(account_id));
    }
    Ok(())
}

/// Read the balance of an account that must exist.
pub async fn balance_of(scope: &mut Scope, account_id: AccountId) -> Result<Coins, LedgerError> {
    scope
        .get_balance(account_id)
        .await?
        .ok_or(LedgerError::AccountNotFound(account_id))
}

pub(crate) fn ensure_positive(amount: Coins) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(1).is_ok());
        assert!(matches!(ensure_positive(0), Err(LedgerError::InvalidAmount(0))));
        assert!(matches!(ensure_positive(-3), Err(LedgerError::InvalidAmount(-3))));
    }
}
