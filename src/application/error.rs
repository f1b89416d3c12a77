use std::time::Duration;

use thiserror::Error;

use crate::domain::{AccountId, Coins};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Insufficient balance in account {account_id}: balance {balance}, required {required}")]
    InsufficientBalance {
        account_id: AccountId,
        balance: Coins,
        required: Coins,
    },

    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),

    #[error("Cannot send coins to yourself")]
    SelfTransfer,

    #[error("Invalid amount: {0}")]
    InvalidAmount(Coins),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Incorrect password for {0}")]
    IncorrectPassword(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Database {0} is not initialized; run `coinshop init` first")]
    NotInitialized(String),

    /// A row the scope relied on vanished between lookup and mutation.
    #[error("Account {0} disappeared during an atomic scope")]
    AccountMissing(AccountId),

    #[error("Atomic scope exceeded {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

/// How the boundary layer should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected outcome of bad input or state; the caller must change the request
    BusinessRule,
    /// The store was unavailable or slow; resubmitting may succeed
    Transient,
    /// Should not happen; opaque to the caller
    Internal,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::ItemNotFound(_)
            | LedgerError::InsufficientBalance { .. }
            | LedgerError::RecipientNotFound(_)
            | LedgerError::SelfTransfer
            | LedgerError::InvalidAmount(_)
            | LedgerError::AccountNotFound(_)
            | LedgerError::UsernameTaken(_)
            | LedgerError::IncorrectPassword(_)
            | LedgerError::InvalidCredentials(_)
            | LedgerError::NotInitialized(_) => ErrorKind::BusinessRule,
            LedgerError::Timeout(_) => ErrorKind::Transient,
            LedgerError::AccountMissing(_) => ErrorKind::Internal,
            LedgerError::Database(err) => {
                if is_transient_store_error(err) {
                    ErrorKind::Transient
                } else {
                    ErrorKind::Internal
                }
            }
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Stable short label, for mapping onto transport status codes.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::ItemNotFound(_) => "item_not_found",
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::RecipientNotFound(_) => "recipient_not_found",
            LedgerError::SelfTransfer => "self_transfer",
            LedgerError::InvalidAmount(_) => "invalid_amount",
            LedgerError::AccountNotFound(_) => "account_not_found",
            LedgerError::UsernameTaken(_) => "username_taken",
            LedgerError::IncorrectPassword(_) => "incorrect_password",
            LedgerError::InvalidCredentials(_) => "invalid_credentials",
            LedgerError::NotInitialized(_) => "not_initialized",
            LedgerError::AccountMissing(_) => "internal",
            LedgerError::Timeout(_) => "timeout",
            LedgerError::Database(_) => match self.kind() {
                ErrorKind::Transient => "unavailable",
                _ => "internal",
            },
        }
    }
}

/// Walk the context chain looking for a store error that a retry could fix.
fn is_transient_store_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| match cause.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => true,
        Some(sqlx::Error::Database(db_err)) => {
            // SQLITE_BUSY (5) and SQLITE_LOCKED (6), including extended codes
            db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .is_some_and(|code| matches!(code & 0xff, 5 | 6))
        }
        _ => false,
    })
}
