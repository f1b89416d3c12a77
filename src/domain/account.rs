use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Coins, STARTING_BALANCE};

/// Accounts are keyed by the store's integer row id.
pub type AccountId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    /// Hex-encoded SHA-256 of password + salt. Never the plain password.
    #[serde(skip_serializing)]
    pub credential_hash: String,
    pub balance: Coins,
    pub created_at: DateTime<Utc>,
}

/// An account that has not been persisted yet. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub credential_hash: String,
    pub balance: Coins,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    pub fn new(username: impl Into<String>, credential_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            credential_hash: credential_hash.into(),
            balance: STARTING_BALANCE,
            created_at: Utc::now(),
        }
    }

    pub fn with_balance(mut self, balance: Coins) -> Self {
        self.balance = balance;
        self
    }
}

/// Hash a password with the configured salt.
pub fn hash_credential(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}
