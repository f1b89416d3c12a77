use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Coins};

pub type TransferId = i64;

/// A coin movement from one account to another.
/// Records are append-only: once inserted they are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Assigned by the store on insert; insertion order doubles as time order
    pub id: TransferId,
    pub from_account: AccountId,
    pub to_account: AccountId,
    /// Always positive
    pub amount: Coins,
    pub recorded_at: DateTime<Utc>,
}

impl TransferRecord {
    /// Create a new record. The id is assigned by the store.
    pub fn new(from_account: AccountId, to_account: AccountId, amount: Coins) -> Self {
        assert!(amount > 0, "Transfer amount must be positive");
        Self {
            id: 0,
            from_account,
            to_account,
            amount,
            recorded_at: Utc::now(),
        }
    }

    pub fn involves(&self, account: AccountId) -> bool {
        self.from_account == account || self.to_account == account
    }
}

/// One line of an account's coin history, joined to the counterpart's username.
/// Received entries carry `from_user`, sent entries carry `to_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDetail {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub to_user: Option<String>,
    pub amount: Coins,
}

impl TransferDetail {
    pub fn received_from(username: impl Into<String>, amount: Coins) -> Self {
        Self {
            from_user: Some(username.into()),
            to_user: None,
            amount,
        }
    }

    pub fn sent_to(username: impl Into<String>, amount: Coins) -> Self {
        Self {
            from_user: None,
            to_user: Some(username.into()),
            amount,
        }
    }
}

/// A transfer record together with the usernames on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEntry {
    #[serde(flatten)]
    pub transfer: TransferRecord,
    pub from_user: String,
    pub to_user: String,
}

impl TransferEntry {
    /// Whether `account` paid out in this transfer.
    pub fn is_sent_by(&self, account: AccountId) -> bool {
        self.transfer.from_account == account
    }

    /// Username on the other side of the transfer, as seen from `account`.
    pub fn counterpart(&self, account: AccountId) -> &str {
        if self.is_sent_by(account) {
            &self.to_user
        } else {
            &self.from_user
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    pub received: Vec<TransferDetail>,
    pub sent: Vec<TransferDetail>,
}
