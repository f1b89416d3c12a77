use serde::{Deserialize, Serialize};

use super::{AccountId, Coins};

pub type ItemId = i64;

/// A purchasable merch item. Reference data, never mutated by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub price: Coins,
}

/// Items seeded into a fresh store, as (name, price).
pub const DEFAULT_CATALOG: &[(&str, Coins)] = &[
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

/// One (account, item) row. Quantity is at least 1 once the row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryHolding {
    pub account_id: AccountId,
    pub item_id: ItemId,
    pub quantity: i64,
}

/// Inventory as reported to the account owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: i64,
}
