use serde::{Deserialize, Serialize};

use super::{CoinHistory, Coins, InventoryEntry};

/// Everything an account owner can see about themselves, read from one snapshot.
/// Collections are always present, empty rather than missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub coins: Coins,
    pub inventory: Vec<InventoryEntry>,
    pub coin_history: CoinHistory,
}

impl AccountInfo {
    /// Quantity held of a given item, 0 if none.
    pub fn quantity_of(&self, item: &str) -> i64 {
        self.inventory
            .iter()
            .filter(|entry| entry.item_type == item)
            .map(|entry| entry.quantity)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_info_serializes_empty_collections() {
        let json = serde_json::to_value(AccountInfo::default()).unwrap();

        assert_eq!(json["coins"], 0);
        assert_eq!(json["inventory"], serde_json::json!([]));
        assert_eq!(json["coinHistory"]["received"], serde_json::json!([]));
        assert_eq!(json["coinHistory"]["sent"], serde_json::json!([]));
    }

    #[test]
    fn test_quantity_of() {
        let info = AccountInfo {
            coins: 900,
            inventory: vec![InventoryEntry {
                item_type: "cup".into(),
                quantity: 3,
            }],
            coin_history: CoinHistory::default(),
        };

        assert_eq!(info.quantity_of("cup"), 3);
        assert_eq!(info.quantity_of("pen"), 0);
    }
}
