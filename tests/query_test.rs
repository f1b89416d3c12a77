mod common;

use anyhow::Result;
use coinshop::LedgerError;
use coinshop::domain::DEFAULT_CATALOG;
use common::{register, test_ledger};

#[tokio::test]
async fn test_fresh_account_info_has_empty_collections() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let alice = register(&ledger, "alice").await?;

    let info = ledger.queries().get_account_info(alice).await?;
    assert_eq!(info.coins, 1000);
    assert!(info.inventory.is_empty());
    assert!(info.coin_history.received.is_empty());
    assert!(info.coin_history.sent.is_empty());

    let json = serde_json::to_value(&info)?;
    assert_eq!(
        json,
        serde_json::json!({
            "coins": 1000,
            "inventory": [],
            "coinHistory": { "received": [], "sent": [] }
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_info_json_shape_after_activity() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let alice = register(&ledger, "alice").await?;
    let bob = register(&ledger, "bob").await?;

    ledger.purchases().buy_item(alice, "hoody").await?;
    ledger.transfers().send_coin(alice, "bob", 100).await?;
    ledger.transfers().send_coin(bob, "alice", 7).await?;

    let json = serde_json::to_value(ledger.queries().get_account_info(alice).await?)?;
    assert_eq!(
        json,
        serde_json::json!({
            "coins": 1000 - 300 - 100 + 7,
            "inventory": [{ "type": "hoody", "quantity": 1 }],
            "coinHistory": {
                "received": [{ "fromUser": "bob", "amount": 7 }],
                "sent": [{ "toUser": "bob", "amount": 100 }]
            }
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_unknown_account_info() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let err = ledger.queries().get_account_info(77).await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(77)));

    let err = ledger.queries().transfers(77).await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(77)));

    Ok(())
}

#[tokio::test]
async fn test_catalog_is_seeded_once() -> Result<()> {
    let (ledger, temp) = test_ledger().await?;

    let items = ledger.queries().catalog().await?;
    assert_eq!(items.len(), DEFAULT_CATALOG.len());
    assert!(items.windows(2).all(|pair| pair[0].name < pair[1].name));

    let t_shirt = items.iter().find(|item| item.name == "t-shirt").expect("seeded");
    assert_eq!(t_shirt.price, 80);

    // Re-initializing the same file must not duplicate the catalog
    ledger.close().await;
    let config = coinshop::LedgerConfig::new(temp.path().join("test.db").to_str().unwrap());
    let reopened = coinshop::Ledger::init(&config).await?;
    assert_eq!(reopened.queries().catalog().await?.len(), DEFAULT_CATALOG.len());

    Ok(())
}

#[tokio::test]
async fn test_connect_to_missing_database_fails() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let config = coinshop::LedgerConfig::new(temp.path().join("absent.db").to_str().unwrap());

    let err = coinshop::Ledger::connect(&config).await.err().expect("must fail");
    assert!(matches!(err, LedgerError::NotInitialized(ref path) if path.ends_with("absent.db")));
    assert_eq!(err.kind(), coinshop::application::ErrorKind::BusinessRule);
    assert!(err.to_string().contains("coinshop init"));
    assert!(!temp.path().join("absent.db").exists(), "connect must not create the file");

    Ok(())
}
