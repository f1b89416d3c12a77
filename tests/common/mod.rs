// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::time::Duration;

use anyhow::Result;
use coinshop::application::Ledger;
use coinshop::domain::{AccountId, Coins, NewAccount};
use coinshop::LedgerConfig;
use tempfile::TempDir;

/// Helper to create a test ledger with a temporary database
pub async fn test_ledger() -> Result<(Ledger, TempDir)> {
    test_ledger_with(|config| config).await
}

/// Same as [`test_ledger`], with a chance to adjust the configuration
pub async fn test_ledger_with(
    adjust: impl FnOnce(LedgerConfig) -> LedgerConfig,
) -> Result<(Ledger, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let config = adjust(
        LedgerConfig::new(db_path.to_str().unwrap()).with_busy_timeout(Duration::from_secs(10)),
    );
    let ledger = Ledger::init(&config).await?;
    Ok((ledger, temp_dir))
}

/// Register an account with the default starting balance
pub async fn register(ledger: &Ledger, username: &str) -> Result<AccountId> {
    Ok(ledger.accounts().register(username, "password").await?)
}

/// Insert an account with an arbitrary balance, bypassing registration
pub async fn account_with_balance(
    ledger: &Ledger,
    username: &str,
    balance: Coins,
) -> Result<AccountId> {
    let account = NewAccount::new(username, "not-a-real-hash").with_balance(balance);
    let id = ledger
        .unit_of_work()
        .run(move |scope| Box::pin(async move { Ok(scope.insert_account(&account).await?) }))
        .await?;
    Ok(id)
}

/// Current balance as seen by a fresh read scope
pub async fn balance(ledger: &Ledger, account_id: AccountId) -> Result<Coins> {
    Ok(ledger.queries().get_account_info(account_id).await?.coins)
}

/// Make matching row writes fail inside the store, via a trigger.
/// `event` is e.g. "INSERT ON transfers"; `when` is the trigger's WHEN clause.
pub async fn inject_failure(ledger: &Ledger, name: &str, event: &str, when: &str) -> Result<()> {
    let sql = format!(
        "CREATE TRIGGER {name} BEFORE {event} FOR EACH ROW WHEN {when} \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
    );
    sqlx::query(&sql)
        .execute(ledger.unit_of_work().repository().pool())
        .await?;
    Ok(())
}
