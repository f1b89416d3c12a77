mod common;

use std::time::Duration;

use anyhow::Result;
use coinshop::LedgerError;
use coinshop::application::balance;
use common::{account_with_balance, register, test_ledger, test_ledger_with};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_debits_cannot_overdraw() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let account = account_with_balance(&ledger, "racer", 100).await?;

    let debit = move |ledger: coinshop::Ledger| async move {
        ledger
            .unit_of_work()
            .run(move |scope| Box::pin(async move { balance::debit(scope, account, 60).await }))
            .await
    };

    let first = tokio::spawn(debit(ledger.clone()));
    let second = tokio::spawn(debit(ledger.clone()));
    let outcomes = [first.await?, second.await?];

    let successes = outcomes.iter().filter(|o| o.is_ok()).count();
    let overdraws = outcomes
        .iter()
        .filter(|o| matches!(o, Err(LedgerError::InsufficientBalance { .. })))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(overdraws, 1);
    assert_eq!(common::balance(&ledger, account).await?, 40);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_transfers_conserve_coins() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let sender = account_with_balance(&ledger, "sender", 250).await?;
    let receiver = register(&ledger, "receiver").await?;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.transfers().send_coin(sender, "receiver", 50).await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => committed += 1,
            Err(LedgerError::InsufficientBalance { .. }) => {}
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert_eq!(committed, 5);
    assert_eq!(common::balance(&ledger, sender).await?, 0);
    assert_eq!(common::balance(&ledger, receiver).await?, 1000 + 250);

    let info = ledger.queries().get_account_info(receiver).await?;
    assert_eq!(info.coin_history.received.len(), 5);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_purchases_never_go_negative() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let buyer = account_with_balance(&ledger, "buyer", 95).await?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger.purchases().buy_item(buyer, "cup").await
        }));
    }

    let mut bought = 0;
    for handle in handles {
        if handle.await?.is_ok() {
            bought += 1;
        }
    }

    let info = ledger.queries().get_account_info(buyer).await?;
    assert_eq!(bought, 4);
    assert_eq!(info.coins, 15);
    assert_eq!(info.quantity_of("cup"), 4);

    Ok(())
}

#[tokio::test]
async fn test_scope_timeout_discards_mutations() -> Result<()> {
    let (ledger, _temp) =
        test_ledger_with(|config| config.with_scope_timeout(Duration::from_millis(200))).await?;
    let account = register(&ledger, "slow").await?;

    let err = ledger
        .unit_of_work()
        .run(move |scope| {
            Box::pin(async move {
                balance::debit(scope, account, 500).await?;
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Timeout(_)));
    assert!(err.is_transient());
    assert_eq!(common::balance(&ledger, account).await?, 1000);

    Ok(())
}

#[tokio::test]
async fn test_timeout_is_never_reported_for_a_committed_scope() -> Result<()> {
    let scope_timeout = Duration::from_millis(50);
    let (ledger, _temp) =
        test_ledger_with(|config| config.with_scope_timeout(scope_timeout)).await?;
    let account = register(&ledger, "edge").await?;

    // The body finishes right at the deadline, so the commit races the timer
    let mut expected = 1000;
    for _ in 0..40 {
        let outcome = ledger
            .unit_of_work()
            .run(move |scope| {
                Box::pin(async move {
                    balance::debit(scope, account, 10).await?;
                    tokio::time::sleep(scope_timeout).await;
                    Ok(())
                })
            })
            .await;

        match outcome {
            Ok(()) => expected -= 10,
            Err(LedgerError::Timeout(_)) => {}
            Err(other) => return Err(other.into()),
        }
        assert_eq!(common::balance(&ledger, account).await?, expected);
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_scope_discards_mutations() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let account = register(&ledger, "cancelled").await?;
    let (debited_tx, debited_rx) = tokio::sync::oneshot::channel::<()>();

    let worker = {
        let ledger = ledger.clone();
        tokio::spawn(async move {
            ledger
                .unit_of_work()
                .run(move |scope| {
                    Box::pin(async move {
                        balance::debit(scope, account, 300).await?;
                        let _ = debited_tx.send(());
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok(())
                    })
                })
                .await
        })
    };

    debited_rx.await?;
    worker.abort();
    assert!(worker.await.unwrap_err().is_cancelled());

    assert_eq!(common::balance(&ledger, account).await?, 1000);

    // The store is still writable once the aborted scope has been released
    ledger.purchases().buy_item(account, "pen").await?;
    assert_eq!(common::balance(&ledger, account).await?, 990);

    Ok(())
}

#[tokio::test]
async fn test_debit_of_missing_account_is_internal() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let err = ledger
        .unit_of_work()
        .run(|scope| Box::pin(async move { balance::debit(scope, 999, 10).await }))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::AccountMissing(999)));
    assert_eq!(err.kind(), coinshop::application::ErrorKind::Internal);

    let err = ledger
        .unit_of_work()
        .run(|scope| Box::pin(async move { balance::credit(scope, 999, 10).await }))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountMissing(999)));

    Ok(())
}
