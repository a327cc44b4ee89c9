use ledgerd::application::retry::RetryPolicy;
use ledgerd::application::service::BalanceService;
use ledgerd::domain::account::OperationKind;
use ledgerd::error::LedgerError;
use ledgerd::infrastructure::in_memory::InMemoryLedgerStore;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn service_with_store() -> (Arc<BalanceService>, InMemoryLedgerStore) {
    let store = InMemoryLedgerStore::new();
    let service = Arc::new(BalanceService::new(
        Arc::new(store.clone()),
        RetryPolicy::default(),
    ));
    (service, store)
}

#[tokio::test]
async fn test_single_account_lifecycle() {
    let (service, store) = service_with_store();

    let id = service.create_account().await.unwrap();
    assert_eq!(service.get_balance(id).await.unwrap(), dec!(0));

    service.deposit(id, dec!(1000.50)).await.unwrap();
    assert_eq!(service.get_balance(id).await.unwrap(), dec!(1000.50));

    let records = store.operations(id).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, OperationKind::Deposit);
    assert_eq!(records[0].amount, dec!(1000.50));
    assert_eq!(records[0].balance_after, dec!(1000.50));

    service.withdraw(id, dec!(500.50)).await.unwrap();
    assert_eq!(service.get_balance(id).await.unwrap(), dec!(500.00));

    // Draining the account and over-drawing leaves the balance untouched.
    service.withdraw(id, dec!(500)).await.unwrap();
    assert_eq!(
        service.withdraw(id, dec!(1000)).await,
        Err(LedgerError::InsufficientFunds)
    );
    assert_eq!(service.get_balance(id).await.unwrap(), dec!(0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_deposits_lose_no_updates() {
    let (service, store) = service_with_store();
    let id = service.create_account().await.unwrap();

    let tasks = 500;
    let mut handles = Vec::with_capacity(tasks);
    for _ in 0..tasks {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(
            async move { service.deposit(id, dec!(10)).await },
        ));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(service.get_balance(id).await.unwrap(), dec!(5000));
    // Exactly one audit record per success, regardless of interleaving.
    assert_eq!(store.operations(id).await.len(), tasks);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_mixed_load_conserves_balance() {
    let (service, store) = service_with_store();
    let id = service.create_account().await.unwrap();
    service.deposit(id, dec!(100000)).await.unwrap();

    // 1000 actors, each 5 deposits of 10 and 3 withdrawals of 5.
    let actors = 1000;
    let mut handles = Vec::with_capacity(actors);
    for _ in 0..actors {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            for _ in 0..5 {
                service.deposit(id, dec!(10)).await?;
            }
            for _ in 0..3 {
                service.withdraw(id, dec!(5)).await?;
            }
            Ok::<_, LedgerError>(())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // 100000 + 1000*5*10 - 1000*3*5
    assert_eq!(service.get_balance(id).await.unwrap(), dec!(135000.00));
    assert_eq!(store.operations(id).await.len(), 1 + actors * 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_overdraw_never_goes_negative() {
    let (service, _store) = service_with_store();
    let id = service.create_account().await.unwrap();
    service.deposit(id, dec!(100)).await.unwrap();

    // 50 withdrawals of 10 against a balance of 100: exactly 10 succeed.
    let mut handles = Vec::new();
    for _ in 0..50 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(
            async move { service.withdraw(id, dec!(10)).await },
        ));
    }

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => succeeded += 1,
            Err(LedgerError::InsufficientFunds) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(rejected, 40);
    assert_eq!(service.get_balance(id).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn test_accounts_are_independent() {
    let (service, _store) = service_with_store();
    let first = service.create_account().await.unwrap();
    let second = service.create_account().await.unwrap();

    service.deposit(first, dec!(25)).await.unwrap();
    service.deposit(second, dec!(75)).await.unwrap();
    service.withdraw(second, dec!(50)).await.unwrap();

    assert_eq!(service.get_balance(first).await.unwrap(), dec!(25));
    assert_eq!(service.get_balance(second).await.unwrap(), dec!(25));
}
