//! Accumulator concurrency tests
//!
//! The credit path must linearize concurrent credits to one collection:
//! N concurrent credits of amount A must land as exactly previous + N x A.

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{CollectionCreditPort, Currency, Money, UserId};
use domain_collections::{CollectionDraft, CollectionStore};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_credits_are_exact() {
    let store = Arc::new(CollectionStore::new());
    let collection = store
        .create(CollectionDraft::new(
            "Harvest appeal",
            Currency::GHS,
            UserId::new(),
        ))
        .await
        .unwrap();

    // Seed a previous balance
    store
        .apply_credit(collection.id, Money::new(dec!(7.25), Currency::GHS))
        .await
        .unwrap();

    const WORKERS: usize = 64;
    let amount = Money::new(dec!(50.00), Currency::GHS);

    let mut handles = Vec::with_capacity(WORKERS);
    for _ in 0..WORKERS {
        let store = store.clone();
        let id = collection.id;
        handles.push(tokio::spawn(async move {
            store.apply_credit(id, amount).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let total = store.get(collection.id).await.unwrap().current_amount;
    // 7.25 + 64 * 50.00
    assert_eq!(total, Money::new(dec!(3207.25), Currency::GHS));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_credits_to_different_collections_do_not_interfere() {
    let store = Arc::new(CollectionStore::new());
    let a = store
        .create(CollectionDraft::new("Pot A", Currency::GHS, UserId::new()))
        .await
        .unwrap();
    let b = store
        .create(CollectionDraft::new("Pot B", Currency::GHS, UserId::new()))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..32 {
        let store = store.clone();
        let id = if i % 2 == 0 { a.id } else { b.id };
        handles.push(tokio::spawn(async move {
            store
                .apply_credit(id, Money::new(dec!(1.00), Currency::GHS))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(
        store.get(a.id).await.unwrap().current_amount,
        Money::new(dec!(16.00), Currency::GHS)
    );
    assert_eq!(
        store.get(b.id).await.unwrap().current_amount,
        Money::new(dec!(16.00), Currency::GHS)
    );
}
