//! Worker pool backpressure as seen through the store.

use std::sync::Arc;

use keepsake::StoreSettings;

use crate::helpers::*;

fn tight_settings() -> StoreSettings {
    StoreSettings {
        workers: 1,
        queue_capacity: 0,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_saturated_pool_runs_on_caller() {
    let repo = Arc::new(GatedRepository::new());
    let store = store_with_settings(repo.clone(), tight_settings());

    let first = store.save(arena("alpha", 1));
    let second = store.save(arena("beta", 2));
    assert!(!first.runs_on_caller());
    assert!(second.runs_on_caller());
    assert_eq!(store.executor().available_slots(), 0);

    repo.open();
    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.unwrap().capacity, 1);
    assert_eq!(second.unwrap().capacity, 2);

    // Nothing was dropped
    let all = store.load_all(&arena("", 0)).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_slots_return_after_completion() {
    let backend = test_repository().await;
    let store = store_with_settings(backend.repo.clone(), tight_settings());

    store.save(arena("alpha", 1)).await.unwrap();
    assert_eq!(store.executor().available_slots(), 1);

    let next = store.save(arena("beta", 1));
    assert!(!next.runs_on_caller());
    next.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_still_completes_work() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    store.get_static::<ServerSettings>().await.unwrap();
    assert!(!store.cache().is_empty());

    store.shutdown();
    assert!(store.cache().is_empty());
    assert!(store.executor().is_closed());

    let handle = store.save(sample_settings());
    assert!(handle.runs_on_caller());
    assert_eq!(handle.await.unwrap().max_players, 64);
}
