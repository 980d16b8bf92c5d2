//! Static and keyed document caches.

use keepsake::KeyedDocument;

use crate::helpers::*;

#[tokio::test]
async fn test_static_cache_loads_once() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    store.save(sample_settings()).await.unwrap();

    let first = store.get_static::<ServerSettings>().await.unwrap();
    assert_eq!(first.max_players, 64);

    // Changes made behind the store's back are not seen until the entry is replaced
    backend
        .repo
        .save(
            &keepsake::Document::location(&first),
            &keepsake::Map::new(),
            &Default::default(),
        )
        .await
        .unwrap();
    let cached = store.get_static::<ServerSettings>();
    assert!(cached.runs_on_caller());
    assert_eq!(cached.await.unwrap().max_players, 64);
}

#[tokio::test]
async fn test_keyed_cache_override() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    store.save(arena("pit", 4)).await.unwrap();

    let pit = store.get_keyed::<Arena>("pit", false).await.unwrap();
    assert_eq!(pit.capacity, 4);

    // Saving through the store refreshes the cached entry
    let mut bigger = pit.clone();
    bigger.capacity = 6;
    store.save(bigger).await.unwrap();
    assert_eq!(store.get_keyed::<Arena>("pit", false).await.unwrap().capacity, 6);

    let mut seeded = keepsake::Map::new();
    seeded.insert("capacity", 9);
    seed_arena(&backend, "pit", seeded).await;
    assert_eq!(store.get_keyed::<Arena>("pit", false).await.unwrap().capacity, 6);
    assert_eq!(store.get_keyed::<Arena>("pit", true).await.unwrap().capacity, 9);
}

#[tokio::test]
async fn test_bulk_load_into_cache_and_evict() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    for (id, capacity) in [("alpha", 2), ("beta", 3)] {
        store.save(arena(id, capacity)).await.unwrap();
    }

    let count = store
        .load_all_keyed_into_cache(&Arena::with_id(String::new()))
        .await
        .unwrap();
    assert_eq!(count, 2);
    let cached = store.cached_keyed::<Arena>();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached["beta"].capacity, 3);

    store.delete(arena("alpha", 2)).await.unwrap();
    let cached = store.cached_keyed::<Arena>();
    assert_eq!(cached.len(), 1);
    assert!(!cached.contains_key("alpha"));
}

async fn seed_arena(backend: &TestRepository, id: &str, root: keepsake::Map) {
    backend
        .repo
        .save(
            &keepsake::Document::location(&Arena::with_id(id.into())),
            &root,
            &Default::default(),
        )
        .await
        .unwrap();
}
