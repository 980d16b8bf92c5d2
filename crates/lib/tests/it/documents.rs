//! Documents through the store: round trips, first access, and field-level tolerance.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use keepsake::constants::META_VERSION_PATH;
use keepsake::repository::DocumentLocation;
use keepsake::{Clock, Document, FixedClock, KeyedDocument, Map, Node};

use crate::helpers::*;

#[tokio::test]
async fn test_round_trip_every_field_kind() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    store.save(sample_settings()).await.unwrap();
    let loaded = store.load(ServerSettings::default()).await.unwrap();

    let expected = ServerSettings {
        admin_password: String::new(),
        ..sample_settings()
    };
    assert_eq!(loaded, expected);
}

#[tokio::test]
async fn test_skipped_field_never_stored() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    let saved = store.save(sample_settings()).await.unwrap();
    assert_eq!(saved.admin_password, "hunter2");

    let root = backend
        .repo
        .load(&saved.location())
        .await
        .unwrap()
        .root
        .unwrap();
    assert!(!root.contains_key("admin_password"));
    assert_eq!(root.get("max-players"), Some(&Node::Int(64)));
    assert_eq!(root.get("difficulty"), Some(&Node::from("HARD")));
    assert_eq!(root.get("opened"), Some(&Node::from("2024-May-17-09-15-00")));
    assert_eq!(root.get_path(META_VERSION_PATH), Some(&Node::Int(1)));
}

#[tokio::test]
async fn test_first_access_creates_defaults() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    let arena = store.load(Arena::with_id("dunes".into())).await.unwrap();
    assert_eq!(arena.display_name, "Arena dunes");
    assert_eq!(arena.capacity, 8);

    let root = backend
        .repo
        .load(&arena.location())
        .await
        .unwrap()
        .root
        .unwrap();
    assert_eq!(root.get("display_name"), Some(&Node::from("Arena dunes")));
    assert_eq!(root.get_path(META_VERSION_PATH), Some(&Node::Int(1)));

    // The hook does not run again once the document exists
    let mut changed = arena.clone();
    changed.capacity = 12;
    store.save(changed).await.unwrap();
    let reloaded = store.load(Arena::with_id("dunes".into())).await.unwrap();
    assert_eq!(reloaded.capacity, 12);
}

#[tokio::test]
async fn test_unset_temporal_filled_from_clock() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    let saved = store.save(ServerSettings::default()).await.unwrap();
    assert_eq!(saved.opened, Some(FixedClock::default().now_datetime()));

    let root = backend
        .repo
        .load(&saved.location())
        .await
        .unwrap()
        .root
        .unwrap();
    assert_eq!(root.get("opened"), Some(&Node::from("2024-Jan-01-00-00-00")));
}

#[tokio::test]
async fn test_legacy_ordinal_keys_and_bad_fields() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    let mut caps = Map::new();
    caps.insert("0", 5);
    caps.insert("HARD", 70);
    let mut root = Map::new();
    root.insert("motd", "legacy");
    root.insert("difficulty", 1);
    root.insert("max-players", "lots");
    root.insert("mob_caps", caps);
    seed(backend.repo.as_ref(), "server", root).await;

    let loaded = store.load(ServerSettings::default()).await.unwrap();

    assert_eq!(loaded.motd, "legacy");
    assert_eq!(loaded.difficulty, Difficulty::Easy);
    // Unreadable values keep their defaults
    assert_eq!(loaded.max_players, 20);
    assert_eq!(loaded.mob_caps.get(&Difficulty::Peaceful), Some(&5));
    assert_eq!(loaded.mob_caps.get(&Difficulty::Hard), Some(&70));
}

#[tokio::test]
async fn test_first_save_runs_first_load() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    let saved = store.save(Arena::with_id("annex".into())).await.unwrap();
    assert_eq!(saved.display_name, "Arena annex");

    let mut renamed = saved.clone();
    renamed.display_name = String::new();
    let resaved = store.save(renamed).await.unwrap();
    assert_eq!(resaved.display_name, "");
}

#[tokio::test]
async fn test_delete_then_load_is_first_access() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    store.save(arena("pit", 4)).await.unwrap();
    store.delete(arena("pit", 4)).await.unwrap();

    let location = DocumentLocation::new("pit").with_path("arenas");
    assert!(backend.repo.load(&location).await.unwrap().first_access);

    let fresh = store.load(Arena::with_id("pit".into())).await.unwrap();
    assert_eq!(fresh.capacity, 8);
}

#[tokio::test]
async fn test_callbacks_run_after_success() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    let calls = Arc::new(AtomicU32::new(0));

    let seen = calls.clone();
    store
        .save_then(arena("ring", 6), move |a| {
            assert_eq!(a.capacity, 6);
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();
    let seen = calls.clone();
    store
        .load_then(Arena::with_id("ring".into()), move |a| {
            assert_eq!(a.display_name, "The ring");
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_load_all_keyed() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    for (id, capacity) in [("colosseum", 32), ("dunes", 10), ("pit", 4)] {
        store.save(arena(id, capacity)).await.unwrap();
    }
    // A static document elsewhere is not picked up
    store.save(sample_settings()).await.unwrap();

    let all = store.load_all(&Arena::with_id(String::new())).await.unwrap();
    let mut ids: Vec<_> = all.keys().cloned().collect();
    ids.sort();
    assert_eq!(ids, vec!["colosseum", "dunes", "pit"]);
    assert_eq!(all["dunes"].capacity, 10);
    assert_eq!(all["colosseum"].display_name, "The colosseum");
}

#[tokio::test]
async fn test_display_shows_saved_tree() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    let text = store.display(&mut sample_settings());
    assert!(text.starts_with("----- server -----"));
    assert!(text.contains("max-players: 64"));
    assert!(text.contains("difficulty: HARD"));
    assert!(!text.contains("hunter2"));
}
