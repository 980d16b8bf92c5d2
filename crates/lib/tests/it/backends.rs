//! The same documents through every repository this build supports.

use keepsake::{Document, KeyedDocument};

use crate::helpers::*;

#[tokio::test]
async fn test_backends_store_identical_trees() {
    let mut trees = Vec::new();
    for backend in TestRepository::all().await {
        let store = store_on(backend.repo.clone());
        let saved = store.save(sample_settings()).await.unwrap();
        let loaded = store.load(ServerSettings::default()).await.unwrap();
        assert_eq!(loaded.spawn, saved.spawn, "{} backend", backend.repo.kind());
        assert_eq!(loaded.mob_caps, saved.mob_caps, "{} backend", backend.repo.kind());

        let root = backend
            .repo
            .load(&saved.location())
            .await
            .unwrap()
            .root
            .unwrap();
        trees.push((backend.repo.kind(), root));
    }

    let (first_kind, first_tree) = &trees[0];
    for (kind, tree) in &trees[1..] {
        assert_eq!(tree, first_tree, "{kind} differs from {first_kind}");
    }
}

#[tokio::test]
async fn test_infinite_float_survives_every_backend() {
    let mut trees = Vec::new();
    for backend in TestRepository::all().await {
        let store = store_on(backend.repo.clone());
        let mut settings = sample_settings();
        settings.view_distance = f64::INFINITY;
        store.save(settings).await.unwrap();

        let loaded = store.load(ServerSettings::default()).await.unwrap();
        assert_eq!(loaded.view_distance, f64::INFINITY, "{} backend", backend.repo.kind());

        let root = backend
            .repo
            .load(&loaded.location())
            .await
            .unwrap()
            .root
            .unwrap();
        trees.push((backend.repo.kind(), root));
    }

    let (first_kind, first_tree) = &trees[0];
    for (kind, tree) in &trees[1..] {
        assert_eq!(tree, first_tree, "{kind} differs from {first_kind}");
    }
}

#[tokio::test]
async fn test_backends_list_keyed_documents() {
    for backend in TestRepository::all().await {
        let store = store_on(backend.repo.clone());
        for id in ["west", "east", "north"] {
            store.save(arena(id, 2)).await.unwrap();
        }
        store.delete(arena("north", 2)).await.unwrap();

        let base = backend.repo.resolve_path(&Arena::with_id(String::new()).location());
        let ids = backend.repo.list_documents(&base).await.unwrap();
        assert_eq!(ids, vec!["east", "west"], "{} backend", backend.repo.kind());
    }
}

#[tokio::test]
async fn test_missing_base_path_lists_nothing() {
    for backend in TestRepository::all().await {
        let ids = backend.repo.list_documents("nowhere").await.unwrap();
        assert!(ids.is_empty(), "{} backend", backend.repo.kind());
    }
}
