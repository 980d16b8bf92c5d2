//! What the file repository writes to disk.

use std::sync::Arc;

use keepsake::repository::{Repository, YamlRepository};
use keepsake::{Document, KeyedDocument};

use crate::helpers::*;

#[tokio::test]
async fn test_file_layout_and_banners() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(YamlRepository::new(dir.path()));
    let store = store_on(repo.clone());

    let settings = store.save(sample_settings()).await.unwrap();

    let path = repo.file_path(&settings.location());
    assert_eq!(path, dir.path().join("server").join("server.yml"));
    let text = std::fs::read_to_string(&path).unwrap();

    assert!(text.starts_with("# +---"));
    assert!(text.contains("# Server settings\n# Edit while the server is stopped\n"));
    assert!(text.contains("\nserver:\n"));
    assert!(text.contains("  max-players: 64\n"));
    assert!(text.contains("  __meta:\n    version: 1\n"));
    assert!(text.trim_end().ends_with("+ #"));
    assert!(text.contains("# end of server settings\n"));
    assert!(!text.contains("hunter2"));

    // Hand edits survive a reload
    std::fs::write(&path, text.replace("max-players: 64", "max-players: 80")).unwrap();
    let reloaded = store.load(ServerSettings::default()).await.unwrap();
    assert_eq!(reloaded.max_players, 80);
}

#[tokio::test]
async fn test_keyed_documents_share_folder() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(YamlRepository::new(dir.path()));
    let store = store_on(repo.clone());

    store.save(arena("colosseum", 16)).await.unwrap();
    store.load(Arena::with_id("dunes".into())).await.unwrap();

    let folder = dir.path().join("arenas");
    assert!(folder.join("colosseum.yml").is_file());
    assert!(folder.join("dunes.yml").is_file());
    assert_eq!(repo.list_documents("arenas").await.unwrap(), vec!["colosseum", "dunes"]);
}

#[tokio::test]
async fn test_empty_file_is_an_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(YamlRepository::new(dir.path()));
    let store = store_on(repo.clone());
    std::fs::create_dir_all(dir.path().join("server")).unwrap();
    std::fs::write(dir.path().join("server").join("server.yml"), "").unwrap();

    // The file exists, so this is not a first access, and every field keeps its default
    let settings = store.load(ServerSettings::default()).await.unwrap();
    assert_eq!(settings.max_players, 20);
}

#[tokio::test]
async fn test_malformed_file_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(YamlRepository::new(dir.path()));
    let store = store_on(repo.clone());
    std::fs::create_dir_all(dir.path().join("server")).unwrap();
    std::fs::write(dir.path().join("server").join("server.yml"), "server: [1, 2\n").unwrap();

    let err = store.load(ServerSettings::default()).await.unwrap_err();
    assert_eq!(err.op(), Some(keepsake::store::OpKind::Load));
    assert_eq!(err.doc_id(), Some("server"));
}
