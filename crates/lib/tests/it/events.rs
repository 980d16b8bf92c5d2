//! Broadcast notifications.

use keepsake::{ConfigEvent, EventKind, KeyedDocument};
use tokio::sync::broadcast::error::TryRecvError;

use crate::helpers::*;

#[tokio::test]
async fn test_operations_broadcast_in_order() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    let mut events = store.subscribe();

    store.load(Arena::with_id("forge".into())).await.unwrap();
    store.save(arena("forge", 3)).await.unwrap();
    store.delete(arena("forge", 3)).await.unwrap();

    let kinds: Vec<EventKind> = [
        events.recv().await.unwrap(),
        events.recv().await.unwrap(),
        events.recv().await.unwrap(),
    ]
    .into_iter()
    .map(|e| e.kind)
    .collect();
    assert_eq!(kinds, vec![EventKind::Loaded, EventKind::Saved, EventKind::Deleted]);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_events_carry_host_and_document() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    let mut events = store.subscribe();

    store.save(sample_settings()).await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(
        event,
        ConfigEvent {
            host: "test-host".into(),
            doc_id: "server".into(),
            kind: EventKind::Saved,
        }
    );
    assert_eq!(event.to_string(), "[test-host] server: saved");
}

#[tokio::test]
async fn test_no_subscribers_is_fine() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    store.save(arena("quiet", 1)).await.unwrap();
    let mut late = store.subscribe();
    assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));
}
