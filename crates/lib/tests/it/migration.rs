//! Schema versions: migrator chains, partial chains, and the `__meta` section.

use keepsake::constants::{META_ROOT, META_VERSION_PATH};
use keepsake::schema::{Composite, FieldDescriptor};
use keepsake::{Document, DocumentSchema, EventKind, Map, Node, StaticDocument};

use crate::helpers::*;

#[derive(Debug, Clone, Default, PartialEq)]
struct Economy {
    start_balance: i64,
    currency: String,
    tax_rate: f64,
}

impl Composite for Economy {
    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::required("start_balance", |e: &Economy| &e.start_balance, |e| &mut e.start_balance),
            FieldDescriptor::required("currency", |e: &Economy| &e.currency, |e| &mut e.currency),
            FieldDescriptor::required("tax_rate", |e: &Economy| &e.tax_rate, |e| &mut e.tax_rate),
        ]
    }
}

impl Document for Economy {
    fn document_id(&self) -> String {
        "economy".into()
    }

    fn schema() -> DocumentSchema<Self> {
        DocumentSchema::new()
            .version(3)
            // v2 stores balances in cents
            .migrator(1, 2, |e: &mut Economy| e.start_balance *= 100)
            .migrator(2, 3, |e: &mut Economy| {
                if e.currency.is_empty() {
                    e.currency = "coins".into();
                }
            })
            .validator(|e: &Economy| {
                (!(0.0..=1.0).contains(&e.tax_rate)).then(|| format!("tax_rate {} is out of range", e.tax_rate))
            })
    }
}

impl StaticDocument for Economy {}

/// Targets v3 but only knows how to reach v2.
#[derive(Debug, Clone, Default, PartialEq)]
struct Ledger {
    entries: i64,
}

impl Composite for Ledger {
    fn fields() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::required("entries", |l: &Ledger| &l.entries, |l| &mut l.entries)]
    }
}

impl Document for Ledger {
    fn document_id(&self) -> String {
        "ledger".into()
    }

    fn schema() -> DocumentSchema<Self> {
        DocumentSchema::new()
            .version(3)
            .migrator(1, 2, |l: &mut Ledger| l.entries += 1)
    }
}

fn economy_v1() -> Map {
    let mut root = Map::new();
    root.insert("start_balance", 50);
    root.insert("tax_rate", 0.1);
    root
}

async fn stored_root(backend: &TestRepository, doc: &impl Document) -> Map {
    backend
        .repo
        .load(&doc.location())
        .await
        .unwrap()
        .root
        .unwrap()
}

#[tokio::test]
async fn test_chain_runs_in_order_and_resaves() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    seed(backend.repo.as_ref(), "economy", economy_v1()).await;

    let economy = store.load(Economy::default()).await.unwrap();
    assert_eq!(economy.start_balance, 5000);
    assert_eq!(economy.currency, "coins");

    let root = stored_root(&backend, &economy).await;
    assert_eq!(root.get_path(META_VERSION_PATH), Some(&Node::Int(3)));
    assert_eq!(root.get("start_balance"), Some(&Node::Int(5000)));

    // Already current: a second load must not multiply again
    let again = store.load(Economy::default()).await.unwrap();
    assert_eq!(again.start_balance, 5000);
}

#[tokio::test]
async fn test_migration_starts_at_stored_version() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    let mut root = economy_v1();
    root.set_path(META_VERSION_PATH, Node::Int(2));
    seed(backend.repo.as_ref(), "economy", root).await;

    let economy = store.load(Economy::default()).await.unwrap();
    assert_eq!(economy.start_balance, 50);
    assert_eq!(economy.currency, "coins");
}

#[tokio::test]
async fn test_broken_chain_stops_at_last_reached_version() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    let mut root = Map::new();
    root.insert("entries", 9);
    seed(backend.repo.as_ref(), "ledger", root).await;

    let mut events = store.subscribe();
    let ledger = store.load(Ledger::default()).await.unwrap();
    assert_eq!(ledger.entries, 10);
    assert_eq!(events.recv().await.unwrap().kind, EventKind::Migrated { from: 1, to: 2 });

    let stored = stored_root(&backend, &ledger).await;
    assert_eq!(stored.get_path(META_VERSION_PATH), Some(&Node::Int(2)));

    // Stuck at v2 with no 2 -> 3 migrator: nothing more happens
    let again = store.load(Ledger::default()).await.unwrap();
    assert_eq!(again.entries, 10);
}

#[tokio::test]
async fn test_fresh_document_written_at_target() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());

    let economy = store.load(Economy::default()).await.unwrap();
    // No migrator ran on a document that never existed
    assert_eq!(economy.start_balance, 0);
    assert_eq!(economy.currency, "");

    let root = stored_root(&backend, &economy).await;
    assert_eq!(root.get_path(META_VERSION_PATH), Some(&Node::Int(3)));
}

#[tokio::test]
async fn test_metadata_kept_apart_from_fields() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    let mut meta = Map::new();
    meta.insert("version", 3);
    meta.insert("owner", "ops-team");
    let mut root = economy_v1();
    root.insert(META_ROOT, meta);
    seed(backend.repo.as_ref(), "economy", root).await;

    let mut economy = store.load(Economy::default()).await.unwrap();
    economy.tax_rate = 0.2;
    store.save(economy.clone()).await.unwrap();

    let stored = stored_root(&backend, &economy).await;
    assert_eq!(stored.get_path("__meta.owner"), Some(&Node::from("ops-team")));
    assert_eq!(stored.get_path(META_VERSION_PATH), Some(&Node::Int(3)));
    assert_eq!(stored.get("tax_rate"), Some(&Node::Float(0.2)));
    // The user tree never learns about the reserved section
    let text = store.display(&mut economy);
    assert!(!text.contains(META_ROOT));
}

#[tokio::test]
async fn test_invalid_version_treated_as_base() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    let mut root = economy_v1();
    root.set_path(META_VERSION_PATH, Node::from("not a number"));
    seed(backend.repo.as_ref(), "economy", root).await;

    let economy = store.load(Economy::default()).await.unwrap();
    assert_eq!(economy.start_balance, 5000);
}

#[tokio::test]
async fn test_validation_failure_is_reported_not_raised() {
    let backend = test_repository().await;
    let store = store_on(backend.repo.clone());
    let mut root = economy_v1();
    root.insert("tax_rate", 5.0);
    root.set_path(META_VERSION_PATH, Node::Int(3));
    seed(backend.repo.as_ref(), "economy", root).await;

    let mut events = store.subscribe();
    let economy = store.load(Economy::default()).await.unwrap();
    assert_eq!(economy.tax_rate, 5.0);

    match events.recv().await.unwrap().kind {
        EventKind::ValidationFailed { message } => assert!(message.contains("tax_rate 5")),
        other => panic!("expected a validation failure, got {other:?}"),
    }
    assert_eq!(events.recv().await.unwrap().kind, EventKind::Loaded);
}
