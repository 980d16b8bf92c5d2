use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use keepsake::repository::{
    Banners, DocumentLocation, Loaded, MemoryRepository, Repository, RepositoryError, StorageKind,
    YamlRepository,
};
use keepsake::saveable::{SaveableList, SaveableMap};
use keepsake::schema::{Composite, Enumeration, FieldDescriptor};
use keepsake::{
    ConfigStore, Document, DocumentSchema, FixedClock, HostContext, KeyedDocument, Map, Registry, StaticDocument,
    StoreSettings,
};
use tempfile::TempDir;
use tokio::sync::Semaphore;

// ==========================
// FIXTURE DOCUMENTS
// ==========================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Peaceful,
    Easy,
    Normal,
    Hard,
}

impl Enumeration for Difficulty {
    fn variants() -> &'static [Self] {
        &[Difficulty::Peaceful, Difficulty::Easy, Difficulty::Normal, Difficulty::Hard]
    }

    fn name(&self) -> &'static str {
        match self {
            Difficulty::Peaceful => "PEACEFUL",
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spawn {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Composite for Spawn {
    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::required("x", |s: &Spawn| &s.x, |s| &mut s.x),
            FieldDescriptor::required("y", |s: &Spawn| &s.y, |s| &mut s.y),
            FieldDescriptor::required("z", |s: &Spawn| &s.z, |s| &mut s.z),
        ]
    }
}

/// Static document covering scalars, enums, nesting, temporal values and containers.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub motd: String,
    pub max_players: u32,
    pub view_distance: f64,
    pub difficulty: Difficulty,
    pub spawn: Spawn,
    pub opened: Option<NaiveDateTime>,
    pub rules: SaveableList<String>,
    pub mob_caps: SaveableMap<Difficulty, i64>,
    pub admin_password: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            motd: "A keepsake server".into(),
            max_players: 20,
            view_distance: 10.5,
            difficulty: Difficulty::Normal,
            spawn: Spawn::default(),
            opened: None,
            rules: SaveableList::new(),
            mob_caps: SaveableMap::new(),
            admin_password: String::new(),
        }
    }
}

impl Composite for ServerSettings {
    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::required("motd", |s: &ServerSettings| &s.motd, |s| &mut s.motd),
            FieldDescriptor::required("max_players", |s: &ServerSettings| &s.max_players, |s| &mut s.max_players)
                .rename("max-players"),
            FieldDescriptor::required("view_distance", |s: &ServerSettings| &s.view_distance, |s| {
                &mut s.view_distance
            }),
            FieldDescriptor::required("difficulty", |s: &ServerSettings| &s.difficulty, |s| &mut s.difficulty),
            FieldDescriptor::required("spawn", |s: &ServerSettings| &s.spawn, |s| &mut s.spawn),
            FieldDescriptor::optional("opened", |s: &ServerSettings| &s.opened, |s| &mut s.opened),
            FieldDescriptor::required("rules", |s: &ServerSettings| &s.rules, |s| &mut s.rules),
            FieldDescriptor::required("mob_caps", |s: &ServerSettings| &s.mob_caps, |s| &mut s.mob_caps),
            FieldDescriptor::required("admin_password", |s: &ServerSettings| &s.admin_password, |s| {
                &mut s.admin_password
            })
            .skip(),
        ]
    }
}

impl Document for ServerSettings {
    fn document_id(&self) -> String {
        "server".into()
    }

    fn schema() -> DocumentSchema<Self> {
        DocumentSchema::new()
            .header(["Server settings", "Edit while the server is stopped"])
            .footer(["end of server settings"])
    }
}

impl StaticDocument for ServerSettings {}

pub fn sample_settings() -> ServerSettings {
    let mut settings = ServerSettings {
        motd: "Welcome to the arena".into(),
        max_players: 64,
        view_distance: 12.25,
        difficulty: Difficulty::Hard,
        spawn: Spawn { x: 100, y: 64, z: -250 },
        opened: NaiveDateTime::parse_from_str("2024-05-17 09:15:00", "%Y-%m-%d %H:%M:%S").ok(),
        admin_password: "hunter2".into(),
        ..Default::default()
    };
    settings.rules.push("no griefing".into());
    settings.rules.push("be kind".into());
    settings.mob_caps.insert(Difficulty::Hard, 70);
    settings.mob_caps.insert(Difficulty::Easy, 20);
    settings
}

/// Keyed document; every arena shares the `arenas` folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arena {
    pub id: String,
    pub display_name: String,
    pub capacity: u32,
}

impl Composite for Arena {
    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::required("display_name", |a: &Arena| &a.display_name, |a| &mut a.display_name),
            FieldDescriptor::required("capacity", |a: &Arena| &a.capacity, |a| &mut a.capacity),
        ]
    }
}

impl Document for Arena {
    fn document_id(&self) -> String {
        self.id.clone()
    }

    fn storage_path(&self) -> Option<String> {
        Some("arenas".into())
    }

    /// Fills whatever the caller left blank.
    fn first_load(&mut self) {
        if self.display_name.is_empty() {
            self.display_name = format!("Arena {}", self.id);
        }
        if self.capacity == 0 {
            self.capacity = 8;
        }
    }
}

impl KeyedDocument for Arena {
    fn with_id(id: String) -> Self {
        Self { id, ..Default::default() }
    }
}

pub fn arena(id: &str, capacity: u32) -> Arena {
    Arena {
        id: id.into(),
        display_name: format!("The {id}"),
        capacity,
    }
}

// ==========================
// STORE FACTORIES
// ==========================

pub fn registry() -> Arc<Registry> {
    let mut registry = Registry::new();
    registry
        .register_enum::<Difficulty>()
        .register_composite::<Spawn>()
        .register_container::<SaveableList<String>>()
        .register_container::<SaveableMap<Difficulty, i64>>();
    Arc::new(registry)
}

pub fn store_on(repo: Arc<dyn Repository>) -> ConfigStore {
    store_with_settings(repo, StoreSettings::default())
}

pub fn store_with_settings(repo: Arc<dyn Repository>, settings: StoreSettings) -> ConfigStore {
    ConfigStore::with_clock(
        HostContext::new("test-host"),
        registry(),
        repo,
        settings,
        Arc::new(FixedClock::default()),
    )
}

/// A repository plus whatever keeps its storage alive.
pub struct TestRepository {
    pub repo: Arc<dyn Repository>,
    _dir: Option<TempDir>,
}

impl TestRepository {
    pub fn memory() -> Self {
        Self {
            repo: Arc::new(MemoryRepository::new()),
            _dir: None,
        }
    }

    pub fn yaml() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        Self {
            repo: Arc::new(YamlRepository::new(dir.path())),
            _dir: Some(dir),
        }
    }

    #[cfg(feature = "sqlite")]
    pub async fn sqlite() -> Self {
        let repo = keepsake::repository::SqlDocumentRepository::sqlite_in_memory()
            .await
            .expect("Failed to create SQLite repository");
        Self {
            repo: Arc::new(repo),
            _dir: None,
        }
    }

    /// Every repository this build supports.
    pub async fn all() -> Vec<Self> {
        #[allow(unused_mut)]
        let mut repos = vec![Self::memory(), Self::yaml()];
        #[cfg(feature = "sqlite")]
        repos.push(Self::sqlite().await);
        repos
    }
}

/// Creates a test repository based on the TEST_BACKEND env var.
///
/// Supported values:
/// - "memory" or unset: in-process repository (default)
/// - "yaml": file repository in a temp dir
/// - "sqlite": SQLite in-memory document repository (requires `sqlite` feature)
///
/// # Panics
/// Panics if TEST_BACKEND=sqlite but the `sqlite` feature is not enabled.
pub async fn test_repository() -> TestRepository {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("yaml") => TestRepository::yaml(),
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                TestRepository::sqlite().await
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled");
            }
        }
        _ => TestRepository::memory(),
    }
}

/// Write a raw root straight to the repository, bypassing the store.
pub async fn seed(repo: &dyn Repository, doc_id: &str, root: Map) {
    repo.save(&DocumentLocation::new(doc_id), &root, &Banners::default())
        .await
        .expect("Failed to seed document");
}

/// Memory repository whose saves wait until [`GatedRepository::open`].
pub struct GatedRepository {
    inner: MemoryRepository,
    gate: Semaphore,
}

impl GatedRepository {
    pub fn new() -> Self {
        Self {
            inner: MemoryRepository::new(),
            gate: Semaphore::new(0),
        }
    }

    pub fn open(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

#[async_trait]
impl Repository for GatedRepository {
    fn kind(&self) -> StorageKind {
        StorageKind::Memory
    }

    async fn load(&self, location: &DocumentLocation) -> Result<Loaded, RepositoryError> {
        self.inner.load(location).await
    }

    async fn save(&self, location: &DocumentLocation, root: &Map, banners: &Banners) -> Result<(), RepositoryError> {
        // Each save takes one permit for good
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.inner.save(location, root, banners).await
    }

    async fn delete(&self, location: &DocumentLocation) -> Result<bool, RepositoryError> {
        self.inner.delete(location).await
    }

    async fn list_documents(&self, base_path: &str) -> Result<Vec<String>, RepositoryError> {
        self.inner.list_documents(base_path).await
    }
}
