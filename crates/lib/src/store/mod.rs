//! The operation surface: save, load, delete, bulk load, and caches.
//!
//! A [`ConfigStore`] ties together a [`Registry`], a [`Repository`], a
//! [`Clock`] and an [`Executor`]. Every I/O operation runs on the executor
//! and returns a [`TaskHandle`]; callbacks passed to the `*_then` variants
//! run on the worker once the operation succeeds.
//!
//! ## Load
//!
//! 1. Nothing stored: run [`Document::first_load`], save at the target
//!    version, done.
//! 2. Otherwise run the load hooks around a field read, then compare the
//!    stored version with the target and migrate. A migrated document is
//!    saved again at the version it reached.
//! 3. Validate. A failure is logged and broadcast, never raised.
//!
//! ## Save
//!
//! The document's fields replace the stored ones. The stored `__meta`
//! section is kept and its version set to the type's target.
//!
//! Every operation broadcasts a [`ConfigEvent`] to [`ConfigStore::subscribe`]rs.

mod cache;
mod errors;
mod events;
mod settings;

pub use cache::DocumentCache;
pub use errors::{OpKind, StoreError};
pub use events::{ConfigEvent, EventKind};
pub use settings::StoreSettings;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::codec::Codec;
use crate::document::{Document, DocumentSchema, KeyedDocument, StaticDocument};
use crate::executor::{Executor, TaskHandle};
use crate::node::{Map, Node};
use crate::repository::{DocumentLocation, Repository, RepositoryError};
use crate::schema::{CompositeShape, Hook, Registry};
use crate::validation::{ValidationReport, ValidationRunner};
use crate::version::{merge_stored_version, read_stored_version};

/// The host component a store works for.
///
/// Its name is attached to every event and operation log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    name: String,
}

impl HostContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

struct Inner {
    host: HostContext,
    registry: Arc<Registry>,
    repo: Arc<dyn Repository>,
    clock: Arc<dyn Clock>,
    executor: Executor,
    cache: DocumentCache,
    events: broadcast::Sender<ConfigEvent>,
}

/// Persists documents through one repository. Cheap to clone.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<Inner>,
}

impl ConfigStore {
    pub fn new(host: HostContext, registry: Arc<Registry>, repo: Arc<dyn Repository>, settings: StoreSettings) -> Self {
        Self::with_clock(host, registry, repo, settings, Arc::new(SystemClock))
    }

    /// Like [`ConfigStore::new`], reading "now" from `clock`.
    pub fn with_clock(
        host: HostContext,
        registry: Arc<Registry>,
        repo: Arc<dyn Repository>,
        settings: StoreSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(settings.event_capacity.max(1));
        info!(
            host = %host,
            storage = %repo.kind(),
            workers = settings.workers,
            queue_capacity = settings.queue_capacity,
            "config store started"
        );
        Self {
            inner: Arc::new(Inner {
                host,
                registry,
                repo,
                clock,
                executor: Executor::new(&settings),
                cache: DocumentCache::new(),
                events,
            }),
        }
    }

    pub fn host(&self) -> &HostContext {
        &self.inner.host
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.inner.repo
    }

    pub fn executor(&self) -> &Executor {
        &self.inner.executor
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.inner.cache
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.inner.events.subscribe()
    }

    pub fn save<D: Document>(&self, document: D) -> TaskHandle<D> {
        self.save_then(document, |_| {})
    }

    /// Save, then call `on_success` with the saved document.
    pub fn save_then<D: Document>(&self, document: D, on_success: impl FnOnce(&D) + Send + 'static) -> TaskHandle<D> {
        let inner = self.inner.clone();
        self.inner.executor.submit("save", async move {
            let document = inner.save_document(document).await?;
            on_success(&document);
            Ok(document)
        })
    }

    /// Load into `document`, whose identity selects what is read.
    pub fn load<D: Document>(&self, document: D) -> TaskHandle<D> {
        self.load_then(document, |_| {})
    }

    pub fn load_then<D: Document>(&self, document: D, on_success: impl FnOnce(&D) + Send + 'static) -> TaskHandle<D> {
        let inner = self.inner.clone();
        self.inner.executor.submit("load", async move {
            let document = inner.load_document(document).await?;
            on_success(&document);
            Ok(document)
        })
    }

    pub fn delete<D: Document>(&self, document: D) -> TaskHandle<D> {
        self.delete_then(document, |_| {})
    }

    pub fn delete_then<D: Document>(&self, document: D, on_success: impl FnOnce(&D) + Send + 'static) -> TaskHandle<D> {
        let inner = self.inner.clone();
        self.inner.executor.submit("delete", async move {
            inner.delete_document(&document).await?;
            on_success(&document);
            Ok(document)
        })
    }

    /// Load every stored document of a keyed type, by ID.
    ///
    /// Lists the base path `sample` resolves to, so every instance of the
    /// type must share it (see [`Document::storage_path`]).
    pub fn load_all<D: KeyedDocument>(&self, sample: &D) -> TaskHandle<HashMap<String, D>> {
        let inner = self.inner.clone();
        let base = self.inner.repo.resolve_path(&sample.location());
        self.inner
            .executor
            .submit("load_all", async move { inner.load_all_documents::<D>(&base).await })
    }

    /// The cached instance of a static type, loading it on a miss.
    pub fn get_static<D: StaticDocument>(&self) -> TaskHandle<D> {
        if let Some(cached) = self.inner.cache.get_static::<D>() {
            return TaskHandle::ready(cached);
        }
        let inner = self.inner.clone();
        self.inner.executor.submit("load", async move {
            let document = inner.load_document(D::default()).await?;
            inner.cache.put_static(document.clone());
            Ok(document)
        })
    }

    /// The cached instance with `doc_id`, loading it on a miss or when
    /// `override_existing` is set.
    pub fn get_keyed<D: KeyedDocument>(&self, doc_id: &str, override_existing: bool) -> TaskHandle<D> {
        if !override_existing && let Some(cached) = self.inner.cache.get_keyed::<D>(doc_id) {
            return TaskHandle::ready(cached);
        }
        let inner = self.inner.clone();
        let doc_id = doc_id.to_string();
        self.inner.executor.submit("load", async move {
            let document = inner.load_document(D::with_id(doc_id.clone())).await?;
            inner.cache.put_keyed(doc_id, document.clone());
            Ok(document)
        })
    }

    /// Every cached instance of a keyed type.
    pub fn cached_keyed<D: KeyedDocument>(&self) -> HashMap<String, D> {
        self.inner.cache.all_keyed::<D>()
    }

    /// Load every stored instance of a keyed type into the cache.
    ///
    /// Resolves to the number of documents cached.
    pub fn load_all_keyed_into_cache<D: KeyedDocument>(&self, sample: &D) -> TaskHandle<usize> {
        let inner = self.inner.clone();
        let base = self.inner.repo.resolve_path(&sample.location());
        self.inner.executor.submit("load_all", async move {
            let documents = inner.load_all_documents::<D>(&base).await?;
            let count = documents.len();
            for (doc_id, document) in documents {
                inner.cache.put_keyed(doc_id, document);
            }
            Ok(count)
        })
    }

    /// Human-readable rendering of the tree `document` would be saved as.
    ///
    /// Runs the save hooks, since it goes through the same write path.
    pub fn display<D: Document>(&self, document: &mut D) -> String {
        let doc_id = document.document_id();
        let section = self.inner.encode(document);
        format!(
            "----- {doc_id} -----\n{}\n----- end of {doc_id} -----",
            Node::Map(section).render(1)
        )
    }

    /// Drop every cached document and stop accepting worker tasks.
    ///
    /// Operations submitted afterwards still complete, on their callers.
    pub fn shutdown(&self) {
        self.inner.executor.close();
        self.inner.cache.clear();
        info!(host = %self.inner.host, "config store stopped");
    }
}

impl Inner {
    fn codec(&self) -> Codec<'_> {
        Codec::new(&self.registry, self.clock.as_ref()).with_storage(self.repo.kind())
    }

    fn emit(&self, doc_id: &str, kind: EventKind) {
        let event = ConfigEvent {
            host: self.host.name().to_string(),
            doc_id: doc_id.to_string(),
            kind,
        };
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Run the save hooks around a field write.
    fn encode<D: Document>(&self, document: &mut D) -> Map {
        let shape = CompositeShape::of::<D>();
        shape.run_hook(document, Hook::BeforeSave);
        let section = self.codec().write_object(&shape, document);
        shape.run_hook(document, Hook::AfterSave);
        section
    }

    /// Write `document` over `stored`, keeping the stored metadata.
    async fn persist<D: Document>(
        &self,
        document: &mut D,
        location: &DocumentLocation,
        stored: Option<&Map>,
        version: u32,
        schema: &DocumentSchema<D>,
    ) -> Result<(), RepositoryError> {
        let mut root = self.encode(document);
        merge_stored_version(&mut root, stored, version);
        self.repo.save(location, &root, schema.banners()).await
    }

    async fn save_document<D: Document>(&self, mut document: D) -> Result<D, StoreError> {
        let started = Instant::now();
        let location = document.location();
        let doc_id = location.doc_id.clone();
        let schema = D::schema();

        let existing = self
            .repo
            .load(&location)
            .await
            .map_err(StoreError::operation(OpKind::Save, &doc_id))?;
        if existing.first_access {
            document.first_load();
        }
        self.persist(
            &mut document,
            &location,
            existing.root.as_ref(),
            schema.target_version(),
            &schema,
        )
        .await
        .map_err(StoreError::operation(OpKind::Save, &doc_id))?;

        self.cache.refresh(&doc_id, &document);
        self.emit(&doc_id, EventKind::Saved);
        debug!(
            host = %self.host,
            doc_id = %doc_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "saved document"
        );
        Ok(document)
    }

    async fn load_document<D: Document>(&self, mut document: D) -> Result<D, StoreError> {
        let started = Instant::now();
        let location = document.location();
        let doc_id = location.doc_id.clone();
        let schema = D::schema();
        let target = schema.target_version();

        let loaded = self
            .repo
            .load(&location)
            .await
            .map_err(StoreError::operation(OpKind::Load, &doc_id))?;

        match loaded.root {
            Some(root) if !loaded.first_access => {
                self.read_stored(&mut document, &location, &root, &schema).await?;
            }
            _ => {
                document.first_load();
                self.persist(&mut document, &location, None, target, &schema)
                    .await
                    .map_err(StoreError::operation(OpKind::Load, &doc_id))?;
                info!(host = %self.host, doc_id = %doc_id, version = target, "created document on first access");
            }
        }

        if let ValidationReport::Failed(message) = ValidationRunner::run(schema.validator_ref(), &document, &doc_id) {
            self.emit(&doc_id, EventKind::ValidationFailed { message });
        }
        self.emit(&doc_id, EventKind::Loaded);
        debug!(
            host = %self.host,
            doc_id = %doc_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded document"
        );
        Ok(document)
    }

    /// Read a stored root into `document`, migrating it when stale.
    async fn read_stored<D: Document>(
        &self,
        document: &mut D,
        location: &DocumentLocation,
        root: &Map,
        schema: &DocumentSchema<D>,
    ) -> Result<(), StoreError> {
        let doc_id = &location.doc_id;
        let shape = CompositeShape::of::<D>();
        shape.run_hook(document, Hook::BeforeLoad);
        self.codec().read_object(&shape, root, document);

        let stored = read_stored_version(root);
        let outcome = schema.migrations().run(document, stored, schema.target_version());
        if outcome.migrated() {
            self.persist(document, location, Some(root), outcome.reached, schema)
                .await
                .map_err(StoreError::operation(OpKind::Load, doc_id.as_str()))?;
            info!(
                host = %self.host,
                doc_id = %doc_id,
                from = outcome.from,
                to = outcome.reached,
                "migrated document"
            );
            self.emit(
                doc_id,
                EventKind::Migrated {
                    from: outcome.from,
                    to: outcome.reached,
                },
            );
        }

        shape.run_hook(document, Hook::AfterLoad);
        Ok(())
    }

    async fn delete_document<D: Document>(&self, document: &D) -> Result<bool, StoreError> {
        let started = Instant::now();
        let location = document.location();
        let doc_id = location.doc_id.clone();

        let removed = self
            .repo
            .delete(&location)
            .await
            .map_err(StoreError::operation(OpKind::Delete, &doc_id))?;
        self.cache.evict::<D>(&doc_id);
        self.emit(&doc_id, EventKind::Deleted);
        debug!(
            host = %self.host,
            doc_id = %doc_id,
            removed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "deleted document"
        );
        Ok(removed)
    }

    async fn load_all_documents<D: KeyedDocument>(&self, base: &str) -> Result<HashMap<String, D>, StoreError> {
        let started = Instant::now();
        let ids = self
            .repo
            .list_documents(base)
            .await
            .map_err(StoreError::operation(OpKind::LoadAll, base))?;

        let mut documents = HashMap::with_capacity(ids.len());
        for doc_id in ids {
            let document = self.load_document(D::with_id(doc_id.clone())).await?;
            documents.insert(doc_id, document);
        }
        debug!(
            host = %self.host,
            base,
            count = documents.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded all documents"
        );
        Ok(documents)
    }
}
