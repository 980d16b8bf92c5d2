use async_trait::async_trait;
use dashmap::DashMap;

use super::{Banners, DocumentLocation, Loaded, Repository, RepositoryError, StorageKind};
use crate::node::Map;

/// In-process store keyed by `(resolved path, doc_id)`.
///
/// Nothing outlives the value. Banners are accepted and dropped.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    documents: DashMap<(String, String), Map>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn key(&self, location: &DocumentLocation) -> (String, String) {
        (self.resolve_path(location), location.doc_id.clone())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    fn kind(&self) -> StorageKind {
        StorageKind::Memory
    }

    async fn load(&self, location: &DocumentLocation) -> Result<Loaded, RepositoryError> {
        Ok(match self.documents.get(&self.key(location)) {
            Some(root) => Loaded::found(root.clone()),
            None => Loaded::missing(),
        })
    }

    async fn save(&self, location: &DocumentLocation, root: &Map, _banners: &Banners) -> Result<(), RepositoryError> {
        self.documents.insert(self.key(location), root.clone());
        Ok(())
    }

    async fn delete(&self, location: &DocumentLocation) -> Result<bool, RepositoryError> {
        Ok(self.documents.remove(&self.key(location)).is_some())
    }

    async fn list_documents(&self, base_path: &str) -> Result<Vec<String>, RepositoryError> {
        let mut ids: Vec<String> = self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == base_path)
            .map(|entry| entry.key().1.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}
