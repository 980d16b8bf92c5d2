use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::document::Document;

type Cached = Arc<dyn Any + Send + Sync>;

/// Loaded documents, one per static type and any number per keyed type.
///
/// Safe to use from any worker. There is no per-key locking: two loads of
/// the same key may race, and whichever stores last wins.
#[derive(Default)]
pub struct DocumentCache {
    statics: DashMap<TypeId, Cached>,
    keyed: DashMap<(TypeId, String), Cached>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_static<D: Document>(&self) -> Option<D> {
        self.statics
            .get(&TypeId::of::<D>())
            .and_then(|entry| entry.downcast_ref::<D>().cloned())
    }

    pub fn put_static<D: Document>(&self, document: D) {
        self.statics.insert(TypeId::of::<D>(), Arc::new(document));
    }

    pub fn get_keyed<D: Document>(&self, doc_id: &str) -> Option<D> {
        self.keyed
            .get(&(TypeId::of::<D>(), doc_id.to_string()))
            .and_then(|entry| entry.downcast_ref::<D>().cloned())
    }

    pub fn put_keyed<D: Document>(&self, doc_id: String, document: D) {
        self.keyed.insert((TypeId::of::<D>(), doc_id), Arc::new(document));
    }

    pub fn all_keyed<D: Document>(&self) -> HashMap<String, D> {
        let ty = TypeId::of::<D>();
        self.keyed
            .iter()
            .filter(|entry| entry.key().0 == ty)
            .filter_map(|entry| {
                let document = entry.value().downcast_ref::<D>()?.clone();
                Some((entry.key().1.clone(), document))
            })
            .collect()
    }

    /// Replace whichever entry already holds this document, if any.
    pub fn refresh<D: Document>(&self, doc_id: &str, document: &D) {
        let ty = TypeId::of::<D>();
        if self.statics.contains_key(&ty) {
            self.statics.insert(ty, Arc::new(document.clone()));
        }
        let key = (ty, doc_id.to_string());
        if self.keyed.contains_key(&key) {
            self.keyed.insert(key, Arc::new(document.clone()));
        }
    }

    pub fn evict<D: Document>(&self, doc_id: &str) {
        let ty = TypeId::of::<D>();
        self.statics.remove(&ty);
        self.keyed.remove(&(ty, doc_id.to_string()));
    }

    pub fn clear(&self) {
        self.statics.clear();
        self.keyed.clear();
    }

    pub fn len(&self) -> usize {
        self.statics.len() + self.keyed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
