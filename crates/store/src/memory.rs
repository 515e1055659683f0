use std::{
    collections::HashMap,
    sync::RwLock,
};

use {async_trait::async_trait, serde_json::Value};

use crate::{Error, Result, store::DocumentStore};

/// In-memory document store. Backs tests and single-process deployments;
/// per-document operations take the collection lock briefly and never hold
/// it across `.await` points.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<()> {
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value> {
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| Error::not_found(collection, id))?;

        match (doc.as_object_mut(), patch) {
            (Some(existing), Value::Object(fields)) => {
                for (key, value) in fields {
                    existing.insert(key, value);
                }
            },
            (_, patch) => *doc = patch,
        }
        Ok(doc.clone())
    }
}
