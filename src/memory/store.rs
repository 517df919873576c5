// SPDX-License-Identifier: MIT

//! Namespaced key/value memory with embedded vectors

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::Embedder;
use crate::error::ScholarError;

/// One stored memory: the original text plus its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub text: String,
    pub vector: Vec<f32>,
}

/// Long-term memory keyed by (namespace, key)
///
/// Constructed explicitly and injected where needed; callers sharing one
/// store across runs get interior synchronization, nothing more.
pub struct MemoryStore {
    embedder: Arc<dyn Embedder>,
    records: RwLock<HashMap<(String, String), MemoryRecord>>,
}

impl MemoryStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Store text under (namespace, key), embedding it on write
    pub async fn save(
        &self,
        namespace: &str,
        key: &str,
        text: &str,
    ) -> Result<(), ScholarError> {
        let vector = self.embedder.embed(text).await?;
        let mut records = self.records.write().await;
        records.insert(
            (namespace.to_string(), key.to_string()),
            MemoryRecord {
                text: text.to_string(),
                vector,
            },
        );
        Ok(())
    }

    /// Re-embed and replace an existing entry (alias of `save`)
    pub async fn update(
        &self,
        namespace: &str,
        key: &str,
        text: &str,
    ) -> Result<(), ScholarError> {
        self.save(namespace, key, text).await
    }

    pub async fn get(&self, namespace: &str, key: &str) -> Option<MemoryRecord> {
        let records = self.records.read().await;
        records
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn delete(&self, namespace: &str, key: &str) {
        let mut records = self.records.write().await;
        records.remove(&(namespace.to_string(), key.to_string()));
    }

    /// All keys under a namespace, sorted
    pub async fn list_keys(&self, namespace: &str) -> Vec<String> {
        let records = self.records.read().await;
        let mut keys: Vec<String> = records
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}
