//! In-memory vault store.
//!
//! Keeps each item as the JSON document a hosted store would hold, so the
//! persisted shape is exercised on every write and read.

use parking_lot::RwLock;
use std::collections::HashMap;

use super::VaultStore;
use crate::error::{Error, Result};
use crate::vault::VaultItem;

/// Map-backed [`VaultStore`]
#[derive(Debug, Default)]
pub struct MemoryVaultStore {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryVaultStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Raw stored document, as a hosted store would return it
    pub fn raw_document(&self, id: &str) -> Option<String> {
        self.documents.read().get(id).cloned()
    }

    fn decode(id: &str, document: &str) -> Result<VaultItem> {
        serde_json::from_str(document)
            .map_err(|e| Error::StorageReadError(format!("document {}: {}", id, e)))
    }
}

impl VaultStore for MemoryVaultStore {
    fn put_item(&self, item: &VaultItem) -> Result<()> {
        let document = serde_json::to_string(item)
            .map_err(|e| Error::StorageWriteError(e.to_string()))?;
        self.documents.write().insert(item.id.clone(), document);
        Ok(())
    }

    fn get_item(&self, id: &str) -> Result<Option<VaultItem>> {
        let documents = self.documents.read();
        documents
            .get(id)
            .map(|document| Self::decode(id, document))
            .transpose()
    }

    fn delete_item(&self, id: &str) -> Result<bool> {
        Ok(self.documents.write().remove(id).is_some())
    }

    fn list_items(&self, hub_id: &str) -> Result<Vec<VaultItem>> {
        let documents = self.documents.read();
        let mut items = documents
            .iter()
            .map(|(id, document)| Self::decode(id, document))
            .collect::<Result<Vec<_>>>()?;
        drop(documents);

        items.retain(|item| item.hub_id == hub_id);
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }
}

// ============================================================================
// TESTS
// ============================================================================
