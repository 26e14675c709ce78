//! In-memory index store

use std::collections::HashMap;
use std::sync::Mutex;

use drivepush_core::domain::{FileId, Index};
use drivepush_core::ports::IIndexStore;

use crate::CacheError;

/// Index store backed by a map; contents are lost with the process
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    entries: Mutex<HashMap<FileId, Index>>,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store
    pub fn with_entries(entries: impl IntoIterator<Item = Index>) -> Self {
        let map = entries
            .into_iter()
            .map(|index| (index.file_id.clone(), index))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn get(&self, id: &FileId) -> Option<Index> {
        self.lock().get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<FileId, Index>> {
        // Every write is a single insert/remove, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl IIndexStore for MemoryIndexStore {
    async fn serialize(&self, index: &Index) -> anyhow::Result<()> {
        self.lock().insert(index.file_id.clone(), index.clone());
        Ok(())
    }

    async fn deserialize(&self, id: &FileId) -> anyhow::Result<Option<Index>> {
        Ok(self.get(id))
    }

    async fn remove(&self, id: &FileId) -> anyhow::Result<()> {
        self.lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CacheError::NotFound(id.to_string()).into())
    }
}
