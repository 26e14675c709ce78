//! Index store port
//!
//! Persists [`Index`] snapshots keyed by remote identifier. Each entry is
//! independent, so concurrent writes to different identifiers need no
//! coordination.

use crate::domain::{FileId, Index};

#[async_trait::async_trait]
pub trait IIndexStore: Send + Sync {
    /// Creates or overwrites the snapshot for `index.file_id`
    async fn serialize(&self, index: &Index) -> anyhow::Result<()>;

    /// Loads the snapshot for `id`, `None` if there is none
    async fn deserialize(&self, id: &FileId) -> anyhow::Result<Option<Index>>;

    /// Removes the snapshot for `id`
    ///
    /// Removing a missing entry is an error, so callers can report stale
    /// bookkeeping.
    async fn remove(&self, id: &FileId) -> anyhow::Result<()>;
}
