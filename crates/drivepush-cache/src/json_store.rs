//! File-backed index store
//!
//! Layout: `<root>/.drivepush/indices/<file id>`, each file a JSON
//! [`Index`] document. Writes go to a temporary sibling first and are
//! renamed into place, so a reader never sees a half-written snapshot.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use drivepush_core::domain::{FileId, Index};
use drivepush_core::ports::IIndexStore;

use crate::CacheError;

/// Directory under the sync root holding drivepush bookkeeping
pub const INDEX_DIR: &str = ".drivepush";

const INDICES: &str = "indices";

/// Index store keeping one JSON file per remote identifier
#[derive(Debug, Clone)]
pub struct JsonIndexStore {
    dir: PathBuf,
}

impl JsonIndexStore {
    /// Creates a store rooted at the sync root `root`
    ///
    /// Nothing is created on disk until the first write.
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join(INDEX_DIR).join(INDICES),
        }
    }

    /// Absolute path of the snapshot for `id`
    pub fn entry_path(&self, id: &FileId) -> PathBuf {
        self.dir.join(id.as_str())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait::async_trait]
impl IIndexStore for JsonIndexStore {
    #[instrument(skip(self, index), fields(file_id = %index.file_id))]
    async fn serialize(&self, index: &Index) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let target = self.entry_path(&index.file_id);
        let data = serde_json::to_vec(index)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        let tmp_path = {
            let mut p = target.as_os_str().to_owned();
            p.push(".tmp");
            PathBuf::from(p)
        };

        tokio::fs::write(&tmp_path, &data)
            .await
            .map_err(|e| io_error(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &target)
            .await
            .map_err(|e| io_error(&target, e))?;

        debug!(path = %target.display(), "index entry written");
        Ok(())
    }

    async fn deserialize(&self, id: &FileId) -> anyhow::Result<Option<Index>> {
        let path = self.entry_path(id);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e).into()),
        };

        let index: Index = serde_json::from_slice(&data)
            .map_err(|e| CacheError::SerializationError(format!("{}: {e}", path.display())))?;
        Ok(Some(index))
    }

    #[instrument(skip(self), fields(file_id = %id))]
    async fn remove(&self, id: &FileId) -> anyhow::Result<()> {
        let path = self.entry_path(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("index entry removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CacheError::NotFound(id.to_string()).into())
            }
            Err(e) => Err(io_error(&path, e).into()),
        }
    }
}
