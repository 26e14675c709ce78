//! Index snapshots of remote metadata
//!
//! After every successful remote create or modify, the push engine records
//! what the remote object looked like. On the next push, a conflict whose
//! remote side still matches the snapshot is stale: nobody else touched
//! the remote object since we last wrote it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::file::RemoteFile;
use super::newtypes::FileId;

/// Last-synced snapshot of a remote object's metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub file_id: FileId,
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub checksum: Option<String>,
}

impl Index {
    /// Builds a snapshot from remote metadata; `None` without an identifier
    pub fn from_file(file: &RemoteFile) -> Option<Self> {
        let file_id = file.id.clone()?;
        Some(Self {
            file_id,
            name: file.name.clone(),
            is_dir: file.is_dir,
            size: file.size,
            modified: file.modified,
            checksum: file.checksum.clone(),
        })
    }

    /// Returns true if `file` is exactly what this snapshot recorded
    ///
    /// Compares checksum, size, modification time and kind. The name is
    /// not compared: a rename alone does not make content diverge.
    pub fn matches(&self, file: &RemoteFile) -> bool {
        if let Some(id) = &file.id {
            if *id != self.file_id {
                return false;
            }
        }
        self.is_dir == file.is_dir
            && self.size == file.size
            && self.modified == file.modified
            && self.checksum == file.checksum
    }
}
