//! File and directory metadata
//!
//! A [`RemoteFile`] describes either side of a change: the desired local
//! state or the current remote state. Local instances never carry an
//! identifier; remote ones get theirs on the first successful upsert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::index::Index;
use super::newtypes::FileId;
use super::path;

/// Metadata of a file or directory on either side of the sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Remote identifier (None until the object exists remotely)
    pub id: Option<FileId>,
    /// Last path segment
    pub name: String,
    /// Path relative to the sync root, in canonical form
    pub path: String,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Content size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
    /// Content checksum (None for directories)
    pub checksum: Option<String>,
}

impl RemoteFile {
    /// Creates metadata for a regular file
    pub fn file(
        path: &str,
        size: u64,
        modified: DateTime<Utc>,
        checksum: Option<String>,
    ) -> Self {
        let path = path::normalize(path);
        Self {
            id: None,
            name: name_of(&path),
            path,
            is_dir: false,
            size,
            modified,
            checksum,
        }
    }

    /// Creates metadata for a directory that should exist at `path`
    pub fn directory(path: &str) -> Self {
        let path = path::normalize(path);
        Self {
            id: None,
            name: name_of(&path),
            path,
            is_dir: true,
            size: 0,
            modified: Utc::now(),
            checksum: None,
        }
    }

    pub fn with_id(mut self, id: FileId) -> Self {
        self.id = Some(id);
        self
    }

    /// Snapshot of this file for the local index
    ///
    /// Returns `None` when the file has no remote identifier yet.
    pub fn to_index(&self) -> Option<Index> {
        Index::from_file(self)
    }
}

fn name_of(path: &str) -> String {
    path::split(path).map(|(_, name)| name).unwrap_or_default()
}
