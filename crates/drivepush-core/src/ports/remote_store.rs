//! Remote store port (driven/secondary port)
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at this boundary are specific to
//!   the remote API client.
//! - "Not found" is not an error: `find_by_path` returns `Ok(None)`.
//! - Implementations own retries and rate limiting; the push engine treats
//!   every returned error as final for that call.

use std::path::PathBuf;

use crate::domain::{FieldMask, FileId, Quota, RemoteFile};

/// Arguments of a create-or-update call
#[derive(Debug, Clone)]
pub struct UpsertRequest {
    /// Identifier of the remote parent directory
    pub parent_id: FileId,
    /// Absolute local path of the content (None for directory creation)
    pub local_abs_path: Option<PathBuf>,
    /// Desired state
    pub src: RemoteFile,
    /// Current remote state, if the object already exists
    pub dest: Option<RemoteFile>,
    /// Fields that may be compared and updated
    pub mask: FieldMask,
    /// Skip content checksum comparison
    pub ignore_checksum: bool,
}

/// Port trait for the remote file-hosting service
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Looks up a file or directory by its path under the sync root
    ///
    /// `/` resolves to the root directory.
    async fn find_by_path(&self, path: &str) -> anyhow::Result<Option<RemoteFile>>;

    /// Creates or updates a remote object by comparing `src` against `dest`
    ///
    /// # Returns
    /// The resulting remote metadata, or `None` when there was no
    /// effective difference and nothing was written.
    async fn upsert_by_comparison(
        &self,
        request: &UpsertRequest,
    ) -> anyhow::Result<Option<RemoteFile>>;

    /// Moves a remote object to the trash
    async fn trash(&self, id: &FileId) -> anyhow::Result<()>;

    /// Restores a trashed remote object
    async fn untrash(&self, id: &FileId) -> anyhow::Result<()>;

    /// Current storage usage and limit of the account
    async fn quota(&self) -> anyhow::Result<Quota>;
}
