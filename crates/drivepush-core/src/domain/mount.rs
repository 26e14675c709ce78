//! Mount points: external paths attached under the sync root for one push

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An external local path temporarily attached under the sync root
///
/// `name` is the remote path the attachment appears at; `mount_path` is
/// where the content actually lives on disk. Attachments are ephemeral
/// and must be detached when the push ends, however it ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountPoint {
    pub name: String,
    pub mount_path: PathBuf,
}

impl MountPoint {
    pub fn new(name: impl Into<String>, mount_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            mount_path: mount_path.into(),
        }
    }
}
