//! Changes: single units of divergence between local and remote state

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::file::RemoteFile;
use super::path;

/// What has to happen remotely for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Exists locally, not remotely
    Add,
    /// Differs on one side only
    Mod,
    /// Differs on both sides in incompatible ways
    ModConflict,
    /// Exists remotely, not locally
    Delete,
}

impl Operation {
    /// Single-character marker used when listing changes
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Mod => "M",
            Operation::ModConflict => "X",
            Operation::Delete => "-",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Add => "Add",
            Operation::Mod => "Mod",
            Operation::ModConflict => "ModConflict",
            Operation::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// One detected divergence, with the desired (`src`) and current (`dest`) sides
///
/// Invariants, enforced by every constructor:
/// - `Add` and `Mod` carry a source
/// - `ModConflict` carries both sides
/// - `Delete` carries a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    path: String,
    op: Operation,
    src: Option<RemoteFile>,
    dest: Option<RemoteFile>,
}

impl Change {
    /// Creates a change after checking the operation against the sides present
    ///
    /// # Errors
    /// Returns `DomainError::InvalidChange` if a required side is missing
    pub fn new(
        path: &str,
        op: Operation,
        src: Option<RemoteFile>,
        dest: Option<RemoteFile>,
    ) -> Result<Self, DomainError> {
        let path = path::normalize(path);
        let missing = match op {
            Operation::Add | Operation::Mod if src.is_none() => Some("source"),
            Operation::ModConflict if src.is_none() => Some("source"),
            Operation::ModConflict | Operation::Delete if dest.is_none() => Some("destination"),
            _ => None,
        };
        if let Some(side) = missing {
            return Err(DomainError::InvalidChange {
                path,
                reason: format!("{op} without {side}"),
            });
        }
        Ok(Self { path, op, src, dest })
    }

    pub fn added(path: &str, src: RemoteFile) -> Self {
        Self {
            path: path::normalize(path),
            op: Operation::Add,
            src: Some(src),
            dest: None,
        }
    }

    pub fn modified(path: &str, src: RemoteFile, dest: Option<RemoteFile>) -> Self {
        Self {
            path: path::normalize(path),
            op: Operation::Mod,
            src: Some(src),
            dest,
        }
    }

    pub fn conflicting(path: &str, src: RemoteFile, dest: RemoteFile) -> Self {
        Self {
            path: path::normalize(path),
            op: Operation::ModConflict,
            src: Some(src),
            dest: Some(dest),
        }
    }

    pub fn deleted(path: &str, dest: RemoteFile) -> Self {
        Self {
            path: path::normalize(path),
            op: Operation::Delete,
            src: None,
            dest: Some(dest),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn op(&self) -> Operation {
        self.op
    }

    pub fn src(&self) -> Option<&RemoteFile> {
        self.src.as_ref()
    }

    pub fn dest(&self) -> Option<&RemoteFile> {
        self.dest.as_ref()
    }

    /// Re-labels a conflict as a plain modification
    ///
    /// Used when the conflict turns out to be stale. Other operations are
    /// returned untouched.
    pub fn into_resolved(mut self) -> Self {
        if self.op == Operation::ModConflict {
            self.op = Operation::Mod;
        }
        self
    }

    /// Makes the source reuse the destination's remote identifier
    ///
    /// Overwriting a remote object with local content updates it in place
    /// instead of creating a second object at the same path. No-op when
    /// there is no destination or it has no identifier.
    pub fn adopt_remote_identity(&mut self) {
        let remote_id = self.dest.as_ref().and_then(|d| d.id.clone());
        if let (Some(src), Some(id)) = (self.src.as_mut(), remote_id) {
            src.id = Some(id);
        }
    }

    /// Bytes this change would add to remote storage
    ///
    /// Only file sources of additions and modifications count; directories
    /// and deletions contribute nothing.
    pub fn projected_bytes(&self) -> u64 {
        match (self.op, &self.src) {
            (Operation::Delete, _) => 0,
            (_, Some(src)) if !src.is_dir => src.size,
            _ => 0,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.symbol(), self.path)
    }
}
