//! Automatic conflict resolution
//!
//! Uses the index as a tie-breaker: a conflict whose remote side still
//! matches the cached snapshot is re-labelled as a plain modification.
//! Everything else is handed back for interactive confirmation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use drivepush_core::domain::Change;
use drivepush_core::ports::IIndexStore;

use crate::detector::{is_stale, remote_side};

/// Outcome of automatic resolution
#[derive(Debug, Clone, Default)]
pub struct ConflictResolution {
    /// Stale conflicts, now labelled `Mod`
    pub resolved: Vec<Change>,
    /// Real conflicts that need the user's decision
    pub unresolved: Vec<Change>,
}

/// Resolves conflicts that only look like conflicts
pub struct ConflictResolver {
    index: Arc<dyn IIndexStore>,
}

impl ConflictResolver {
    pub fn new(index: Arc<dyn IIndexStore>) -> Self {
        Self { index }
    }

    /// Splits `conflicts` into auto-resolved and unresolved changes
    ///
    /// A conflict is unresolved when its remote side has no identifier,
    /// when no snapshot is cached for it, when the snapshot cannot be
    /// read, or when the remote metadata differs from the snapshot.
    pub async fn resolve(&self, conflicts: Vec<Change>, is_push: bool) -> ConflictResolution {
        let mut outcome = ConflictResolution::default();

        for change in conflicts {
            let Some(remote) = remote_side(&change, is_push) else {
                outcome.unresolved.push(change);
                continue;
            };
            let Some(id) = remote.id.as_ref() else {
                outcome.unresolved.push(change);
                continue;
            };

            let cached = match self.index.deserialize(id).await {
                Ok(cached) => cached,
                Err(e) => {
                    warn!(
                        path = %change.path(),
                        file_id = %id,
                        error = %e,
                        "Failed to read index entry"
                    );
                    None
                }
            };

            if is_stale(remote, cached.as_ref()) {
                debug!(path = %change.path(), "Conflict is stale, treating as modification");
                outcome.resolved.push(change.into_resolved());
            } else {
                outcome.unresolved.push(change);
            }
        }

        if !outcome.resolved.is_empty() || !outcome.unresolved.is_empty() {
            info!(
                resolved = outcome.resolved.len(),
                unresolved = outcome.unresolved.len(),
                "Conflict resolution finished"
            );
        }

        outcome
    }
}

/// Resolves conflicts in favour of local content
///
/// Each change keeps its `ModConflict` label and its source takes over the
/// destination's remote identifier, so applying it overwrites the remote
/// object in place instead of creating a duplicate.
pub fn keep_local(unresolved: Vec<Change>) -> Vec<Change> {
    unresolved
        .into_iter()
        .map(|mut change| {
            change.adopt_remote_identity();
            change
        })
        .collect()
}
