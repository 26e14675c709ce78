//! Change applier - executes a batch of changes against the remote store
//!
//! ## Flow
//!
//! ```text
//! changes ──┬─ adds ─→ ensure dirs → upserts ─┐
//!           ├─ mods ─→ ensure dirs → upserts ─┼─→ wait → PushSummary
//!           └─ dels ─→ trash, drop index ─────┘
//! ```
//!
//! The three groups run concurrently; inside a group at most
//! `max_concurrent` remote calls are in flight. Directories of a group are
//! always ensured before any of its uploads is dispatched, parents first.
//!
//! Failures of individual files are logged and reported in the summary.
//! A directory that cannot be created aborts its group (nothing of that
//! group is uploaded) and the batch returns the error once every other
//! task has finished.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use drivepush_core::domain::path;
use drivepush_core::domain::{Change, FieldMask, FileId, Operation, RemoteFile};
use drivepush_core::ports::{IIndexStore, IRemoteStore, UpsertRequest};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::scheduler;
use crate::tracker::CompletionTracker;
use crate::PushError;

/// Default number of remote calls in flight per change group
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Settings of a [`ChangeApplier`]
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Local directory mirrored to the remote root
    pub root: PathBuf,
    pub mask: FieldMask,
    pub ignore_checksum: bool,
    pub max_concurrent: usize,
}

impl ApplyOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mask: FieldMask::ALL,
            ignore_checksum: false,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// Result of applying a single change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    /// Content or metadata was written remotely
    Uploaded(String),
    /// The remote already matched; nothing was written
    Unchanged(String),
    /// A directory change was satisfied by creating (or finding) the directory
    DirectoryEnsured(String),
    /// The remote object was moved to the trash
    Deleted(String),
    Failed { path: String, error: String },
}

/// Counts of a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushSummary {
    pub files_uploaded: u32,
    pub files_unchanged: u32,
    pub files_deleted: u32,
    /// Directories created remotely, including parents created ahead of uploads
    pub dirs_created: u32,
    /// Per-change failures (non-fatal)
    pub errors: Vec<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl PushSummary {
    fn record(&mut self, outcome: OpOutcome) {
        match outcome {
            OpOutcome::Uploaded(_) => self.files_uploaded += 1,
            OpOutcome::Unchanged(_) | OpOutcome::DirectoryEnsured(_) => {
                self.files_unchanged += 1
            }
            OpOutcome::Deleted(_) => self.files_deleted += 1,
            OpOutcome::Failed { path, error } => self.errors.push(format!("{path}: {error}")),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Applies changes to the remote store and keeps the local index in step
pub struct ChangeApplier {
    remote: Arc<dyn IRemoteStore>,
    index: Arc<dyn IIndexStore>,
    options: ApplyOptions,
    dirs_created: AtomicU32,
}

impl ChangeApplier {
    pub fn new(
        remote: Arc<dyn IRemoteStore>,
        index: Arc<dyn IIndexStore>,
        options: ApplyOptions,
    ) -> Self {
        Self {
            remote,
            index,
            options,
            dirs_created: AtomicU32::new(0),
        }
    }

    /// Directories created by this applier so far
    pub fn dirs_created(&self) -> u32 {
        self.dirs_created.load(Ordering::Relaxed)
    }

    /// Applies a batch of changes and waits for all of them
    ///
    /// # Errors
    /// Returns the first directory-creation error of the add or modify
    /// group. Per-change failures are reported in the summary instead.
    #[tracing::instrument(skip_all, fields(changes = changes.len()))]
    pub async fn apply_batch(&self, changes: Vec<Change>) -> Result<PushSummary, PushError> {
        let start = std::time::Instant::now();
        let tracker = CompletionTracker::start(changes.len());
        let created_before = self.dirs_created();

        let mut adds = Vec::new();
        let mut mods = Vec::new();
        let mut dels = Vec::new();
        for mut change in changes {
            match change.op() {
                Operation::Add => adds.push(change),
                Operation::Mod | Operation::ModConflict => {
                    change.adopt_remote_identity();
                    mods.push(change);
                }
                Operation::Delete => dels.push(change),
            }
        }

        info!(
            adds = adds.len(),
            mods = mods.len(),
            deletes = dels.len(),
            "Applying changes"
        );

        let (added, modified, deleted) = tokio::join!(
            self.upsert_group(adds, &tracker),
            self.upsert_group(mods, &tracker),
            self.delete_group(dels, &tracker),
        );
        tracker.wait().await;

        let mut summary = PushSummary::default();
        let mut first_error = None;
        for group in [added, modified] {
            match group {
                Ok(outcomes) => outcomes.into_iter().for_each(|o| summary.record(o)),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        deleted.into_iter().for_each(|o| summary.record(o));
        summary.dirs_created = self.dirs_created().saturating_sub(created_before);
        summary.duration_ms = start.elapsed().as_millis() as u64;

        if let Some(err) = first_error {
            return Err(err);
        }

        info!(
            uploaded = summary.files_uploaded,
            unchanged = summary.files_unchanged,
            deleted = summary.files_deleted,
            dirs_created = summary.dirs_created,
            errors = summary.errors.len(),
            duration_ms = summary.duration_ms,
            "Batch complete"
        );
        Ok(summary)
    }

    async fn upsert_group(
        &self,
        group: Vec<Change>,
        tracker: &CompletionTracker,
    ) -> Result<Vec<OpOutcome>, PushError> {
        if group.is_empty() {
            return Ok(Vec::new());
        }

        let dirs = scheduler::plan_for_changes(&group);
        debug!(count = dirs.len(), "Ensuring directories ahead of uploads");
        for dir in &dirs {
            if let Err(err) = self.ensure_dir(dir).await {
                warn!(path = %dir, %err, "Directory creation failed, skipping group");
                tracker.done_many(group.len());
                return Err(err);
            }
        }

        let outcomes = stream::iter(group)
            .map(|change| async move {
                let outcome = self.upsert_one(&change).await;
                tracker.done();
                outcome
            })
            .buffer_unordered(self.options.max_concurrent.max(1))
            .collect::<Vec<_>>()
            .await;
        Ok(outcomes)
    }

    async fn delete_group(
        &self,
        group: Vec<Change>,
        tracker: &CompletionTracker,
    ) -> Vec<OpOutcome> {
        stream::iter(group)
            .map(|change| async move {
                let outcome = self.delete_one(&change).await;
                tracker.done();
                outcome
            })
            .buffer_unordered(self.options.max_concurrent.max(1))
            .collect::<Vec<_>>()
            .await
    }

    /// Creates or updates the remote counterpart of `change`
    ///
    /// The parent directory must already exist remotely. A directory
    /// addition is routed through [`ensure_dir`](Self::ensure_dir) so it is
    /// created at most once.
    pub async fn upsert_one(&self, change: &Change) -> OpOutcome {
        let target = change.path().to_string();
        let Some(src) = change.src() else {
            return failed(target, "change has no local source");
        };

        if src.is_dir && change.dest().is_none() {
            return match self.ensure_dir(&target).await {
                Ok(_) => OpOutcome::DirectoryEnsured(target),
                Err(err) => failed(target, err),
            };
        }

        let parent_path = path::parent_path(&target);
        let parent = match self.remote.find_by_path(&parent_path).await {
            Ok(Some(parent)) => parent,
            Ok(None) => {
                return failed(target, format!("parent {parent_path} not found remotely"));
            }
            Err(err) => return failed(target, err),
        };
        let Some(parent_id) = parent.id else {
            return failed(target, format!("parent {parent_path} has no remote id"));
        };

        let request = UpsertRequest {
            parent_id,
            local_abs_path: Some(path::to_local(&self.options.root, &target)),
            src: src.clone(),
            dest: change.dest().cloned(),
            mask: self.options.mask,
            ignore_checksum: self.options.ignore_checksum,
        };

        match self.remote.upsert_by_comparison(&request).await {
            Ok(Some(file)) => {
                debug!(path = %target, op = %change.op(), "Uploaded");
                self.record_index(&file).await;
                OpOutcome::Uploaded(target)
            }
            Ok(None) => {
                debug!(path = %target, "No effective difference, skipped");
                OpOutcome::Unchanged(target)
            }
            Err(err) => {
                warn!(path = %target, %err, "Upload failed");
                failed(target, err)
            }
        }
    }

    /// Trashes the remote object of a deletion and drops its index entry
    pub async fn delete_one(&self, change: &Change) -> OpOutcome {
        let target = change.path().to_string();
        let Some(id) = change.dest().and_then(|d| d.id.as_ref()) else {
            return failed(target, "deletion has no remote id");
        };

        if let Err(err) = self.remote.trash(id).await {
            warn!(path = %target, file_id = %id, %err, "Trash failed");
            return failed(target, err);
        }

        // A missing entry is only worth a warning: the remote side is gone
        if let Err(err) = self.index.remove(id).await {
            warn!(path = %target, file_id = %id, %err, "Failed to remove index entry");
        }
        debug!(path = %target, "Trashed");
        OpOutcome::Deleted(target)
    }

    /// Restores a trashed object
    ///
    /// Uses the identifier of the change's source, falling back to the
    /// destination.
    pub async fn untrash_one(&self, change: &Change) -> Result<(), PushError> {
        let id: &FileId = change
            .src()
            .and_then(|s| s.id.as_ref())
            .or_else(|| change.dest().and_then(|d| d.id.as_ref()))
            .ok_or_else(|| PushError::MissingRemoteId {
                path: change.path().to_string(),
            })?;

        self.remote
            .untrash(id)
            .await
            .map_err(|source| PushError::Remote {
                path: change.path().to_string(),
                source,
            })?;
        info!(path = change.path(), file_id = %id, "Restored from trash");
        Ok(())
    }

    /// Makes sure `dir` exists remotely, creating missing ancestors first
    ///
    /// Idempotent: an existing directory is returned as is, and a creation
    /// that fails because someone else created it in the meantime counts
    /// as success.
    ///
    /// # Errors
    /// [`PushError::RootModification`] when asked to create the root, or
    /// the remote error when the directory is still missing afterwards.
    pub fn ensure_dir<'a>(
        &'a self,
        dir: &'a str,
    ) -> BoxFuture<'a, Result<RemoteFile, PushError>> {
        async move {
            let dir = path::normalize(dir);
            if let Some(existing) = self.lookup(&dir).await? {
                return Ok(existing);
            }

            let Some((parent_path, _)) = path::split(&dir) else {
                return Err(PushError::RootModification);
            };
            let parent = self.ensure_dir(&parent_path).await?;
            let parent_id = parent.id.ok_or_else(|| PushError::MissingRemoteId {
                path: parent_path.clone(),
            })?;

            let request = UpsertRequest {
                parent_id,
                local_abs_path: None,
                src: RemoteFile::directory(&dir),
                dest: None,
                mask: self.options.mask,
                ignore_checksum: false,
            };

            let created = match self.remote.upsert_by_comparison(&request).await {
                Ok(Some(created)) => created,
                Ok(None) => {
                    return self.lookup(&dir).await?.ok_or_else(|| {
                        PushError::DirectoryCreation {
                            path: dir.clone(),
                            reason: "remote reported no change but directory is missing"
                                .to_string(),
                        }
                    });
                }
                Err(source) => {
                    return match self.lookup(&dir).await {
                        Ok(Some(raced)) => {
                            debug!(path = %dir, "Directory appeared concurrently");
                            Ok(raced)
                        }
                        Ok(None) => Err(PushError::Remote { path: dir, source }),
                        Err(lookup_err) => {
                            warn!(
                                path = %dir,
                                err = %lookup_err,
                                "Lookup after failed directory creation also failed"
                            );
                            Err(PushError::Remote { path: dir, source })
                        }
                    };
                }
            };

            self.dirs_created.fetch_add(1, Ordering::Relaxed);
            info!(path = %dir, "Created remote directory");
            self.record_index(&created).await;
            Ok(created)
        }
        .boxed()
    }

    async fn lookup(&self, dir: &str) -> Result<Option<RemoteFile>, PushError> {
        self.remote
            .find_by_path(dir)
            .await
            .map_err(|source| PushError::Remote {
                path: dir.to_string(),
                source,
            })
    }

    /// Writes the index entry for a freshly written remote object
    ///
    /// Failures are logged only; the remote write already happened.
    async fn record_index(&self, file: &RemoteFile) {
        let Some(entry) = file.to_index() else {
            warn!(path = %file.path, "Remote returned no id, index not updated");
            return;
        };
        if let Err(err) = self.index.serialize(&entry).await {
            warn!(path = %file.path, %err, "Failed to write index entry");
        }
    }
}

fn failed(path: String, error: impl std::fmt::Display) -> OpOutcome {
    OpOutcome::Failed {
        path,
        error: error.to_string(),
    }
}
