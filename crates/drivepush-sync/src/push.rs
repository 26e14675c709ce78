//! Push orchestrator
//!
//! Sequences one push:
//!
//! 1. Diff every source path, then every mount point (mount failures are
//!    skipped)
//! 2. Split out conflicts, auto-resolve stale ones against the index, and
//!    ask about the rest
//! 3. Show the change list and ask for confirmation
//! 4. Check the quota
//! 5. Apply the batch
//!
//! Mount points are detached on every exit path, including an interrupt.

use std::path::PathBuf;
use std::sync::Arc;

use drivepush_conflict::{keep_local, sift, ConflictResolution, ConflictResolver};
use drivepush_core::config::{Config, PushConfig};
use drivepush_core::domain::path;
use drivepush_core::domain::{Change, FieldMask, MountPoint, QuotaStatus};
use drivepush_core::ports::{
    IChangeResolver, IIndexStore, IMountRegistry, IPrompter, IRemoteStore,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::applier::{ApplyOptions, ChangeApplier, PushSummary};
use crate::quota::{projected_size, QuotaGate};
use crate::{DeclineReason, PushError};

/// What to push and how
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    /// Paths relative to the sync root to diff recursively
    pub sources: Vec<String>,
    /// External locations attached under the sync root for this push
    pub mounts: Vec<MountPoint>,
    /// Skip the change-list confirmation
    pub no_prompt: bool,
    pub ignore_checksum: bool,
    pub mask: FieldMask,
}

impl PushOptions {
    /// Options seeded from the `push` section of the configuration
    pub fn from_config(config: &PushConfig) -> Self {
        Self {
            no_prompt: config.no_prompt,
            ignore_checksum: config.ignore_checksum,
            ..Self::default()
        }
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mounts(mut self, mounts: Vec<MountPoint>) -> Self {
        self.mounts = mounts;
        self
    }
}

/// How a push ended when it was not aborted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// No changes between local and remote
    UpToDate,
    Applied(PushSummary),
}

/// Drives a push from change resolution to batch completion
pub struct Pusher {
    root: PathBuf,
    max_concurrent: usize,
    quota_warning_percent: u8,
    remote: Arc<dyn IRemoteStore>,
    index: Arc<dyn IIndexStore>,
    resolver: Arc<dyn IChangeResolver>,
    prompter: Arc<dyn IPrompter>,
    mounts: Arc<dyn IMountRegistry>,
}

impl Pusher {
    pub fn new(
        config: &Config,
        remote: Arc<dyn IRemoteStore>,
        index: Arc<dyn IIndexStore>,
        resolver: Arc<dyn IChangeResolver>,
        prompter: Arc<dyn IPrompter>,
        mounts: Arc<dyn IMountRegistry>,
    ) -> Self {
        Self {
            root: config.sync_root.clone(),
            max_concurrent: config.push.max_concurrent,
            quota_warning_percent: config.push.quota_warning_percent,
            remote,
            index,
            resolver,
            prompter,
            mounts,
        }
    }

    /// Runs a push until it completes, is declined, or `cancel` fires
    ///
    /// # Errors
    /// - [`PushError::Declined`] when a confirmation was refused
    /// - [`PushError::Interrupted`] when `cancel` fired first
    /// - any resolution, quota or directory-creation error
    pub async fn push(
        &self,
        opts: &PushOptions,
        cancel: &CancellationToken,
    ) -> Result<PushOutcome, PushError> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Push interrupted");
                Err(PushError::Interrupted)
            }
            result = self.run(opts) => result,
        };

        self.clear_mounts(&opts.mounts).await;
        result
    }

    #[tracing::instrument(
        skip_all,
        fields(sources = opts.sources.len(), mounts = opts.mounts.len())
    )]
    async fn run(&self, opts: &PushOptions) -> Result<PushOutcome, PushError> {
        let changes = self.collect_changes(opts).await?;
        debug!(count = changes.len(), "Changes resolved");

        let (mut merged, conflicts) = sift(changes);
        if !conflicts.is_empty() {
            let ConflictResolution {
                resolved,
                unresolved,
            } = ConflictResolver::new(self.index.clone())
                .resolve(conflicts, true)
                .await;
            merged.extend(resolved);

            if !unresolved.is_empty() {
                for change in &unresolved {
                    warn!(path = change.path(), "Unresolved conflict");
                }
                if !self.prompter.confirm_conflicts(&unresolved) {
                    info!("Conflicts left unresolved, aborting push");
                    return Err(PushError::Declined(DeclineReason::ConflictsUnresolved));
                }
                merged.extend(keep_local(unresolved));
            }
        }

        if merged.is_empty() {
            info!("Everything is up-to-date");
            return Ok(PushOutcome::UpToDate);
        }

        for change in &merged {
            info!("{change}");
        }
        if !opts.no_prompt && !self.prompter.confirm_changes(&merged) {
            info!("Changes rejected, aborting push");
            return Err(PushError::Declined(DeclineReason::ChangesRejected));
        }

        self.check_quota(&merged).await?;

        let mut apply_options = ApplyOptions::new(self.root.clone());
        apply_options.mask = opts.mask;
        apply_options.ignore_checksum = opts.ignore_checksum;
        apply_options.max_concurrent = self.max_concurrent;

        let applier = ChangeApplier::new(self.remote.clone(), self.index.clone(), apply_options);
        let summary = applier.apply_batch(merged).await?;
        Ok(PushOutcome::Applied(summary))
    }

    async fn collect_changes(&self, opts: &PushOptions) -> Result<Vec<Change>, PushError> {
        let mut changes = Vec::new();

        for source in &opts.sources {
            let source = path::normalize(source);
            let local = path::to_local(&self.root, &source);
            let found = self
                .resolver
                .diff_change_list(&source, &local, true)
                .await
                .map_err(|err| PushError::Resolve {
                    source_path: source.clone(),
                    source: err,
                })?;
            changes.extend(found);
        }

        for mount in &opts.mounts {
            let remote_path = path::normalize(&mount.name);
            match self
                .resolver
                .resolve_single(&remote_path, &mount.mount_path)
                .await
            {
                Ok(found) => changes.extend(found),
                Err(err) => {
                    warn!(
                        mount = %remote_path,
                        local = %mount.mount_path.display(),
                        %err,
                        "Skipping mount point"
                    );
                }
            }
        }

        Ok(changes)
    }

    async fn check_quota(&self, changes: &[Change]) -> Result<(), PushError> {
        let projected = projected_size(changes);
        let status = QuotaGate::new(self.remote.clone())
            .with_warning_percent(self.quota_warning_percent)
            .check(projected)
            .await?;

        if status == QuotaStatus::AlmostExceeded {
            warn!(projected, "Push will bring storage usage close to the quota");
        }
        if status.requires_confirmation() {
            warn!(projected, %status, "Push would exceed the storage quota");
            if !self.prompter.confirm_quota(status, projected) {
                return Err(PushError::Declined(DeclineReason::QuotaExceeded));
            }
        }
        Ok(())
    }

    async fn clear_mounts(&self, points: &[MountPoint]) {
        if points.is_empty() {
            return;
        }
        if let Err(err) = self.mounts.clear(points).await {
            warn!(%err, "Failed to detach mount points");
        }
    }
}
