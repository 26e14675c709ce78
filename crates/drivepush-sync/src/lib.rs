//! drivepush Sync - Change scheduling and push orchestration
//!
//! Provides:
//! - A prefix trie over remote paths and the directory-ahead planner built on it
//! - The change applier: upserts, deletes and recursive directory creation,
//!   with index bookkeeping after every remote mutation
//! - The quota gate
//! - The push orchestrator with interrupt-safe mount cleanup
//!
//! ## Modules
//!
//! - [`trie`] - Character trie over slash-delimited paths
//! - [`scheduler`] - Directories that must exist before a batch is uploaded
//! - [`tracker`] - Counting completion tracker for a batch
//! - [`applier`] - Executes changes against the remote store
//! - [`quota`] - Projected size and quota classification
//! - [`push`] - Top-level push sequencing
//! - [`signal`] - SIGINT/SIGTERM to cancellation token
//! - [`logging`] - Tracing subscriber setup

pub mod applier;
pub mod logging;
pub mod push;
pub mod quota;
pub mod scheduler;
pub mod signal;
pub mod tracker;
pub mod trie;

use std::fmt;

use thiserror::Error;

pub use applier::{ApplyOptions, ChangeApplier, OpOutcome, PushSummary};
pub use push::{PushOptions, PushOutcome, Pusher};

/// Why the user stopped a push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    /// Real conflicts remained and overwriting them was declined
    ConflictsUnresolved,
    /// The change list was rejected
    ChangesRejected,
    /// The push would exceed the quota and was not confirmed
    QuotaExceeded,
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::ConflictsUnresolved => write!(f, "conflicts left unresolved"),
            DeclineReason::ChangesRejected => write!(f, "changes rejected"),
            DeclineReason::QuotaExceeded => write!(f, "quota would be exceeded"),
        }
    }
}

/// Errors that stop a push or a batch
///
/// Per-file upload and delete failures are not errors at this level; they
/// are reported in the [`PushSummary`].
#[derive(Debug, Error)]
pub enum PushError {
    /// The local/remote diff for a source path failed
    #[error("Failed to resolve changes for {source_path}: {source}")]
    Resolve {
        source_path: String,
        #[source]
        source: anyhow::Error,
    },

    /// The quota query failed
    #[error("Failed to query quota: {0}")]
    Quota(#[source] anyhow::Error),

    /// A remote call needed for directory creation failed
    #[error("Remote error at {path}: {source}")]
    Remote {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// Attempted to create or replace the sync root
    #[error("Cannot modify the remote root")]
    RootModification,

    /// A remote object needed by the operation has no identifier
    #[error("No remote id for {path}")]
    MissingRemoteId { path: String },

    /// A directory could not be made to exist remotely
    #[error("Failed to create directory {path}: {reason}")]
    DirectoryCreation { path: String, reason: String },

    /// The user declined to continue; nothing was applied
    #[error("Push aborted: {0}")]
    Declined(DeclineReason),

    /// An interrupt arrived before the push finished
    #[error("Push interrupted")]
    Interrupted,
}
