//! Prompter port
//!
//! User confirmations are plain boolean callbacks; rendering and input
//! handling live with the terminal front end.

use crate::domain::{Change, QuotaStatus};

pub trait IPrompter: Send + Sync {
    /// Asked when conflicts remain after automatic resolution.
    /// `true` overwrites the remote side with local content.
    fn confirm_conflicts(&self, unresolved: &[Change]) -> bool;

    /// Asked once with the full list of changes about to be pushed
    fn confirm_changes(&self, changes: &[Change]) -> bool;

    /// Asked when the push would exceed the storage quota
    fn confirm_quota(&self, status: QuotaStatus, projected_bytes: u64) -> bool;
}

/// Answers yes to everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl IPrompter for AutoConfirm {
    fn confirm_conflicts(&self, _unresolved: &[Change]) -> bool {
        true
    }

    fn confirm_changes(&self, _changes: &[Change]) -> bool {
        true
    }

    fn confirm_quota(&self, _status: QuotaStatus, _projected_bytes: u64) -> bool {
        true
    }
}
