//! Quota gate
//!
//! Projects how many bytes a change list would add and classifies the
//! account's usage after the push. Deciding what to do with the status
//! (warn, ask, abort) is up to the caller.

use std::sync::Arc;

use drivepush_core::domain::{Change, QuotaStatus, DEFAULT_WARNING_PERCENT};
use drivepush_core::ports::IRemoteStore;
use tracing::debug;

use crate::PushError;

/// Sum of the bytes every change would upload
///
/// Directories and deletions count as zero.
pub fn projected_size(changes: &[Change]) -> u64 {
    changes
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.projected_bytes()))
}

pub struct QuotaGate {
    remote: Arc<dyn IRemoteStore>,
    warning_percent: u8,
}

impl QuotaGate {
    pub fn new(remote: Arc<dyn IRemoteStore>) -> Self {
        Self {
            remote,
            warning_percent: DEFAULT_WARNING_PERCENT,
        }
    }

    pub fn with_warning_percent(mut self, percent: u8) -> Self {
        self.warning_percent = percent;
        self
    }

    /// Queries the quota and classifies it with `projected` bytes added
    pub async fn check(&self, projected: u64) -> Result<QuotaStatus, PushError> {
        let quota = self.remote.quota().await.map_err(PushError::Quota)?;
        let status = QuotaStatus::classify(quota, projected, self.warning_percent);
        debug!(
            used = quota.used,
            limit = quota.limit,
            projected,
            status = %status,
            "Quota checked"
        );
        Ok(status)
    }
}
