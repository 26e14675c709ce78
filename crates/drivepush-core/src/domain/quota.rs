//! Storage quota classification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default share of the limit (in percent) from which a push is "almost exceeding"
pub const DEFAULT_WARNING_PERCENT: u8 = 90;

/// Account storage usage as reported by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    /// Bytes currently used
    pub used: u64,
    /// Total bytes allowed (0 means unlimited)
    pub limit: u64,
}

/// Where a push would leave the account relative to its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuotaStatus {
    /// Comfortably under the limit
    Ok,
    /// Under the limit but at or above the warning threshold
    AlmostExceeded,
    /// Would go over the limit
    Exceeded,
}

impl QuotaStatus {
    /// Classifies the usage after adding `projected` bytes
    ///
    /// `warning_percent` is clamped to 1..=100.
    pub fn classify(quota: Quota, projected: u64, warning_percent: u8) -> Self {
        if quota.limit == 0 {
            return QuotaStatus::Ok;
        }

        let total = u128::from(quota.used) + u128::from(projected);
        let limit = u128::from(quota.limit);
        if total > limit {
            return QuotaStatus::Exceeded;
        }

        let percent = u128::from(warning_percent.clamp(1, 100));
        if total * 100 >= limit * percent {
            QuotaStatus::AlmostExceeded
        } else {
            QuotaStatus::Ok
        }
    }

    /// Returns true if the push needs explicit confirmation to proceed
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, QuotaStatus::Exceeded)
    }
}

impl fmt::Display for QuotaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaStatus::Ok => write!(f, "ok"),
            QuotaStatus::AlmostExceeded => write!(f, "almost exceeded"),
            QuotaStatus::Exceeded => write!(f, "exceeded"),
        }
    }
}
