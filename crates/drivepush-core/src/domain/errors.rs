//! Domain error types

use thiserror::Error;

/// Errors that can occur while building or validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote identifier
    #[error("Invalid file ID: {0}")]
    InvalidId(String),

    /// A change whose operation does not match the sides it carries
    #[error("Invalid change at {path}: {reason}")]
    InvalidChange {
        /// Path of the offending change
        path: String,
        /// What was wrong with it
        reason: String,
    },
}
