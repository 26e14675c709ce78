//! drivepush Conflict - Conflict partitioning and resolution
//!
//! Provides:
//! - [`sift`]: split a change list into conflict-free and conflicting parts
//! - Staleness detection against the local index snapshot
//! - [`ConflictResolver`]: automatic resolution of stale conflicts
//! - [`keep_local`]: the overwrite policy applied when the user accepts
//!   the remaining conflicts

pub mod detector;
pub mod resolver;

pub use detector::{is_stale, remote_side, sift};
pub use resolver::{keep_local, ConflictResolution, ConflictResolver};
