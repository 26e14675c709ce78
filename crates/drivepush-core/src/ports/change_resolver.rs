//! Change resolver port
//!
//! Wraps the local/remote tree diff. The push engine only consumes its
//! output.

use std::path::Path;

use crate::domain::Change;

#[async_trait::async_trait]
pub trait IChangeResolver: Send + Sync {
    /// Recursively diffs `source_path` (relative to the sync root) against
    /// its local counterpart at `local_abs_path`
    async fn diff_change_list(
        &self,
        source_path: &str,
        local_abs_path: &Path,
        is_push: bool,
    ) -> anyhow::Result<Vec<Change>>;

    /// Diffs a single attached path without descending into it
    ///
    /// `remote_path` is where the attachment appears remotely and
    /// `local_path` where its content lives.
    async fn resolve_single(
        &self,
        remote_path: &str,
        local_path: &Path,
    ) -> anyhow::Result<Vec<Change>>;
}
