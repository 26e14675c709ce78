//! Conflict detection
//!
//! A conflict is stale when the remote side of the change is exactly what
//! the index recorded after our last successful write: the divergence then
//! comes from local edits only, and pushing them is a plain modification.

use drivepush_core::domain::{Change, Index, Operation, RemoteFile};
use tracing::debug;

/// Partitions `changes` on operation kind
///
/// Returns `(non_conflicting, conflicting)`. Only `ModConflict` changes go
/// to the second bucket; relative order is kept in both.
pub fn sift(changes: Vec<Change>) -> (Vec<Change>, Vec<Change>) {
    changes
        .into_iter()
        .partition(|change| change.op() != Operation::ModConflict)
}

/// The side of a change that reflects remote state
///
/// When pushing the remote is the destination; when pulling it is the
/// source.
pub fn remote_side(change: &Change, is_push: bool) -> Option<&RemoteFile> {
    if is_push {
        change.dest()
    } else {
        change.src()
    }
}

/// Returns true if `remote` still matches the cached snapshot
pub fn is_stale(remote: &RemoteFile, cached: Option<&Index>) -> bool {
    let Some(index) = cached else {
        return false;
    };

    let stale = index.matches(remote);
    debug!(
        path = %remote.path,
        file_id = %index.file_id,
        stale,
        "Compared remote metadata against index snapshot"
    );
    stale
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use drivepush_core::domain::FileId;

    fn file(path: &str, checksum: &str) -> RemoteFile {
        RemoteFile::file(path, 4, DateTime::<Utc>::UNIX_EPOCH, Some(checksum.into()))
    }

    fn remote(path: &str, id: &str, checksum: &str) -> RemoteFile {
        file(path, checksum).with_id(FileId::new(id).unwrap())
    }

    fn sample() -> Vec<Change> {
        vec![
            Change::added("/a", file("/a", "1")),
            Change::conflicting("/b", file("/b", "2"), remote("/b", "rb", "3")),
            Change::modified("/c", file("/c", "4"), Some(remote("/c", "rc", "5"))),
            Change::deleted("/d", remote("/d", "rd", "6")),
            Change::conflicting("/e", file("/e", "7"), remote("/e", "re", "8")),
        ]
    }

    #[test]
    fn test_sift_partitions_on_conflict() {
        let input = sample();
        let total = input.len();
        let (clean, conflicts) = sift(input);

        assert_eq!(clean.len() + conflicts.len(), total);
        assert!(conflicts.iter().all(|c| c.op() == Operation::ModConflict));
        assert!(clean.iter().all(|c| c.op() != Operation::ModConflict));
        let paths: Vec<&str> = conflicts.iter().map(|c| c.path()).collect();
        assert_eq!(paths, vec!["/b", "/e"]);
    }

    #[test]
    fn test_sift_empty() {
        let (clean, conflicts) = sift(Vec::new());
        assert!(clean.is_empty());
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_remote_side_depends_on_direction() {
        let change = Change::conflicting("/b", file("/b", "local"), remote("/b", "rb", "remote"));
        assert_eq!(
            remote_side(&change, true).unwrap().checksum.as_deref(),
            Some("remote")
        );
        assert_eq!(
            remote_side(&change, false).unwrap().checksum.as_deref(),
            Some("local")
        );
    }

    #[test]
    fn test_is_stale() {
        let current = remote("/b", "rb", "x");
        let index = current.to_index().unwrap();
        assert!(is_stale(&current, Some(&index)));
        assert!(!is_stale(&remote("/b", "rb", "y"), Some(&index)));
        assert!(!is_stale(&current, None));
    }
}
