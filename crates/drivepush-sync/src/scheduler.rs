//! Directory-ahead planning
//!
//! Before a group of uploads is dispatched, every directory the group
//! writes into must exist remotely. Creating them lazily per file would
//! race: two siblings uploaded concurrently would both try to create their
//! shared parent. Instead the group's paths are loaded into a [`PathTrie`],
//! each separator node with descendants is treated as a potential
//! directory, and the directory that the descendants have in common is
//! collected once.
//!
//! ```text
//! a/b/c.txt ─┐            "a/"   → common "a/"   → /a
//! a/b/d.txt ─┼─ trie ──→  "a/b/" → common "a/b/" → /a/b
//! a/e.txt  ──┘
//! ```
//!
//! The result is deduplicated and ordered parent-first so it can be
//! ensured sequentially.

use std::collections::BTreeSet;

use drivepush_core::domain::path::{self, SEPARATOR};
use drivepush_core::domain::Change;

use crate::trie::{is_potential_dir, PathTrie, POTENTIAL_DIR};

/// Longest common character prefix of `paths`
///
/// Returns an empty string for an empty slice. The prefix always ends on a
/// character boundary.
pub fn common_prefix(paths: &[&str]) -> String {
    let Some((first, rest)) = paths.split_first() else {
        return String::new();
    };

    let mut end = first.len();
    for other in rest {
        end = first
            .char_indices()
            .zip(other.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((idx, ch), _)| idx + ch.len_utf8())
            .unwrap_or(0)
            .min(end);
        if end == 0 {
            break;
        }
    }
    first[..end].to_string()
}

/// Directory shared by all of `paths`
///
/// The common prefix is cut back to its last separator so that a lone file
/// path never comes back as a directory, then the trailing separator is
/// dropped. `["a/b/c.txt", "a/b/d.txt"]` gives `a/b`.
pub fn directory_prefix(paths: &[&str]) -> String {
    let prefix = common_prefix(paths);
    match prefix.rfind(SEPARATOR) {
        Some(idx) => prefix[..idx].trim_end_matches(SEPARATOR).to_string(),
        None => String::new(),
    }
}

/// Directories (canonical remote paths) that must exist before `paths`
/// can be written, ordered parents before children
///
/// The root is never part of the plan.
pub fn plan_directories<'a, I>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut trie = PathTrie::new();
    for p in paths {
        let canonical = path::normalize(p);
        let relative = canonical.trim_start_matches(SEPARATOR);
        if !relative.is_empty() {
            trie.insert(relative);
        }
    }
    trie.tag_where(POTENTIAL_DIR, is_potential_dir);

    let mut dirs = BTreeSet::new();
    for node in trie.tagged(POTENTIAL_DIR) {
        let below = node.descendant_paths();
        if below.is_empty() {
            continue;
        }
        let dir = directory_prefix(&below);
        if !dir.is_empty() {
            dirs.insert(path::normalize(&dir));
        }
    }

    let mut planned: Vec<String> = dirs.into_iter().collect();
    planned.sort_by_key(|dir| dir.matches(SEPARATOR).count());
    planned
}

/// Directory plan for a group of changes, keyed by their paths
pub fn plan_for_changes(changes: &[Change]) -> Vec<String> {
    plan_directories(changes.iter().map(Change::path))
}
