//! Remote path helpers
//!
//! Remote paths are slash-delimited and rooted at the sync root: `/` is the
//! root itself, `/Docs/report.pdf` a file two levels down. Change paths may
//! arrive with or without the leading slash; [`normalize`] makes them
//! canonical.

use std::path::{Path, PathBuf};

/// Separator used by every remote path
pub const SEPARATOR: char = '/';

/// The sync root
pub const ROOT: &str = "/";

/// Canonical form: leading slash, no empty segments, no trailing slash
///
/// `.` segments are dropped and `..` removes the segment before it, so the
/// result never climbs above the root.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    if segments.is_empty() {
        return ROOT.to_string();
    }
    format!("{SEPARATOR}{}", segments.join("/"))
}

/// Splits a path into its parent and last segment
///
/// Returns `None` for the root, which has neither.
pub fn split(path: &str) -> Option<(String, String)> {
    let normalized = normalize(path);
    if normalized == ROOT {
        return None;
    }
    let idx = normalized.rfind(SEPARATOR)?;
    let name = normalized[idx + 1..].to_string();
    let parent = if idx == 0 {
        ROOT.to_string()
    } else {
        normalized[..idx].to_string()
    };
    Some((parent, name))
}

/// Parent directory of `path`; the root is its own parent
pub fn parent_path(path: &str) -> String {
    split(path)
        .map(|(parent, _)| parent)
        .unwrap_or_else(|| ROOT.to_string())
}

/// Absolute local path of a remote path under `root`
pub fn to_local(root: &Path, path: &str) -> PathBuf {
    let normalized = normalize(path);
    let relative = normalized.trim_start_matches(SEPARATOR);
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        relative
            .split(SEPARATOR)
            .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
    }
}
