//! Character trie over slash-delimited paths
//!
//! Each node stands for one character; a path is the sequence of keys from
//! the root to a node flagged as end-of-string. Nodes can be tagged after
//! insertion and collected by tag or by predicate, which is how the
//! directory planner finds "potential directories": separator nodes that
//! still have descendants.

use std::collections::{BTreeMap, BTreeSet};

use drivepush_core::domain::path::SEPARATOR;

/// Tag carried by separator nodes that have descendants
pub const POTENTIAL_DIR: &str = "potential-dir";

/// A single character position in the trie
#[derive(Debug, Default)]
pub struct TrieNode {
    key: Option<char>,
    children: BTreeMap<char, TrieNode>,
    /// Full inserted path, present only on end-of-string nodes
    path: Option<String>,
    tags: BTreeSet<&'static str>,
}

impl TrieNode {
    fn with_key(key: char) -> Self {
        Self {
            key: Some(key),
            ..Self::default()
        }
    }

    /// Character of this node (None for the root)
    pub fn key(&self) -> Option<char> {
        self.key
    }

    pub fn is_eos(&self) -> bool {
        self.path.is_some()
    }

    /// Path that ends at this node, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// This node and every descendant satisfying `pred`, in pre-order
    ///
    /// Children are visited in key order, so results are deterministic.
    pub fn matching<'a, F>(&'a self, pred: F) -> Vec<&'a TrieNode>
    where
        F: Fn(&TrieNode) -> bool,
    {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if pred(node) {
                found.push(node);
            }
            stack.extend(node.children.values().rev());
        }
        found
    }

    /// Paths of all end-of-string nodes strictly below this one
    pub fn descendant_paths(&self) -> Vec<&str> {
        self.children
            .values()
            .flat_map(|child| child.matching(TrieNode::is_eos))
            .filter_map(TrieNode::path)
            .collect()
    }

    fn tag_where<F>(&mut self, tag: &'static str, pred: &F) -> usize
    where
        F: Fn(&TrieNode) -> bool,
    {
        let mut tagged = 0;
        if pred(&*self) {
            self.tags.insert(tag);
            tagged += 1;
        }
        for child in self.children.values_mut() {
            tagged += child.tag_where(tag, pred);
        }
        tagged
    }
}

/// Returns true for separator nodes that are a strict prefix of some path
pub fn is_potential_dir(node: &TrieNode) -> bool {
    node.key == Some(SEPARATOR) && node.has_children()
}

/// Prefix trie keyed by characters
#[derive(Debug, Default)]
pub struct PathTrie {
    root: TrieNode,
    len: usize,
}

impl PathTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `path`; inserting the same path twice is a no-op
    pub fn insert(&mut self, path: &str) {
        let mut node = &mut self.root;
        for ch in path.chars() {
            node = node
                .children
                .entry(ch)
                .or_insert_with(|| TrieNode::with_key(ch));
        }
        if node.path.is_none() {
            node.path = Some(path.to_string());
            self.len += 1;
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        let mut node = &self.root;
        for ch in path.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.is_eos()
    }

    /// Number of distinct inserted paths
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Tags every node satisfying `pred` and returns how many were tagged
    pub fn tag_where<F>(&mut self, tag: &'static str, pred: F) -> usize
    where
        F: Fn(&TrieNode) -> bool,
    {
        self.root.tag_where(tag, &pred)
    }

    /// Nodes carrying `tag`, in pre-order
    pub fn tagged(&self, tag: &str) -> Vec<&TrieNode> {
        self.root.matching(|node| node.has_tag(tag))
    }

    /// Nodes satisfying `pred`, in pre-order
    pub fn matching<F>(&self, pred: F) -> Vec<&TrieNode>
    where
        F: Fn(&TrieNode) -> bool,
    {
        self.root.matching(pred)
    }
}
