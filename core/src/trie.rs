//! Prefix trie over term text, one code point per edge.
//!
//! Nodes live in an arena and refer to each other by index. Children are kept sorted by code
//! point, which fixes the pre-order walk and therefore the encoded byte layout.

use crate::index::{Occurrence, Term};

pub type NodeId = usize;

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieNode {
    /// `'\0'` for the root.
    pub key: char,
    /// Sorted ascending by key.
    pub children: Vec<(char, NodeId)>,
    pub occurrences: Option<Vec<Occurrence>>,
}

impl TrieNode {
    fn new(key: char) -> Self {
        Self { key, children: Vec::new(), occurrences: None }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn has_occurrences(&self) -> bool {
        self.occurrences.as_ref().is_some_and(|o| !o.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<TrieNode>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::new('\0')] }
    }

    /// Build a trie from a completed term list, taking ownership of every occurrence list.
    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        let mut trie = Self::new();
        for term in terms {
            trie.insert(term);
        }
        trie
    }

    /// Insert `term`, attaching its occurrences to the node where its text ends.
    ///
    /// Any occurrences already attached to that node are replaced.
    pub fn insert(&mut self, term: Term) {
        let mut node = ROOT;
        for ch in term.text.chars() {
            node = self.child_or_insert(node, ch);
        }
        self.nodes[node].occurrences = Some(term.occurrences);
    }

    fn child_or_insert(&mut self, parent: NodeId, key: char) -> NodeId {
        match self.nodes[parent].children.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(pos) => self.nodes[parent].children[pos].1,
            Err(pos) => {
                let id = self.nodes.len();
                self.nodes.push(TrieNode::new(key));
                self.nodes[parent].children.insert(pos, (key, id));
                id
            }
        }
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    pub fn root(&self) -> &TrieNode {
        &self.nodes[ROOT]
    }

    /// Total node count, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Follow `text` from the root.
    pub fn find(&self, text: &str) -> Option<NodeId> {
        let mut node = ROOT;
        for ch in text.chars() {
            let children = &self.nodes[node].children;
            let pos = children.binary_search_by_key(&ch, |&(k, _)| k).ok()?;
            node = children[pos].1;
        }
        Some(node)
    }

    /// Pre-order depth-first walk, children in ascending key order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { trie: self, stack: Vec::new(), started: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Explicit-stack traversal yielding an `Enter`/`Leave` pair for every node.
pub struct Walk<'a> {
    trie: &'a Trie,
    /// Open nodes with the index of the next child to visit.
    stack: Vec<(NodeId, usize)>,
    started: bool,
}

impl Walk<'_> {
    /// Number of nodes currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Iterator for Walk<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if !self.started {
            self.started = true;
            self.stack.push((ROOT, 0));
            return Some(Step::Enter(ROOT));
        }

        let (node, next_child) = self.stack.last_mut()?;
        let node = *node;
        match self.trie.nodes[node].children.get(*next_child) {
            Some(&(_, child)) => {
                *next_child += 1;
                self.stack.push((child, 0));
                Some(Step::Enter(child))
            }
            None => {
                self.stack.pop();
                Some(Step::Leave(node))
            }
        }
    }
}
