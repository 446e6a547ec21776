// --- File: src/core/trie.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of an entry in the lexicon the trie was built from.
pub type EntryId = usize;

#[derive(Clone, Serialize, Deserialize)]
struct TrieNode {
    children: HashMap<String, usize>,
    entry: Option<EntryId>,
}

impl TrieNode {
    fn new() -> Self {
        Self { children: HashMap::new(), entry: None }
    }
}

/// Word-level trie over uppercased tokens, used for longest-match lookup of
/// multi-word lexicon terms.
#[derive(Clone, Serialize, Deserialize)]
pub struct TermTrie {
    nodes: Vec<TrieNode>,
}

impl Default for TermTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl TermTrie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::new()] }
    }

    /// Inserts a word sequence. A later insert of the same sequence replaces
    /// the entry. O(k) in the number of words.
    pub fn insert<S: AsRef<str>>(&mut self, words: &[S], entry: EntryId) {
        if words.is_empty() {
            return;
        }
        let mut node_idx = 0;
        for word in words {
            let key = word.as_ref().to_uppercase();
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&key) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(TrieNode::new());
                self.nodes[node_idx].children.insert(key, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
        }
        self.nodes[node_idx].entry = Some(entry);
    }

    /// Longest entry starting at `words[0]`, as (words consumed, entry).
    pub fn longest_match<S: AsRef<str>>(&self, words: &[S]) -> Option<(usize, EntryId)> {
        let mut node_idx = 0;
        let mut best = None;
        for (depth, word) in words.iter().enumerate() {
            let key = word.as_ref().to_uppercase();
            match self.nodes[node_idx].children.get(&key) {
                Some(&next_idx) => node_idx = next_idx,
                None => break,
            }
            if let Some(entry) = self.nodes[node_idx].entry {
                best = Some((depth + 1, entry));
            }
        }
        best
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
