use std::collections::HashMap;
use crate::core::error::{Error, ErrorKind, Result};
use crate::index::token_set::{Node, NodeId, TokenSet};

/// Canonical signature of a sealed subtree: finality plus the sorted edge
/// list. Child ids are stable because children are canonicalized first.
type NodeKey = (bool, Vec<(char, NodeId)>);

/// Incremental builder producing a minimal DFA from words inserted in
/// ascending lexicographic order.
///
/// After each insert, the suffix of the previous word that no longer lies on
/// the active path is sealed: every sealed subtree with the same canonical
/// signature is replaced by a single interned node.
#[derive(Debug, Default)]
pub struct TokenSetBuilder {
    set: TokenSet,
    previous_word: String,
    // (parent, label, child) for each node on the unsealed suffix chain
    unchecked: Vec<(NodeId, char, NodeId)>,
    minimized: HashMap<NodeKey, NodeId>,
}

impl TokenSetBuilder {
    pub fn new() -> Self {
        TokenSetBuilder {
            set: TokenSet::new(),
            previous_word: String::new(),
            unchecked: Vec::new(),
            minimized: HashMap::new(),
        }
    }

    pub fn insert(&mut self, word: &str) -> Result<()> {
        if word < self.previous_word.as_str() {
            return Err(Error::new(
                ErrorKind::OutOfOrderInsertion,
                format!(
                    "out of order word insertion: '{}' after '{}'",
                    word, self.previous_word
                ),
            ));
        }

        let common_prefix = common_prefix_len(&self.previous_word, word);
        self.minimize(common_prefix);

        let mut node = match self.unchecked.last() {
            Some(&(_, _, child)) => child,
            None => self.set.root,
        };

        for label in word.chars().skip(common_prefix) {
            let next = self.set.add_node();
            self.set.nodes[node].set_edge(label, next);
            self.unchecked.push((node, label, next));
            node = next;
        }

        self.set.nodes[node].is_final = true;
        self.previous_word = word.to_string();
        Ok(())
    }

    pub fn finish(mut self) -> TokenSet {
        self.minimize(0);
        self.set
    }

    /// Seal every unchecked triple deeper than `down_to`, deepest first, so a
    /// child's signature is already canonical when its parent is keyed.
    fn minimize(&mut self, down_to: usize) {
        while self.unchecked.len() > down_to {
            let (parent, label, child) = match self.unchecked.pop() {
                Some(triple) => triple,
                None => break,
            };

            let key = self.key_for(child);
            match self.minimized.get(&key) {
                Some(&canonical) => {
                    self.set.nodes[parent].set_edge(label, canonical);
                }
                None => {
                    self.minimized.insert(key, child);
                }
            }
        }
    }

    fn key_for(&self, node: NodeId) -> NodeKey {
        let Node { is_final, edges } = &self.set.nodes[node];
        (*is_final, edges.clone())
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}
