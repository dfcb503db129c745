/// Label matching any character during automaton intersection.
pub const WILDCARD: char = '*';

pub(crate) type NodeId = usize;

/// One DFA state. Edges are kept sorted by label so a node's edge list doubles
/// as its canonical signature during minimization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Node {
    pub is_final: bool,
    pub edges: Vec<(char, NodeId)>,
}

impl Node {
    pub fn edge(&self, label: char) -> Option<NodeId> {
        self.edges
            .binary_search_by_key(&label, |&(l, _)| l)
            .ok()
            .map(|position| self.edges[position].1)
    }

    /// Add or redirect the edge for `label`.
    pub fn set_edge(&mut self, label: char, target: NodeId) {
        match self.edges.binary_search_by_key(&label, |&(l, _)| l) {
            Ok(position) => self.edges[position].1 = target,
            Err(position) => self.edges.insert(position, (label, target)),
        }
    }
}

/// A token set: a DFA over vocabulary terms, rooted at one node of an arena.
///
/// The vocabulary set built by [`TokenSetBuilder`](crate::index::token_set_builder::TokenSetBuilder)
/// is acyclic and minimal; the query-side automata built by
/// [`from_string`](TokenSet::from_string) and
/// [`from_fuzzy_string`](TokenSet::from_fuzzy_string) may carry `*`
/// self-loops and are only ever intersected with an acyclic set.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Default for TokenSet {
    fn default() -> Self {
        TokenSet::new()
    }
}

impl TokenSet {
    pub fn new() -> Self {
        TokenSet {
            nodes: vec![Node::default()],
            root: 0,
        }
    }

    pub(crate) fn add_node(&mut self) -> NodeId {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }

    fn follow_or_create(&mut self, node: NodeId, label: char) -> NodeId {
        match self.nodes[node].edge(label) {
            Some(existing) => existing,
            None => {
                let next = self.add_node();
                self.nodes[node].set_edge(label, next);
                next
            }
        }
    }

    /// Build a set accepting exactly the given words, which must already be
    /// sorted ascending.
    pub fn from_sorted_words<I, S>(words: I) -> crate::core::error::Result<TokenSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = crate::index::token_set_builder::TokenSetBuilder::new();
        for word in words {
            builder.insert(word.as_ref())?;
        }
        Ok(builder.finish())
    }

    /// Linear chain for a query term; each `*` becomes a self-loop on the
    /// current node.
    pub fn from_string(pattern: &str) -> TokenSet {
        let mut set = TokenSet::new();
        let mut node = set.root;
        let chars: Vec<char> = pattern.chars().collect();

        for (i, &label) in chars.iter().enumerate() {
            let is_final = i == chars.len() - 1;

            if label == WILDCARD {
                set.nodes[node].set_edge(WILDCARD, node);
                set.nodes[node].is_final = is_final;
            } else {
                let next = set.add_node();
                set.nodes[next].is_final = is_final;
                set.nodes[node].set_edge(label, next);
                node = next;
            }
        }

        set
    }

    /// Automaton approximating all words within `edit_distance`
    /// Damerau-Levenshtein edits of `term`; `*` transitions stand for "any
    /// character" and are shared between edit branches.
    pub fn from_fuzzy_string(term: &str, edit_distance: usize) -> TokenSet {
        struct Frame {
            node: NodeId,
            edits: usize,
            rest: Vec<char>,
        }

        let mut set = TokenSet::new();
        let mut stack = vec![Frame {
            node: set.root,
            edits: edit_distance,
            rest: term.chars().collect(),
        }];

        while let Some(frame) = stack.pop() {
            if !frame.rest.is_empty() {
                // no edit
                let next = set.follow_or_create(frame.node, frame.rest[0]);
                if frame.rest.len() == 1 {
                    set.nodes[next].is_final = true;
                }
                stack.push(Frame {
                    node: next,
                    edits: frame.edits,
                    rest: frame.rest[1..].to_vec(),
                });
            }

            if frame.edits == 0 {
                continue;
            }

            // insertion
            let insertion = set.follow_or_create(frame.node, WILDCARD);
            if frame.rest.is_empty() {
                set.nodes[insertion].is_final = true;
            }
            stack.push(Frame {
                node: insertion,
                edits: frame.edits - 1,
                rest: frame.rest.clone(),
            });

            // deletion of the next character
            if frame.rest.len() > 1 {
                let next = set.follow_or_create(frame.node, frame.rest[1]);
                if frame.rest.len() == 2 {
                    set.nodes[next].is_final = true;
                }
                stack.push(Frame {
                    node: next,
                    edits: frame.edits - 1,
                    rest: frame.rest[2..].to_vec(),
                });
            }

            // deletion of the final character
            if frame.rest.len() == 1 {
                set.nodes[frame.node].is_final = true;
            }

            // substitution
            if !frame.rest.is_empty() {
                let substitution = set.follow_or_create(frame.node, WILDCARD);
                if frame.rest.len() == 1 {
                    set.nodes[substitution].is_final = true;
                }
                stack.push(Frame {
                    node: substitution,
                    edits: frame.edits - 1,
                    rest: frame.rest[1..].to_vec(),
                });
            }

            // transposition of the next two characters
            if frame.rest.len() > 1 {
                let next = set.follow_or_create(frame.node, frame.rest[1]);
                let mut swapped = Vec::with_capacity(frame.rest.len() - 1);
                swapped.push(frame.rest[0]);
                swapped.extend_from_slice(&frame.rest[2..]);
                stack.push(Frame {
                    node: next,
                    edits: frame.edits - 1,
                    rest: swapped,
                });
            }
        }

        set
    }

    /// Every word accepted by the automaton. Must not be called on automata
    /// with `*` self-loops; those only participate as intersection inputs.
    pub fn to_vec(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut stack = vec![(self.root, String::new())];

        while let Some((node_id, prefix)) = stack.pop() {
            let node = &self.nodes[node_id];
            if node.is_final {
                words.push(prefix.clone());
            }
            for &(label, child) in node.edges.iter().rev() {
                let mut word = prefix.clone();
                word.push(label);
                stack.push((child, word));
            }
        }

        words
    }

    /// Automaton product. An edge labelled `*` on the query side (`other`)
    /// matches every label on this side; finality is the conjunction of both
    /// sides. The output owns freshly allocated nodes.
    pub fn intersect(&self, other: &TokenSet) -> TokenSet {
        let mut output = TokenSet::new();
        let mut stack = vec![(other.root, output.root, self.root)];

        while let Some((query_id, output_id, node_id)) = stack.pop() {
            let query_edges = other.nodes[query_id].edges.clone();
            let node_edges = self.nodes[node_id].edges.clone();

            for &(query_label, query_child) in &query_edges {
                for &(node_label, node_child) in &node_edges {
                    if node_label != query_label && query_label != WILDCARD {
                        continue;
                    }

                    let is_final =
                        self.nodes[node_child].is_final && other.nodes[query_child].is_final;

                    let next = match output.nodes[output_id].edge(node_label) {
                        Some(existing) => {
                            output.nodes[existing].is_final =
                                output.nodes[existing].is_final || is_final;
                            existing
                        }
                        None => {
                            let next = output.add_node();
                            output.nodes[next].is_final = is_final;
                            output.nodes[output_id].set_edge(node_label, next);
                            next
                        }
                    };

                    stack.push((query_child, next, node_child));
                }
            }
        }

        output
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
