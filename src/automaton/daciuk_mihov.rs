//! Minimal automaton construction from sorted strings.
//!
//! Daciuk, Mihov, Watson and Watson, "Incremental Construction of Minimal
//! Acyclic Finite-State Automata". Terms arrive in code-point order. The
//! path of the most recent term stays open; when the next term diverges,
//! the open suffix below the divergence point is frozen bottom-up, each
//! node either replaced by an equivalent registered node or registered
//! itself.
//!
//! Nodes live in a builder-local arena referenced by index. Children are
//! kept sorted by label, and the last child is always the open one.

use std::collections::VecDeque;

use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::graph::{Automaton, Graph};
use super::state::{StateId, Transition};
use crate::error::{AutomatonError, Result};

/// Index into the builder arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
struct NodeIdx(u32);

impl NodeIdx {
    const ROOT: NodeIdx = NodeIdx(0);

    fn get(self) -> usize {
        self.0 as usize
    }
}

type Children = SmallVec<[(u32, NodeIdx); 4]>;

#[derive(Clone, Debug, Default)]
struct Node {
    /// (label, target) pairs sorted by label.
    children: Children,
    is_final: bool,
}

/// Registry key: two frozen nodes are equivalent iff they agree on
/// finality and on every (label, target) pair.
type Signature = (bool, Children);

/// Incremental builder for the minimal automaton of a sorted term set.
#[derive(Debug)]
pub struct DaciukMihovAutomatonBuilder {
    nodes: Vec<Node>,
    registry: FxHashMap<Signature, NodeIdx>,
    previous: Option<Vec<u32>>,
    terms: usize,
}

impl Default for DaciukMihovAutomatonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DaciukMihovAutomatonBuilder {
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(Node::default());
        DaciukMihovAutomatonBuilder {
            nodes,
            registry: FxHashMap::default(),
            previous: None,
            terms: 0,
        }
    }

    /// Builds the minimal automaton for `terms`, which must be sorted.
    pub fn build<I, S>(terms: I) -> Result<Automaton>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::new();
        for term in terms {
            builder.add(term.as_ref())?;
        }
        Ok(builder.complete())
    }

    /// Adds a term. Terms must arrive in non-decreasing code-point order;
    /// repeating the previous term is a no-op.
    pub fn add(&mut self, term: &str) -> Result<()> {
        let current: Vec<u32> = term.chars().map(u32::from).collect();
        if let Some(previous) = &self.previous {
            if previous.as_slice() > current.as_slice() {
                return Err(AutomatonError::UnsortedInput {
                    previous: to_string(previous),
                    current: term.to_string(),
                });
            }
        }

        // Walk the shared prefix along the open path.
        let mut node = NodeIdx::ROOT;
        let mut pos = 0;
        while pos < current.len() {
            match self.last_child(node) {
                Some((label, next)) if label == current[pos] => {
                    node = next;
                    pos += 1;
                }
                _ => break,
            }
        }

        if !self.nodes[node.get()].children.is_empty() {
            self.replace_or_register(node);
        }
        self.add_suffix(node, &current[pos..]);
        self.previous = Some(current);
        self.terms += 1;
        Ok(())
    }

    /// Adds a term given as UTF-8 bytes.
    pub fn add_bytes(&mut self, term: &[u8]) -> Result<()> {
        let s = std::str::from_utf8(term).map_err(|_| AutomatonError::InvalidUtf8)?;
        self.add(s)
    }

    /// Freezes the open path and returns the automaton.
    pub fn complete(mut self) -> Automaton {
        if !self.nodes[NodeIdx::ROOT.get()].children.is_empty() {
            self.replace_or_register(NodeIdx::ROOT);
        }
        let automaton = self.to_automaton();
        debug!(
            "sorted set build: {} terms, {} arena nodes, {} states",
            self.terms,
            self.nodes.len(),
            automaton.num_states()
        );
        automaton
    }

    fn alloc(&mut self, is_final: bool) -> NodeIdx {
        let idx = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(Node {
            children: SmallVec::new(),
            is_final,
        });
        idx
    }

    fn last_child(&self, node: NodeIdx) -> Option<(u32, NodeIdx)> {
        self.nodes[node.get()].children.last().copied()
    }

    fn add_suffix(&mut self, mut node: NodeIdx, suffix: &[u32]) {
        for &label in suffix {
            let next = self.alloc(false);
            self.nodes[node.get()].children.push((label, next));
            node = next;
        }
        self.nodes[node.get()].is_final = true;
    }

    /// Freezes the open chain hanging off `node`, deepest node first.
    fn replace_or_register(&mut self, node: NodeIdx) {
        let mut chain = vec![node];
        let mut cur = node;
        while let Some((_, child)) = self.last_child(cur) {
            chain.push(child);
            cur = child;
        }

        for pair in chain.windows(2).rev() {
            let (parent, child) = (pair[0], pair[1]);
            let n = &self.nodes[child.get()];
            let key: Signature = (n.is_final, n.children.clone());
            match self.registry.get(&key).copied() {
                Some(existing) => {
                    if let Some(last) = self.nodes[parent.get()].children.last_mut() {
                        last.1 = existing;
                    }
                }
                None => {
                    self.registry.insert(key, child);
                }
            }
        }
    }

    /// Copies the nodes reachable from the root into a state graph.
    fn to_automaton(&self) -> Automaton {
        let mut g = Graph::bare();
        let mut map: FxHashMap<NodeIdx, StateId> = FxHashMap::default();
        let root = g.new_state();
        g.initial = root;
        map.insert(NodeIdx::ROOT, root);

        let mut worklist = VecDeque::from([NodeIdx::ROOT]);
        while let Some(idx) = worklist.pop_front() {
            let from = map[&idx];
            let node = &self.nodes[idx.get()];
            g.set_accept(from, node.is_final);
            for &(label, target) in &node.children {
                let to = match map.get(&target) {
                    Some(&s) => s,
                    None => {
                        let s = g.new_state();
                        map.insert(target, s);
                        worklist.push_back(target);
                        s
                    }
                };
                g.add_transition(from, Transition::single(label, to));
            }
        }
        Automaton::from_graph(g, true)
    }
}

fn to_string(code_points: &[u32]) -> String {
    code_points
        .iter()
        .map(|&c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
