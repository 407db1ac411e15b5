//! The `Automaton` type and its structural operations.
//!
//! An automaton is either a known single string or an explicit state graph:
//!
//! - `Singleton(String)`: accepts exactly that string, no graph built yet
//! - `Graph`: an arena of states addressed by `StateId`
//!
//! Operations that need the graph expand a singleton on demand. The arena
//! may hold unreachable garbage after composition; `renumber` compacts it
//! so that arena index equals breadth-first number and the initial state
//! is index 0. Any structural mutation clears the `numbered` flag.

use std::collections::VecDeque;
use std::fmt;

use super::state::{write_symbol, State, StateId, Transition, MAX_CODE_POINT, MIN_CODE_POINT};
use super::{basic_operations, minimization};

/// Arena-backed state graph.
#[derive(Clone, Debug)]
pub(crate) struct Graph {
    pub(crate) states: Vec<State>,
    pub(crate) initial: StateId,
    /// True while `states` is exactly the reachable set in breadth-first
    /// order with the initial state at index 0.
    pub(crate) numbered: bool,
}

impl Graph {
    /// One non-accepting initial state: the empty language.
    pub(crate) fn new() -> Self {
        Graph {
            states: vec![State::new()],
            initial: StateId::new(0),
            numbered: true,
        }
    }

    /// No states at all; the caller must create one and set `initial`.
    pub(crate) fn bare() -> Self {
        Graph {
            states: Vec::new(),
            initial: StateId::NONE,
            numbered: false,
        }
    }

    /// A chain accepting exactly `code_points`.
    pub(crate) fn from_code_points(code_points: impl IntoIterator<Item = u32>) -> Self {
        let mut g = Graph::new();
        let mut current = g.initial;
        for c in code_points {
            let next = g.new_state();
            g.states[current.index()].add_transition(Transition::single(c, next));
            current = next;
        }
        g.states[current.index()].accept = true;
        g.numbered = true;
        g
    }

    #[inline]
    pub(crate) fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    #[inline]
    pub(crate) fn set_accept(&mut self, id: StateId, accept: bool) {
        self.states[id.index()].accept = accept;
    }

    pub(crate) fn new_state(&mut self) -> StateId {
        let id = StateId::new(self.states.len());
        self.states.push(State::new());
        self.numbered = false;
        id
    }

    #[inline]
    pub(crate) fn add_transition(&mut self, from: StateId, t: Transition) {
        self.states[from.index()].add_transition(t);
        self.numbered = false;
    }

    /// Simulates an epsilon edge `from -> to` by copying `to`'s accept flag
    /// and outgoing transitions into `from`.
    pub(crate) fn add_epsilon(&mut self, from: StateId, to: StateId) {
        if from == to {
            return;
        }
        let (src, dst) = if from < to {
            let (lo, hi) = self.states.split_at_mut(to.index());
            (&mut lo[from.index()], &hi[0])
        } else {
            let (lo, hi) = self.states.split_at_mut(from.index());
            (&mut hi[0], &lo[to.index()])
        };
        if dst.accept {
            src.accept = true;
        }
        src.transitions.extend_from_slice(&dst.transitions);
        self.numbered = false;
    }

    /// Moves `other`'s states into this arena and returns the index offset
    /// applied to them.
    pub(crate) fn absorb(&mut self, other: Graph) -> u32 {
        let offset = self.states.len() as u32;
        self.states.extend(other.states.into_iter().map(|mut s| {
            for t in &mut s.transitions {
                t.to = StateId(t.to.0 + offset);
            }
            s
        }));
        self.numbered = false;
        offset
    }

    /// States reachable from the initial state, in breadth-first order.
    pub(crate) fn reachable(&self) -> Vec<StateId> {
        if self.numbered {
            return (0..self.states.len()).map(StateId::new).collect();
        }
        let mut visited = vec![false; self.states.len()];
        let mut order = Vec::new();
        let mut worklist = VecDeque::new();
        visited[self.initial.index()] = true;
        worklist.push_back(self.initial);
        while let Some(s) = worklist.pop_front() {
            order.push(s);
            for t in &self.states[s.index()].transitions {
                if !visited[t.to.index()] {
                    visited[t.to.index()] = true;
                    worklist.push_back(t.to);
                }
            }
        }
        order
    }

    /// Compacts the arena to the reachable states in breadth-first order.
    pub(crate) fn renumber(&mut self) {
        if self.numbered {
            return;
        }
        let order = self.reachable();
        let mut number = vec![u32::MAX; self.states.len()];
        for (n, id) in order.iter().enumerate() {
            number[id.index()] = n as u32;
        }
        let mut states = Vec::with_capacity(order.len());
        for id in &order {
            let mut s = std::mem::take(&mut self.states[id.index()]);
            for t in &mut s.transitions {
                t.to = StateId(number[t.to.index()]);
            }
            states.push(s);
        }
        self.states = states;
        self.initial = StateId::new(0);
        self.numbered = true;
    }

    pub(crate) fn accept_states(&self) -> Vec<StateId> {
        self.reachable()
            .into_iter()
            .filter(|s| self.states[s.index()].accept)
            .collect()
    }

    /// Marks, by arena index, every reachable state from which an accept
    /// state can be reached.
    pub(crate) fn live_states(&self) -> Vec<bool> {
        let order = self.reachable();
        let mut preds: Vec<Vec<StateId>> = vec![Vec::new(); self.states.len()];
        for &s in &order {
            for t in &self.states[s.index()].transitions {
                preds[t.to.index()].push(s);
            }
        }
        let mut live = vec![false; self.states.len()];
        let mut worklist = VecDeque::new();
        for &s in &order {
            if self.states[s.index()].accept {
                live[s.index()] = true;
                worklist.push_back(s);
            }
        }
        while let Some(s) = worklist.pop_front() {
            for &p in &preds[s.index()] {
                if !live[p.index()] {
                    live[p.index()] = true;
                    worklist.push_back(p);
                }
            }
        }
        live
    }

    /// Sorted interval start points; always includes 0.
    pub(crate) fn start_points(&self) -> Vec<u32> {
        let mut points = vec![MIN_CODE_POINT];
        for s in self.reachable() {
            for t in &self.states[s.index()].transitions {
                points.push(t.min);
                if t.max < MAX_CODE_POINT {
                    points.push(t.max + 1);
                }
            }
        }
        points.sort_unstable();
        points.dedup();
        points
    }

    pub(crate) fn reduce(&mut self) {
        self.renumber();
        for s in &mut self.states {
            s.reduce();
        }
    }

    /// Renumbers, then sorts every state's transitions by interval.
    pub(crate) fn sort_transitions(&mut self) {
        self.renumber();
        for s in &mut self.states {
            s.sort_transitions();
        }
    }

    pub(crate) fn totalize(&mut self) {
        let order = self.reachable();
        let dead = self.new_state();
        self.states[dead.index()].add_transition(Transition::new(MIN_CODE_POINT, MAX_CODE_POINT, dead));
        for id in order {
            let s = &mut self.states[id.index()];
            s.sort_transitions();
            let mut gaps = Vec::new();
            let mut next = MIN_CODE_POINT;
            for t in &s.transitions {
                if t.min > next {
                    gaps.push(Transition::new(next, t.min - 1, dead));
                }
                if t.max + 1 > next {
                    next = t.max + 1;
                }
            }
            if next <= MAX_CODE_POINT {
                gaps.push(Transition::new(next, MAX_CODE_POINT, dead));
            }
            s.transitions.extend(gaps);
        }
        self.numbered = false;
    }

    pub(crate) fn remove_dead_transitions(&mut self) {
        self.renumber();
        let live = self.live_states();
        for s in &mut self.states {
            s.transitions.retain(|t| live[t.to.index()]);
        }
        self.numbered = false;
        self.reduce();
    }

    pub(crate) fn num_transitions(&self) -> usize {
        self.reachable()
            .into_iter()
            .map(|s| self.states[s.index()].transitions.len())
            .sum()
    }
}

#[derive(Clone, Debug)]
enum Repr {
    Singleton(String),
    Graph(Graph),
}

/// A finite automaton over code points.
///
/// `deterministic` is a hint: it may be `false` for a graph that happens to
/// be deterministic, but it is never `true` for one that is not.
///
/// Equality is language equality. There is no `Hash` impl; see DESIGN.md.
#[derive(Clone, Debug)]
pub struct Automaton {
    repr: Repr,
    deterministic: bool,
}

impl Default for Automaton {
    fn default() -> Self {
        Automaton::new()
    }
}

impl Automaton {
    /// An automaton with a single non-accepting state: the empty language.
    pub fn new() -> Self {
        Automaton {
            repr: Repr::Graph(Graph::new()),
            deterministic: true,
        }
    }

    pub(crate) fn from_graph(graph: Graph, deterministic: bool) -> Self {
        Automaton {
            repr: Repr::Graph(graph),
            deterministic,
        }
    }

    pub(crate) fn from_singleton(s: impl Into<String>) -> Self {
        Automaton {
            repr: Repr::Singleton(s.into()),
            deterministic: true,
        }
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        matches!(self.repr, Repr::Singleton(_))
    }

    /// The accepted string, if this automaton is still in singleton form.
    pub fn singleton(&self) -> Option<&str> {
        match &self.repr {
            Repr::Singleton(s) => Some(s),
            Repr::Graph(_) => None,
        }
    }

    #[inline]
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn set_deterministic(&mut self, deterministic: bool) {
        self.deterministic = deterministic;
    }

    pub(crate) fn graph(&self) -> Option<&Graph> {
        match &self.repr {
            Repr::Graph(g) => Some(g),
            Repr::Singleton(_) => None,
        }
    }

    pub(crate) fn graph_mut(&mut self) -> &mut Graph {
        self.expand_singleton();
        match &mut self.repr {
            Repr::Graph(g) => g,
            Repr::Singleton(_) => unreachable!("singleton expanded above"),
        }
    }

    pub(crate) fn into_graph(mut self) -> Graph {
        self.expand_singleton();
        match self.repr {
            Repr::Graph(g) => g,
            Repr::Singleton(_) => unreachable!("singleton expanded above"),
        }
    }

    /// Materializes the graph for a singleton: one state per code point.
    pub fn expand_singleton(&mut self) {
        if let Repr::Singleton(s) = &self.repr {
            let graph = Graph::from_code_points(s.chars().map(u32::from));
            self.repr = Repr::Graph(graph);
        }
    }

    pub fn clone_expanded(&self) -> Self {
        let mut a = self.clone();
        a.expand_singleton();
        a
    }

    pub fn create_state(&mut self) -> StateId {
        self.graph_mut().new_state()
    }

    pub fn initial_state(&mut self) -> StateId {
        self.graph_mut().initial
    }

    pub fn set_initial_state(&mut self, id: StateId) {
        let g = self.graph_mut();
        g.initial = id;
        g.numbered = false;
    }

    pub fn state(&mut self, id: StateId) -> &State {
        self.graph_mut().state(id)
    }

    pub fn set_accept(&mut self, id: StateId, accept: bool) {
        self.graph_mut().set_accept(id, accept);
    }

    /// Adds `from --[min, max]--> to`. Bounds above `MAX_CODE_POINT` are
    /// clamped. Clears the deterministic hint if the interval overlaps an
    /// existing transition of `from`.
    pub fn add_transition(&mut self, from: StateId, min: u32, max: u32, to: StateId) {
        let t = Transition::new(min.min(MAX_CODE_POINT), max.min(MAX_CODE_POINT), to);
        let g = self.graph_mut();
        let overlaps = g
            .state(from)
            .transitions
            .iter()
            .any(|o| o.min <= t.max && t.min <= o.max);
        g.add_transition(from, t);
        if overlaps {
            self.deterministic = false;
        }
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.graph_mut().add_epsilon(from, to);
        self.deterministic = false;
    }

    /// Reachable states indexed by their breadth-first number, which is also
    /// their `StateId` afterwards.
    pub fn numbered_states(&mut self) -> &[State] {
        let g = self.graph_mut();
        g.renumber();
        &g.states
    }

    pub fn accept_states(&mut self) -> Vec<StateId> {
        self.graph_mut().accept_states()
    }

    /// Reachable states from which some accept state can be reached.
    pub fn live_states(&mut self) -> Vec<StateId> {
        let g = self.graph_mut();
        g.renumber();
        g.live_states()
            .into_iter()
            .enumerate()
            .filter(|&(_, live)| live)
            .map(|(i, _)| StateId::new(i))
            .collect()
    }

    /// Adds a dead state and routes every undefined symbol to it.
    pub fn totalize(&mut self) {
        self.graph_mut().totalize();
    }

    pub fn reduce(&mut self) {
        if let Repr::Graph(g) = &mut self.repr {
            g.reduce();
        }
    }

    pub fn start_points(&mut self) -> Vec<u32> {
        self.graph_mut().start_points()
    }

    /// Drops states that cannot reach an accept state, then reduces.
    pub fn remove_dead_transitions(&mut self) {
        if let Repr::Graph(g) = &mut self.repr {
            g.remove_dead_transitions();
        }
    }

    /// Transitions of every numbered state, each list sorted by interval.
    pub fn sorted_transitions(&mut self) -> Vec<&[Transition]> {
        let g = self.graph_mut();
        g.sort_transitions();
        g.states.iter().map(|s| s.transitions()).collect()
    }

    pub fn num_states(&self) -> usize {
        match &self.repr {
            Repr::Singleton(s) => s.chars().count() + 1,
            Repr::Graph(g) => g.reachable().len(),
        }
    }

    pub fn num_transitions(&self) -> usize {
        match &self.repr {
            Repr::Singleton(s) => s.chars().count(),
            Repr::Graph(g) => g.num_transitions(),
        }
    }

    /// Graphviz rendering.
    pub fn to_dot(&self) -> String {
        use std::fmt::Write;

        let mut g = self.clone().into_graph();
        g.renumber();
        let mut out = String::from("digraph Automaton {\n  rankdir = LR;\n");
        for (n, s) in g.states.iter().enumerate() {
            let shape = if s.accept { "doublecircle" } else { "circle" };
            let _ = writeln!(out, "  {} [shape={},label=\"\"];", n, shape);
            if n == g.initial.index() {
                out.push_str("  initial [shape=plaintext,label=\"\"];\n");
                let _ = writeln!(out, "  initial -> {}", n);
            }
            for t in &s.transitions {
                let _ = write!(out, "  {} -> {} [label=\"", n, t.to);
                let _ = write_symbol(&mut out, t.min);
                if t.min != t.max {
                    out.push('-');
                    let _ = write_symbol(&mut out, t.max);
                }
                out.push_str("\"]\n");
            }
        }
        out.push_str("}\n");
        out
    }

    // Composition shorthands; see `basic_operations` for semantics.

    pub fn concatenate(self, other: Automaton) -> Automaton {
        basic_operations::concatenate(self, other)
    }

    pub fn union(self, other: Automaton) -> Automaton {
        basic_operations::union(self, other)
    }

    pub fn optional(self) -> Automaton {
        basic_operations::optional(self)
    }

    pub fn repeat(self) -> Automaton {
        basic_operations::repeat(self)
    }

    pub fn repeat_min(self, min: u32) -> Automaton {
        basic_operations::repeat_min(self, min)
    }

    pub fn repeat_range(self, min: u32, max: u32) -> Automaton {
        basic_operations::repeat_range(self, min, max)
    }

    pub fn complement(self) -> Automaton {
        basic_operations::complement(self)
    }

    pub fn minus(self, other: Automaton) -> Automaton {
        basic_operations::minus(self, other)
    }

    pub fn intersection(&self, other: &Automaton) -> Automaton {
        basic_operations::intersection(self, other)
    }

    pub fn subset_of(&self, other: &Automaton) -> bool {
        basic_operations::subset_of(self, other)
    }

    pub fn determinize(&mut self) {
        basic_operations::determinize(self);
    }

    pub fn minimize(&mut self) {
        minimization::minimize(self);
    }

    pub fn run(&self, s: &str) -> bool {
        basic_operations::run(self, s)
    }
}

impl PartialEq for Automaton {
    fn eq(&self, other: &Self) -> bool {
        basic_operations::same_language(self, other)
    }
}

impl Eq for Automaton {}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Repr::Singleton(s) = &self.repr {
            return write!(f, "singleton: {}", s);
        }
        let mut g = self.clone().into_graph();
        g.renumber();
        writeln!(f, "initial state: {}", g.initial)?;
        for (n, s) in g.states.iter().enumerate() {
            let kind = if s.accept { "accept" } else { "reject" };
            writeln!(f, "state {} [{}]:", n, kind)?;
            for t in &s.transitions {
                writeln!(f, "  {}", t)?;
            }
        }
        Ok(())
    }
}
