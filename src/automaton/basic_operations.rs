//! Automaton algebra: composition, determinization, product constructions
//! and membership.
//!
//! Composition functions take their operands by value and may rebuild them
//! in place; clone first to keep an operand. Epsilon edges never persist:
//! `add_epsilon` copies the target's transitions and accept flag into the
//! source as the edge is added.
//!
//! Singleton operands short-circuit where the result is obvious, e.g. two
//! singletons concatenate to a singleton.

use std::collections::VecDeque;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use super::basic_automata::{make_empty, make_empty_string, make_string};
use super::graph::{Automaton, Graph};
use super::sorted_int_set::{FrozenIntSet, SortedIntSet};
use super::sparse_set::SparseSets;
use super::state::{State, StateId, Transition, MAX_CODE_POINT, MIN_CODE_POINT};

#[inline]
fn shifted(id: StateId, offset: u32) -> StateId {
    StateId(id.0 + offset)
}

/// Language `a1 · a2`.
pub fn concatenate(a1: Automaton, a2: Automaton) -> Automaton {
    if let (Some(s1), Some(s2)) = (a1.singleton(), a2.singleton()) {
        return make_string(&format!("{}{}", s1, s2));
    }
    if is_empty(&a1) || is_empty(&a2) {
        return make_empty();
    }
    let deterministic = a1.is_singleton() && a2.is_deterministic();
    let mut g = a1.into_graph();
    let accepts = g.accept_states();
    let g2 = a2.into_graph();
    let initial2 = g2.initial;
    let offset = g.absorb(g2);
    let initial2 = shifted(initial2, offset);
    for s in accepts {
        g.set_accept(s, false);
        g.add_epsilon(s, initial2);
    }
    Automaton::from_graph(g, deterministic)
}

/// Language of the concatenation of every automaton in `list`, in order.
pub fn concatenate_all(list: Vec<Automaton>) -> Automaton {
    if list.is_empty() {
        return make_empty_string();
    }
    if list.iter().all(Automaton::is_singleton) {
        let s: String = list.iter().filter_map(Automaton::singleton).collect();
        return make_string(&s);
    }
    if list.iter().any(is_empty) {
        return make_empty();
    }
    let mut iter = list.into_iter();
    let mut g = match iter.next() {
        Some(first) => first.into_graph(),
        None => return make_empty_string(),
    };
    let mut accepts = g.accept_states();
    for a in iter {
        if is_empty_string(&a) {
            continue;
        }
        let other = a.into_graph();
        let other_accepts = other.accept_states();
        let other_initial = other.initial;
        let offset = g.absorb(other);
        let other_initial = shifted(other_initial, offset);
        let mut next_accepts: Vec<StateId> =
            other_accepts.into_iter().map(|s| shifted(s, offset)).collect();
        for s in accepts {
            g.set_accept(s, false);
            g.add_epsilon(s, other_initial);
            if g.state(s).accept {
                next_accepts.push(s);
            }
        }
        accepts = next_accepts;
    }
    Automaton::from_graph(g, false)
}

/// Language `a ∪ {ε}`.
pub fn optional(a: Automaton) -> Automaton {
    let mut g = a.into_graph();
    let s = g.new_state();
    g.set_accept(s, true);
    let old_initial = g.initial;
    g.add_epsilon(s, old_initial);
    g.initial = s;
    Automaton::from_graph(g, false)
}

/// Kleene star.
pub fn repeat(a: Automaton) -> Automaton {
    let mut g = a.into_graph();
    let accepts = g.accept_states();
    let s = g.new_state();
    g.set_accept(s, true);
    let old_initial = g.initial;
    g.add_epsilon(s, old_initial);
    for p in accepts {
        g.add_epsilon(p, s);
    }
    g.initial = s;
    Automaton::from_graph(g, false)
}

/// `min` or more repetitions.
pub fn repeat_min(a: Automaton, min: u32) -> Automaton {
    let mut list: Vec<Automaton> = (0..min).map(|_| a.clone()).collect();
    list.push(repeat(a));
    concatenate_all(list)
}

/// Between `min` and `max` repetitions; empty if `min > max`.
pub fn repeat_range(a: Automaton, min: u32, max: u32) -> Automaton {
    if min > max {
        return make_empty();
    }
    let mut optional_count = max - min;
    let b = match min {
        0 => make_empty_string(),
        1 => a.clone(),
        _ => concatenate_all((0..min).map(|_| a.clone()).collect()),
    };
    if optional_count == 0 {
        return b;
    }
    // Chain of optional copies: d = a (ε d')?, built from the back.
    let mut d = a.clone().into_graph();
    while optional_count > 1 {
        optional_count -= 1;
        let mut c = a.clone().into_graph();
        let accepts = c.accept_states();
        let d_initial = d.initial;
        let offset = c.absorb(d);
        let d_initial = shifted(d_initial, offset);
        for p in accepts {
            c.add_epsilon(p, d_initial);
        }
        d = c;
    }
    let mut g = b.into_graph();
    let accepts = g.accept_states();
    let d_initial = d.initial;
    let offset = g.absorb(d);
    let d_initial = shifted(d_initial, offset);
    for p in accepts {
        g.add_epsilon(p, d_initial);
    }
    Automaton::from_graph(g, false)
}

/// Complement over all code-point strings.
pub fn complement(a: Automaton) -> Automaton {
    let mut a = a;
    a.expand_singleton();
    determinize(&mut a);
    let g = a.graph_mut();
    g.totalize();
    g.renumber();
    for s in &mut g.states {
        s.accept = !s.accept;
    }
    g.remove_dead_transitions();
    a
}

/// Language `a1 \ a2`.
pub fn minus(a1: Automaton, a2: Automaton) -> Automaton {
    if is_empty(&a1) {
        return make_empty();
    }
    if is_empty(&a2) {
        return a1;
    }
    if let Some(s) = a1.singleton() {
        return if run(&a2, s) { make_empty() } else { a1 };
    }
    intersection(&a1, &complement(a2))
}

/// Product construction; accepts what both accept.
pub fn intersection(a1: &Automaton, a2: &Automaton) -> Automaton {
    if let Some(s) = a1.singleton() {
        return if run(a2, s) { a1.clone() } else { make_empty() };
    }
    if let Some(s) = a2.singleton() {
        return if run(a1, s) { a2.clone() } else { make_empty() };
    }
    if std::ptr::eq(a1, a2) {
        return a1.clone();
    }
    let mut g1 = a1.clone().into_graph();
    let mut g2 = a2.clone().into_graph();
    g1.sort_transitions();
    g2.sort_transitions();

    let mut c = Graph::new();
    let mut pairs: FxHashMap<(StateId, StateId), StateId> = FxHashMap::default();
    let mut worklist = VecDeque::new();
    pairs.insert((g1.initial, g2.initial), c.initial);
    worklist.push_back((g1.initial, g2.initial, c.initial));
    while let Some((s1, s2, p)) = worklist.pop_front() {
        let (st1, st2) = (g1.state(s1), g2.state(s2));
        c.set_accept(p, st1.accept && st2.accept);
        let (t1, t2) = (st1.transitions(), st2.transitions());
        let mut b2 = 0;
        for a in t1 {
            while b2 < t2.len() && t2[b2].max < a.min {
                b2 += 1;
            }
            for b in t2[b2..].iter().take_while(|b| a.max >= b.min) {
                if b.max < a.min {
                    continue;
                }
                let r = *pairs.entry((a.to, b.to)).or_insert_with(|| {
                    let r = c.new_state();
                    worklist.push_back((a.to, b.to, r));
                    r
                });
                c.add_transition(p, Transition::new(a.min.max(b.min), a.max.min(b.max), r));
            }
        }
    }
    let mut result = Automaton::from_graph(c, a1.is_deterministic() && a2.is_deterministic());
    result.remove_dead_transitions();
    result
}

/// True if the language of `a1` is a subset of that of `a2`.
pub fn subset_of(a1: &Automaton, a2: &Automaton) -> bool {
    if std::ptr::eq(a1, a2) {
        return true;
    }
    if let Some(s) = a1.singleton() {
        return match a2.singleton() {
            Some(s2) => s == s2,
            None => run(a2, s),
        };
    }
    let mut a2 = a2.clone();
    determinize(&mut a2);
    let mut g1 = a1.clone().into_graph();
    let mut g2 = a2.into_graph();
    g1.sort_transitions();
    g2.sort_transitions();

    let mut visited: FxHashSet<(StateId, StateId)> = FxHashSet::default();
    let mut worklist = VecDeque::new();
    let start = (g1.initial, g2.initial);
    visited.insert(start);
    worklist.push_back(start);
    while let Some((s1, s2)) = worklist.pop_front() {
        let (st1, st2) = (g1.state(s1), g2.state(s2));
        if st1.accept && !st2.accept {
            return false;
        }
        let (t1, t2) = (st1.transitions(), st2.transitions());
        let mut b2 = 0;
        for a in t1 {
            while b2 < t2.len() && t2[b2].max < a.min {
                b2 += 1;
            }
            // [min1, max1] is the part of `a` not yet covered; `None` once
            // coverage reaches the top of the alphabet.
            let mut uncovered = Some(a.min);
            for b in t2[b2..].iter().take_while(|b| a.max >= b.min) {
                let Some(min1) = uncovered else { break };
                if b.min > min1 {
                    return false;
                }
                uncovered = if b.max < MAX_CODE_POINT { Some(b.max + 1) } else { None };
                let pair = (a.to, b.to);
                if visited.insert(pair) {
                    worklist.push_back(pair);
                }
            }
            if matches!(uncovered, Some(min1) if min1 <= a.max) {
                return false;
            }
        }
    }
    true
}

/// Language equality, by subset in both directions.
pub fn same_language(a1: &Automaton, a2: &Automaton) -> bool {
    if std::ptr::eq(a1, a2) {
        return true;
    }
    if let (Some(s1), Some(s2)) = (a1.singleton(), a2.singleton()) {
        return s1 == s2;
    }
    subset_of(a2, a1) && subset_of(a1, a2)
}

/// Language `a1 ∪ a2`.
pub fn union(a1: Automaton, a2: Automaton) -> Automaton {
    if let (Some(s1), Some(s2)) = (a1.singleton(), a2.singleton()) {
        if s1 == s2 {
            return a1;
        }
    }
    let mut g = a1.into_graph();
    let g2 = a2.into_graph();
    let initial2 = g2.initial;
    let offset = g.absorb(g2);
    let initial2 = shifted(initial2, offset);
    let s = g.new_state();
    let initial1 = g.initial;
    g.add_epsilon(s, initial1);
    g.add_epsilon(s, initial2);
    g.initial = s;
    Automaton::from_graph(g, false)
}

/// Union of every automaton in `list`.
pub fn union_all(list: Vec<Automaton>) -> Automaton {
    let mut g = Graph::new();
    let s = g.initial;
    for a in list {
        if is_empty(&a) {
            continue;
        }
        let other = a.into_graph();
        let other_initial = other.initial;
        let offset = g.absorb(other);
        g.add_epsilon(s, shifted(other_initial, offset));
    }
    Automaton::from_graph(g, false)
}

/// Transitions opening and closing at one boundary point.
#[derive(Debug, Default)]
struct PointTransitions {
    point: u32,
    starts: Vec<Transition>,
    ends: Vec<Transition>,
}

const HASHMAP_CUTOVER: usize = 30;

/// Boundary points of the current source set, looked up linearly while
/// small and through a map past `HASHMAP_CUTOVER`.
#[derive(Debug, Default)]
struct PointTransitionSet {
    points: Vec<PointTransitions>,
    count: usize,
    map: FxHashMap<u32, usize>,
    use_hash: bool,
}

impl PointTransitionSet {
    fn next(&mut self, point: u32) -> usize {
        if self.count == self.points.len() {
            self.points.push(PointTransitions::default());
        }
        let i = self.count;
        let p = &mut self.points[i];
        p.point = point;
        p.starts.clear();
        p.ends.clear();
        self.count += 1;
        i
    }

    fn find(&mut self, point: u32) -> usize {
        if self.use_hash {
            if let Some(&i) = self.map.get(&point) {
                return i;
            }
            let i = self.next(point);
            self.map.insert(point, i);
            return i;
        }
        if let Some(i) = self.points[..self.count].iter().position(|p| p.point == point) {
            return i;
        }
        let i = self.next(point);
        if self.count == HASHMAP_CUTOVER {
            self.use_hash = true;
            for (j, p) in self.points[..self.count].iter().enumerate() {
                self.map.insert(p.point, j);
            }
        }
        i
    }

    fn add(&mut self, t: Transition) {
        let i = self.find(t.min);
        self.points[i].starts.push(t);
        let j = self.find(t.max + 1);
        self.points[j].ends.push(t);
    }

    fn sort(&mut self) {
        self.points[..self.count].sort_unstable_by_key(|p| p.point);
    }

    fn reset(&mut self) {
        if self.use_hash {
            self.map.clear();
            self.use_hash = false;
        }
        self.count = 0;
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Subset construction.
///
/// Sweeps the boundary points of each DFA state's source set in order,
/// keeping the currently open NFA destinations in a `SortedIntSet`. Each
/// distinct open set is interned once in a `FrozenIntSet` registry.
pub fn determinize(a: &mut Automaton) {
    if a.is_deterministic() || a.is_singleton() {
        return;
    }
    let g = a.graph_mut();
    g.renumber();
    let nfa = std::mem::take(&mut g.states);
    let before = nfa.len();

    let mut dfa = vec![State::with_accept(nfa[0].accept)];
    let mut registry: FxHashMap<FrozenIntSet, StateId> = FxHashMap::default();
    let mut worklist: VecDeque<(FrozenIntSet, StateId)> = VecDeque::new();
    let initial_set = FrozenIntSet::single(0);
    registry.insert(initial_set.clone(), StateId::new(0));
    worklist.push_back((initial_set, StateId::new(0)));

    let mut points = PointTransitionSet::default();
    let mut open = SortedIntSet::new(5);

    while let Some((set, r)) = worklist.pop_front() {
        for &n in set.values() {
            for &t in &nfa[n as usize].transitions {
                points.add(t);
            }
        }
        if points.is_empty() {
            continue;
        }
        points.sort();

        let mut last_point = MIN_CODE_POINT;
        let mut accept_count = 0usize;
        for i in 0..points.count {
            let point = points.points[i].point;
            if !open.is_empty() {
                debug_assert!(last_point < point);
                let existing = registry.get(open.values()).copied();
                let q = match existing {
                    Some(q) => {
                        debug_assert_eq!(dfa[q.index()].accept, accept_count > 0);
                        q
                    }
                    None => {
                        let q = StateId::new(dfa.len());
                        dfa.push(State::with_accept(accept_count > 0));
                        let frozen = open.freeze();
                        registry.insert(frozen.clone(), q);
                        worklist.push_back((frozen, q));
                        q
                    }
                };
                dfa[r.index()].add_transition(Transition::new(last_point, point - 1, q));
            }
            let p = &points.points[i];
            for t in &p.ends {
                open.decr(t.to.0);
                if nfa[t.to.index()].accept {
                    accept_count -= 1;
                }
            }
            for t in &p.starts {
                open.incr(t.to.0);
                if nfa[t.to.index()].accept {
                    accept_count += 1;
                }
            }
            last_point = point;
        }
        points.reset();
        debug_assert!(open.is_empty(), "open set not drained after sweep");
    }

    debug!("determinize: {} nfa states -> {} dfa states", before, dfa.len());
    g.states = dfa;
    g.initial = StateId::new(0);
    g.numbered = false;
    a.set_deterministic(true);
}

/// Adds the epsilon edges in `pairs`, closed transitively.
pub fn add_epsilons(a: &mut Automaton, pairs: &[(StateId, StateId)]) {
    let mut forward: FxHashMap<StateId, Vec<StateId>> = FxHashMap::default();
    for &(from, to) in pairs {
        forward.entry(from).or_default().push(to);
    }
    let mut closure: Vec<(StateId, StateId)> = Vec::new();
    let mut sources: Vec<StateId> = forward.keys().copied().collect();
    sources.sort_unstable();
    for from in sources {
        let mut seen: FxHashSet<StateId> = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(s) = stack.pop() {
            for &to in forward.get(&s).map(Vec::as_slice).unwrap_or(&[]) {
                if seen.insert(to) {
                    stack.push(to);
                    closure.push((from, to));
                }
            }
        }
    }
    let g = a.graph_mut();
    for (from, to) in closure {
        g.add_epsilon(from, to);
    }
    a.set_deterministic(false);
}

/// True if the initial state accepts and nothing leaves it.
pub fn is_empty_string(a: &Automaton) -> bool {
    match (a.singleton(), a.graph()) {
        (Some(s), _) => s.is_empty(),
        (None, Some(g)) => {
            let init = g.state(g.initial);
            init.accept && init.transitions.is_empty()
        }
        (None, None) => false,
    }
}

/// True if nothing is accepted. Assumes dead states have been removed.
pub fn is_empty(a: &Automaton) -> bool {
    match a.graph() {
        None => false,
        Some(g) => {
            let init = g.state(g.initial);
            !init.accept && init.transitions.is_empty()
        }
    }
}

/// True if every string is accepted. Assumes a minimal automaton.
pub fn is_total(a: &Automaton) -> bool {
    match a.graph() {
        None => false,
        Some(g) => {
            let init = g.state(g.initial);
            init.accept
                && init.transitions.len() == 1
                && init.transitions[0].to == g.initial
                && init.transitions[0].min == MIN_CODE_POINT
                && init.transitions[0].max == MAX_CODE_POINT
        }
    }
}

pub fn run(a: &Automaton, s: &str) -> bool {
    if let Some(single) = a.singleton() {
        return single == s;
    }
    run_code_points(a, s.chars().map(u32::from))
}

/// Membership test over a code-point sequence.
///
/// Deterministic automata step one state at a time; otherwise the frontier
/// of possible states is advanced together.
pub fn run_code_points(a: &Automaton, code_points: impl IntoIterator<Item = u32>) -> bool {
    let g = match a.graph() {
        Some(g) => g,
        None => {
            let expanded = a.clone_expanded();
            return run_code_points(&expanded, code_points);
        }
    };
    if a.is_deterministic() {
        let mut p = g.initial;
        for c in code_points {
            match g.state(p).step(c) {
                Some(q) => p = q,
                None => return false,
            }
        }
        return g.state(p).accept;
    }
    let mut sets = SparseSets::new(g.states.len());
    sets.current.insert(g.initial);
    for c in code_points {
        let SparseSets { current, next } = &mut sets;
        for s in current.iter() {
            for t in &g.state(s).transitions {
                if t.contains(c) {
                    next.insert(t.to);
                }
            }
        }
        sets.advance();
        if sets.current.is_empty() {
            return false;
        }
    }
    let accepted = sets.current.iter().any(|s| g.state(s).accept);
    accepted
}
