//! Analyses over whole automata: finiteness, common prefix and suffix,
//! reversal and enumeration of finite languages.

use super::graph::{Automaton, Graph};
use super::state::{StateId, Transition};

/// Index of the interval in `points` that contains `c`.
///
/// `points` holds sorted start points beginning at 0, so the answer is the
/// last index whose start is `<= c`.
#[inline]
pub fn find_index(c: u32, points: &[u32]) -> usize {
    points.partition_point(|&p| p <= c).saturating_sub(1)
}

const WHITE: u8 = 0;
const GREY: u8 = 1;
const BLACK: u8 = 2;

/// True if the language is finite, i.e. no cycle lies on a path to an
/// accept state.
pub fn is_finite(a: &Automaton) -> bool {
    let g = match a.graph() {
        Some(g) => g,
        None => return true,
    };
    let live = g.live_states();
    if !live[g.initial.index()] {
        return true;
    }
    let mut colour = vec![WHITE; g.states.len()];
    let mut stack: Vec<(StateId, usize)> = vec![(g.initial, 0)];
    colour[g.initial.index()] = GREY;
    while let Some(top) = stack.last_mut() {
        let (s, i) = *top;
        let ts = g.state(s).transitions();
        if i == ts.len() {
            colour[s.index()] = BLACK;
            stack.pop();
            continue;
        }
        top.1 += 1;
        let to = ts[i].to;
        if !live[to.index()] {
            continue;
        }
        match colour[to.index()] {
            GREY => return false,
            WHITE => {
                colour[to.index()] = GREY;
                stack.push((to, 0));
            }
            _ => {}
        }
    }
    true
}

/// Deterministic copy without dead states.
fn trimmed_dfa(a: &Automaton) -> Graph {
    let mut a = a.clone();
    a.determinize();
    let mut g = a.into_graph();
    g.remove_dead_transitions();
    g
}

/// Labels along the single forced path from the initial state: stops at
/// an accept state, a branch, a range edge or a revisited state.
fn forced_path(g: &Graph) -> Vec<u32> {
    let mut visited = vec![false; g.states.len()];
    let mut labels = Vec::new();
    let mut s = g.initial;
    loop {
        visited[s.index()] = true;
        let state = g.state(s);
        if state.is_accept() {
            break;
        }
        match state.transitions() {
            [t] if t.min == t.max && !visited[t.to.index()] => {
                labels.push(t.min);
                s = t.to;
            }
            _ => break,
        }
    }
    labels
}

fn to_string_lossy(code_points: impl IntoIterator<Item = u32>) -> String {
    code_points.into_iter().map_while(char::from_u32).collect()
}

/// Longest string that every accepted string starts with.
pub fn common_prefix(a: &Automaton) -> String {
    if let Some(s) = a.singleton() {
        return s.to_string();
    }
    to_string_lossy(forced_path(&trimmed_dfa(a)))
}

/// Longest byte prefix shared by every string of a byte automaton.
pub fn common_prefix_bytes(a: &Automaton) -> Vec<u8> {
    if let Some(s) = a.singleton() {
        return s.as_bytes().to_vec();
    }
    forced_path(&trimmed_dfa(a))
        .into_iter()
        .map_while(|c| u8::try_from(c).ok())
        .collect()
}

/// Longest string that every accepted string ends with.
pub fn common_suffix(a: &Automaton) -> String {
    if let Some(s) = a.singleton() {
        return s.to_string();
    }
    let mut labels = forced_path(&reversed_dfa(a));
    labels.reverse();
    // A stop on a non-scalar value keeps only what follows it.
    let start = labels
        .iter()
        .rposition(|&c| char::from_u32(c).is_none())
        .map_or(0, |i| i + 1);
    to_string_lossy(labels[start..].iter().copied())
}

/// Longest byte suffix shared by every string of a byte automaton.
pub fn common_suffix_bytes(a: &Automaton) -> Vec<u8> {
    if let Some(s) = a.singleton() {
        return s.as_bytes().to_vec();
    }
    let mut bytes: Vec<u8> = forced_path(&reversed_dfa(a))
        .into_iter()
        .map_while(|c| u8::try_from(c).ok())
        .collect();
    bytes.reverse();
    bytes
}

fn reversed_dfa(a: &Automaton) -> Graph {
    let mut r = a.clone();
    reverse(&mut r);
    trimmed_dfa(&r)
}

/// Reverses the language in place and returns the former accept states,
/// which are the start states of the reversed automaton. The result is
/// nondeterministic: a fresh initial state takes epsilon edges to them.
pub fn reverse(a: &mut Automaton) -> Vec<StateId> {
    let g = a.graph_mut();
    g.renumber();
    let accept = g.accept_states();

    let mut reversed: Vec<Vec<Transition>> = vec![Vec::new(); g.states.len()];
    for (n, s) in g.states.iter().enumerate() {
        for t in s.transitions() {
            reversed[t.to.index()].push(Transition::new(t.min, t.max, StateId::new(n)));
        }
    }
    for (s, mut ts) in g.states.iter_mut().zip(reversed) {
        ts.sort_by(Transition::cmp_min_max_then_dest);
        ts.dedup();
        s.transitions = ts;
        s.accept = false;
    }
    let old_initial = g.initial;
    g.set_accept(old_initial, true);

    let initial = g.new_state();
    g.initial = initial;
    for &s in &accept {
        g.add_epsilon(initial, s);
    }
    a.set_deterministic(false);
    accept
}

struct Frame {
    state: StateId,
    trans: usize,
    code: u32,
}

/// Every accepted string, sorted, or `None` if the language is infinite or
/// holds more than `limit` strings.
pub fn finite_strings(a: &Automaton, limit: Option<usize>) -> Option<Vec<Vec<u32>>> {
    let over = |n: usize| limit.is_some_and(|l| n > l);
    if let Some(s) = a.singleton() {
        return (!over(1)).then(|| vec![s.chars().map(u32::from).collect()]);
    }
    let mut g = trimmed_dfa(a);
    g.sort_transitions();

    let first_code = |g: &Graph, s: StateId| g.state(s).transitions().first().map_or(0, |t| t.min);
    let mut out: Vec<Vec<u32>> = Vec::new();
    if g.state(g.initial).is_accept() {
        out.push(Vec::new());
        if over(out.len()) {
            return None;
        }
    }
    let mut on_path = vec![false; g.states.len()];
    on_path[g.initial.index()] = true;
    let mut stack = vec![Frame {
        state: g.initial,
        trans: 0,
        code: first_code(&g, g.initial),
    }];
    let mut path: Vec<u32> = Vec::new();

    while let Some(top) = stack.last_mut() {
        let ts = g.state(top.state).transitions();
        if top.trans == ts.len() {
            on_path[top.state.index()] = false;
            stack.pop();
            if !stack.is_empty() {
                path.pop();
            }
            continue;
        }
        let t = ts[top.trans];
        let c = top.code;
        if c == t.max {
            top.trans += 1;
            top.code = ts.get(top.trans).map_or(0, |n| n.min);
        } else {
            top.code += 1;
        }

        if on_path[t.to.index()] {
            return None;
        }
        path.push(c);
        if g.state(t.to).is_accept() {
            out.push(path.clone());
            if over(out.len()) {
                return None;
            }
        }
        on_path[t.to.index()] = true;
        stack.push(Frame {
            state: t.to,
            trans: 0,
            code: first_code(&g, t.to),
        });
    }
    Some(out)
}
