//! Hopcroft DFA minimization.
//!
//! The automaton is determinized and totalized first, so every state has a
//! successor for every alphabet class (the sorted start points). Blocks
//! start as {accepting, rejecting} and are refined against (block, class)
//! splitters from a pending queue. When a block splits, the smaller half
//! with respect to each class is queued, which keeps the total work at
//! O(n log n).
//!
//! Per (block, class) the states of the block that have predecessors on
//! that class are kept in intrusive doubly-linked lists over flat arrays,
//! so moving a state between blocks is O(1) per class.

use std::collections::VecDeque;

use log::{debug, trace};

use super::graph::Automaton;
use super::state::{State, StateId, Transition, MAX_CODE_POINT, MIN_CODE_POINT};

const NIL: u32 = u32::MAX;

/// Minimizes in place. Singletons are already minimal.
pub fn minimize(a: &mut Automaton) {
    if !a.is_singleton() {
        minimize_hopcroft(a);
    }
}

/// Active lists: for each (block, class) the member states that have at
/// least one predecessor on that class. Nodes are (state, class) pairs.
struct ActiveLists {
    sigma: usize,
    first: Vec<u32>,
    size: Vec<u32>,
    prev: Vec<u32>,
    next: Vec<u32>,
    owner: Vec<u32>,
}

impl ActiveLists {
    fn new(blocks: usize, states: usize, sigma: usize) -> Self {
        ActiveLists {
            sigma,
            first: vec![NIL; blocks * sigma],
            size: vec![0; blocks * sigma],
            prev: vec![NIL; states * sigma],
            next: vec![NIL; states * sigma],
            owner: vec![NIL; states * sigma],
        }
    }

    #[inline]
    fn size(&self, block: u32, class: usize) -> u32 {
        self.size[block as usize * self.sigma + class]
    }

    #[inline]
    fn owner(&self, state: u32, class: usize) -> u32 {
        self.owner[state as usize * self.sigma + class]
    }

    fn push(&mut self, block: u32, class: usize, state: u32) {
        let list = block as usize * self.sigma + class;
        let node = state as usize * self.sigma + class;
        let head = self.first[list];
        self.prev[node] = NIL;
        self.next[node] = head;
        if head != NIL {
            self.prev[head as usize] = node as u32;
        }
        self.first[list] = node as u32;
        self.owner[node] = block;
        self.size[list] += 1;
    }

    fn remove(&mut self, state: u32, class: usize) {
        let node = state as usize * self.sigma + class;
        let list = self.owner[node] as usize * self.sigma + class;
        let (p, n) = (self.prev[node], self.next[node]);
        if p == NIL {
            self.first[list] = n;
        } else {
            self.next[p as usize] = n;
        }
        if n != NIL {
            self.prev[n as usize] = p;
        }
        self.size[list] -= 1;
        self.owner[node] = NIL;
    }

    /// Member states of the (block, class) list.
    fn members(&self, block: u32, class: usize) -> impl Iterator<Item = u32> + '_ {
        let sigma = self.sigma;
        let mut node = self.first[block as usize * sigma + class];
        std::iter::from_fn(move || {
            if node == NIL {
                return None;
            }
            let state = node / sigma as u32;
            node = self.next[node as usize];
            Some(state)
        })
    }
}

pub fn minimize_hopcroft(a: &mut Automaton) {
    a.determinize();
    {
        let g = a.graph_mut();
        let init = g.state(g.initial);
        if let [t] = init.transitions() {
            if t.to == g.initial && t.min == MIN_CODE_POINT && t.max == MAX_CODE_POINT {
                return;
            }
        }
    }
    a.totalize();
    let g = a.graph_mut();
    g.sort_transitions();
    let sigma = g.start_points();
    let states = &g.states;
    let n = states.len();
    let sigma_len = sigma.len();
    let before = n;

    // Successor per (state, class). Transitions are sorted and cover the
    // whole alphabet after totalizing.
    let mut succ = vec![0u32; n * sigma_len];
    for (q, s) in states.iter().enumerate() {
        let ts = s.transitions();
        let mut ti = 0;
        for (x, &c) in sigma.iter().enumerate() {
            while ti < ts.len() && ts[ti].max < c {
                ti += 1;
            }
            debug_assert!(ti < ts.len() && ts[ti].contains(c), "not total at {}", c);
            succ[q * sigma_len + x] = ts[ti].to.0;
        }
    }

    // Reverse edges per (destination, class), compressed rows.
    let mut rev_start = vec![0u32; n * sigma_len + 1];
    for q in 0..n {
        for x in 0..sigma_len {
            rev_start[succ[q * sigma_len + x] as usize * sigma_len + x + 1] += 1;
        }
    }
    for i in 1..rev_start.len() {
        rev_start[i] += rev_start[i - 1];
    }
    let mut rev_fill = rev_start.clone();
    let mut rev_items = vec![0u32; n * sigma_len];
    for q in 0..n {
        for x in 0..sigma_len {
            let row = succ[q * sigma_len + x] as usize * sigma_len + x;
            rev_items[rev_fill[row] as usize] = q as u32;
            rev_fill[row] += 1;
        }
    }
    let reverse = |q: u32, x: usize| {
        let row = q as usize * sigma_len + x;
        &rev_items[rev_start[row] as usize..rev_start[row + 1] as usize]
    };

    // One of the two initial blocks may be empty, so block ids can reach n.
    let max_blocks = n + 2;
    let mut block = vec![0u32; n];
    let mut block_size = vec![0u32; max_blocks];
    let mut active = ActiveLists::new(max_blocks, n, sigma_len);
    for (q, s) in states.iter().enumerate() {
        let j = if s.accept { 0 } else { 1 };
        block[q] = j;
        block_size[j as usize] += 1;
    }
    for q in 0..n {
        for x in 0..sigma_len {
            if !reverse(q as u32, x).is_empty() {
                active.push(block[q], x, q as u32);
            }
        }
    }

    let mut pending: VecDeque<(u32, usize)> = VecDeque::new();
    let mut pending2 = vec![false; sigma_len * max_blocks];
    for x in 0..sigma_len {
        let j = if active.size(0, x) <= active.size(1, x) { 0 } else { 1 };
        pending.push_back((j, x));
        pending2[x * max_blocks + j as usize] = true;
    }

    let mut split = vec![false; n];
    let mut refine2 = vec![false; max_blocks];
    let mut refine: Vec<u32> = Vec::new();
    let mut split_block: Vec<Vec<u32>> = vec![Vec::new(); max_blocks];
    let mut k: u32 = 2;

    while let Some((p, x)) = pending.pop_front() {
        pending2[x * max_blocks + p as usize] = false;

        // states with a successor in block p on class x
        for m in active.members(p, x) {
            for &s in reverse(m, x) {
                if !split[s as usize] {
                    split[s as usize] = true;
                    let j = block[s as usize];
                    split_block[j as usize].push(s);
                    if !refine2[j as usize] {
                        refine2[j as usize] = true;
                        refine.push(j);
                    }
                }
            }
        }

        for j in refine.drain(..) {
            let sb = std::mem::take(&mut split_block[j as usize]);
            if (sb.len() as u32) < block_size[j as usize] {
                for &s in &sb {
                    block_size[j as usize] -= 1;
                    block_size[k as usize] += 1;
                    block[s as usize] = k;
                    for c in 0..sigma_len {
                        if active.owner(s, c) == j {
                            active.remove(s, c);
                            active.push(k, c, s);
                        }
                    }
                }
                for c in 0..sigma_len {
                    let aj = active.size(j, c);
                    let ak = active.size(k, c);
                    let ofs = c * max_blocks;
                    if !pending2[ofs + j as usize] && 0 < aj && aj <= ak {
                        pending2[ofs + j as usize] = true;
                        pending.push_back((j, c));
                    } else {
                        pending2[ofs + k as usize] = true;
                        pending.push_back((k, c));
                    }
                }
                trace!("minimize: split block {} into {}", j, k);
                k += 1;
            }
            refine2[j as usize] = false;
            for &s in &sb {
                split[s as usize] = false;
            }
            let mut sb = sb;
            sb.clear();
            split_block[j as usize] = sb;
        }
    }

    // One state per block, using any member as representative.
    let blocks = k as usize;
    let mut representative = vec![NIL; blocks];
    for q in 0..n {
        representative[block[q] as usize] = q as u32;
    }
    let mut minimized: Vec<State> = vec![State::new(); blocks];
    for (b, &rep) in representative.iter().enumerate() {
        if rep == NIL {
            continue;
        }
        let src = &states[rep as usize];
        let dst = &mut minimized[b];
        dst.accept = src.accept;
        dst.transitions = src
            .transitions()
            .iter()
            .map(|t| Transition::new(t.min, t.max, StateId(block[t.to.index()])))
            .collect();
    }
    let initial = StateId(block[g.initial.index()]);
    g.states = minimized;
    g.initial = initial;
    g.numbered = false;
    g.remove_dead_transitions();
    debug!("minimize: {} states -> {} states", before, g.reachable().len());
}

#[cfg(test)]
mod tests {
    use super::super::basic_automata::{make_any_string, make_char_range, make_string};
    use super::super::basic_operations::{concatenate, repeat, union};
    use super::*;

    fn ab_star_abb() -> Automaton {
        let ab = make_char_range('a' as u32, 'b' as u32);
        concatenate(repeat(ab), make_string("abb"))
    }

    #[test]
    fn test_minimize_classic_example() {
        let mut a = ab_star_abb();
        let before = a.clone();
        minimize(&mut a);
        assert_eq!(a.num_states(), 4);
        assert!(a.is_deterministic());
        assert!(a == before);
        assert!(a.run("abb"));
        assert!(a.run("babb"));
        assert!(!a.run("ab"));
    }

    #[test]
    fn test_minimize_is_idempotent() {
        let mut a = union(ab_star_abb(), make_string("b"));
        minimize(&mut a);
        let once = a.num_states();
        minimize(&mut a);
        assert_eq!(a.num_states(), once);
    }

    #[test]
    fn test_minimize_merges_equivalent_branches() {
        // "ax|bx" needs 3 states: start, middle, accept
        let mut a = union(make_string("ax"), make_string("bx"));
        minimize(&mut a);
        assert_eq!(a.num_states(), 3);
    }

    #[test]
    fn test_minimize_total_and_empty() {
        let mut any = make_any_string();
        minimize(&mut any);
        assert_eq!(any.num_states(), 1);

        let mut empty = Automaton::new();
        minimize(&mut empty);
        assert_eq!(empty.num_states(), 1);
        assert!(!empty.run(""));
    }

    #[test]
    fn test_minimize_keeps_singletons() {
        let mut s = make_string("abc");
        minimize(&mut s);
        assert_eq!(s.singleton(), Some("abc"));
    }
}
