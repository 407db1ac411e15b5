use super::*;

fn chars(s: &str) -> Vec<u32> {
    s.chars().map(u32::from).collect()
}

#[test]
fn test_build_normalize_compile() {
    // (foo|bar)baz*
    let a = concatenate(
        union(make_string("foo"), make_string("bar")),
        concatenate(make_string("ba"), repeat(make_char('z' as u32))),
    );
    let mut m = a.clone();
    m.minimize();
    assert!(m == a);

    let run = CharacterRunAutomaton::new(m);
    for s in ["fooba", "barbaz", "foobazzz"] {
        assert!(run.run(s), "{}", s);
    }
    for s in ["foo", "bazz", "barba z"] {
        assert!(!run.run(s), "{}", s);
    }
}

#[test]
fn test_manual_graph_api() {
    let mut a = Automaton::new();
    let s0 = a.initial_state();
    let s1 = a.create_state();
    let s2 = a.create_state();
    a.set_accept(s2, true);
    a.add_transition(s0, 'a' as u32, 'c' as u32, s1);
    a.add_transition(s1, 'x' as u32, 'x' as u32, s2);
    assert!(a.is_deterministic());

    // overlapping interval from s0 makes it nondeterministic
    a.add_transition(s0, 'b' as u32, 'b' as u32, s2);
    assert!(!a.is_deterministic());
    assert!(a.run("ax"));
    assert!(a.run("b"));
    assert!(!a.run("a"));

    a.determinize();
    assert!(a.is_deterministic());
    assert!(a.run("bx"));
    assert!(a.run("b"));
}

#[test]
fn test_add_epsilon_copies_accept_and_transitions() {
    let mut a = Automaton::new();
    let s0 = a.initial_state();
    let s1 = a.create_state();
    let s2 = a.create_state();
    a.set_accept(s1, true);
    a.add_transition(s1, 'q' as u32, 'q' as u32, s2);
    a.set_accept(s2, true);
    a.add_epsilon(s0, s1);
    assert!(a.run(""));
    assert!(a.run("q"));
    assert!(!a.is_deterministic());
}

#[test]
fn test_numbered_states_are_breadth_first() {
    let mut a = union(make_string("ab"), make_string("c"));
    a.determinize();
    let states = a.numbered_states().len();
    assert_eq!(states, a.num_states());
    let sorted = a.sorted_transitions();
    // initial state: a and c, sorted by interval
    assert_eq!(sorted[0].len(), 2);
    assert!(sorted[0][0].min < sorted[0][1].min);
}

#[test]
fn test_accept_and_live_states() {
    let mut a = Automaton::new();
    let s0 = a.initial_state();
    let dead = a.create_state();
    let fin = a.create_state();
    a.set_accept(fin, true);
    a.add_transition(s0, 'a' as u32, 'a' as u32, fin);
    a.add_transition(s0, 'b' as u32, 'b' as u32, dead);
    assert_eq!(a.accept_states().len(), 1);
    assert_eq!(a.live_states().len(), 2);

    a.remove_dead_transitions();
    assert_eq!(a.num_states(), 2);
    assert_eq!(a.num_transitions(), 1);
}

#[test]
fn test_totalize_covers_alphabet() {
    let mut a = make_char_range('a' as u32, 'f' as u32);
    a.totalize();
    for s in a.numbered_states() {
        let mut covered: u64 = 0;
        for t in s.transitions() {
            covered += u64::from(t.max - t.min) + 1;
        }
        assert_eq!(covered, u64::from(MAX_CODE_POINT) + 1);
    }
}

#[test]
fn test_start_points() {
    let mut a = union(make_char_range(10, 20), make_char(15));
    assert_eq!(a.start_points(), vec![0, 10, 15, 16, 21]);
}

#[test]
fn test_display_and_dot() {
    let s = make_string("ab");
    assert_eq!(s.to_string(), "singleton: ab");

    let mut g = make_string("ab");
    g.expand_singleton();
    assert_eq!(
        g.to_string(),
        "initial state: 0\nstate 0 [reject]:\n  a -> 1\nstate 1 [reject]:\n  b -> 2\nstate 2 [accept]:\n"
    );

    let dot = g.to_dot();
    assert!(dot.starts_with("digraph Automaton {"));
    assert!(dot.contains("2 [shape=doublecircle"));
    assert!(dot.contains("0 -> 1 [label=\"a\"]"));
}

#[test]
fn test_equality_is_language_equality() {
    let a = union(make_string("ab"), make_string("ac"));
    let b = concatenate(make_string("a"), make_char_range('b' as u32, 'c' as u32));
    assert!(a == b);
    assert!(a != make_string("ab"));
    assert!(make_empty() == Automaton::default());
}

#[test]
fn test_string_union_equals_minimized_union() {
    let terms = ["car", "card", "care", "cart", "dart"];
    let built = make_string_union(terms).unwrap();
    let mut unioned = union_all(terms.iter().map(|t| make_string(t)).collect());
    unioned.minimize();
    assert!(built == unioned);
    assert_eq!(built.num_states(), unioned.num_states());
}

#[test]
fn test_finite_strings_of_string_union() {
    let terms = ["a", "ab", "b\u{e9}"];
    let a = make_string_union(terms).unwrap();
    assert!(is_finite(&a));
    let strings = finite_strings(&a, None).unwrap();
    assert_eq!(strings, terms.iter().map(|t| chars(t)).collect::<Vec<_>>());
}

#[test]
fn test_byte_and_char_run_agree() {
    let a = concatenate(
        repeat(union(make_char_range('a' as u32, 'z' as u32), make_char_range(0x3B1, 0x3C9))),
        make_string("\u{1F600}"),
    );
    let chars_run = CharacterRunAutomaton::new(a.clone());
    let bytes_run = ByteRunAutomaton::new(a);
    for s in ["\u{1F600}", "ab\u{3b2}\u{1F600}", "ab", "A\u{1F600}", "\u{3ca}\u{1F600}"] {
        assert_eq!(chars_run.run(s), bytes_run.run(s.as_bytes()), "{}", s);
    }
}

#[test]
fn test_complement_of_complement() {
    let a = union(make_string("x"), repeat(make_string("yz")));
    let back = complement(complement(a.clone()));
    assert!(back == a);
}

#[test]
fn test_minimize_then_determinize_is_stable() {
    let mut a = repeat_range(make_char_range('0' as u32, '9' as u32), 2, 4);
    a.minimize();
    let states = a.num_states();
    a.determinize();
    assert_eq!(a.num_states(), states);
    assert!(a.run("12"));
    assert!(a.run("1234"));
    assert!(!a.run("1"));
    assert!(!a.run("12345"));
}

#[test]
fn test_interval_compiles() {
    let run = CharacterRunAutomaton::new(make_interval(7, 123, 0).unwrap());
    for n in 0..200u32 {
        assert_eq!(run.run(&n.to_string()), (7..=123).contains(&n), "{}", n);
    }
    assert!(run.run("0042"));
}

#[test]
fn test_add_transition_clamps_out_of_range_bounds() {
    let mut a = Automaton::new();
    let s0 = a.initial_state();
    let s1 = a.create_state();
    a.set_accept(s1, true);
    a.add_transition(s0, 'a' as u32, u32::MAX, s1);
    assert_eq!(a.sorted_transitions()[0][0].max, MAX_CODE_POINT);

    a.totalize();
    assert!(a.run("\u{10FFFF}"));
    let mut m = a.clone();
    m.minimize();
    assert!(m == a);
    assert!(m.run("b"));
    assert!(!m.run("A"));
}
