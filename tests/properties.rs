//! Algebraic laws checked on random regular languages over {a, b, c}.

use std::collections::BTreeSet;

use proptest::prelude::*;
use termfa::automaton::{
    complement, concatenate, intersection, make_string, make_string_union, run, run_code_points,
    same_language, union, union_all,
};
use termfa::{Automaton, ByteRunAutomaton, CharacterRunAutomaton, RegExp, Utf32ToUtf8};

fn pattern() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("a"),
        Just("b"),
        Just("c"),
        Just("."),
        Just("[ab]"),
        Just("()"),
    ]
    .prop_map(String::from);
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(x, y)| format!("({}|{})", x, y)),
            (inner.clone(), inner.clone()).prop_map(|(x, y)| format!("({}{})", x, y)),
            inner.clone().prop_map(|x| format!("({})*", x)),
            inner.clone().prop_map(|x| format!("({})?", x)),
            inner.prop_map(|x| format!("({}){{1,2}}", x)),
        ]
    })
}

fn compile(p: &str) -> Automaton {
    RegExp::new(p).unwrap().to_automaton().unwrap()
}

proptest! {
    #[test]
    fn test_union_law(x in pattern(), y in pattern(), s in "[abc]{0,6}") {
        let (a, b) = (compile(&x), compile(&y));
        let expected = a.run(&s) || b.run(&s);
        prop_assert_eq!(run(&union(a, b), &s), expected);
    }

    #[test]
    fn test_intersection_law(x in pattern(), y in pattern(), s in "[abc]{0,6}") {
        let (a, b) = (compile(&x), compile(&y));
        prop_assert_eq!(run(&intersection(&a, &b), &s), a.run(&s) && b.run(&s));
    }

    #[test]
    fn test_complement_law(x in pattern(), s in "[abc]{0,6}") {
        let a = compile(&x);
        prop_assert_eq!(run(&complement(a.clone()), &s), !a.run(&s));
    }

    #[test]
    fn test_determinize_preserves_language(x in pattern(), y in pattern(), s in "[abc]{0,6}") {
        let nfa = concatenate(union(compile(&x), compile(&y)), compile(&x));
        let mut dfa = nfa.clone();
        dfa.determinize();
        prop_assert!(dfa.is_deterministic());
        prop_assert_eq!(dfa.run(&s), nfa.run(&s));
    }

    #[test]
    fn test_minimize_preserves_language_and_shrinks(x in pattern(), y in pattern()) {
        let mut dfa = union(compile(&x), compile(&y));
        dfa.determinize();
        let mut once = dfa.clone();
        once.minimize();
        prop_assert!(same_language(&once, &dfa));
        prop_assert!(once.num_states() <= dfa.num_states());

        let mut twice = once.clone();
        twice.minimize();
        prop_assert_eq!(twice.num_states(), once.num_states());
    }

    #[test]
    fn test_run_automata_agree(x in pattern(), s in "[abc\u{e9}\u{1F600}]{0,6}") {
        let a = compile(&x);
        let expected = a.run(&s);
        prop_assert_eq!(CharacterRunAutomaton::new(a.clone()).run(&s), expected);
        prop_assert_eq!(ByteRunAutomaton::new(a.clone()).run(s.as_bytes()), expected);

        let utf8 = Utf32ToUtf8::new().convert(&a);
        prop_assert_eq!(run_code_points(&utf8, s.bytes().map(u32::from)), expected);
    }

    #[test]
    fn test_string_union_is_minimal_union(terms in prop::collection::btree_set("[abc]{1,5}", 0..12)) {
        let terms: BTreeSet<String> = terms;
        let built = make_string_union(terms.iter()).unwrap();
        let mut reference = union_all(terms.iter().map(|t| make_string(t)).collect());
        reference.minimize();
        prop_assert!(same_language(&built, &reference));
        if !terms.is_empty() {
            prop_assert_eq!(built.num_states(), reference.num_states());
        }
        for t in &terms {
            prop_assert!(built.run(t));
        }
    }
}
