//! Regular expressions compiled to automata.
//!
//! The syntax is the classic automaton regexp language rather than a
//! Perl-style one: there are no anchors, captures or lazy quantifiers, and
//! a pattern always matches whole strings. Beyond the usual operators,
//! [`SyntaxFlags`] enable:
//!
//! - `&` intersection and `~` complement
//! - `#` the empty language and `@` any string
//! - `<name>` a named automaton supplied by an [`AutomatonProvider`]
//! - `<n-m>` a decimal numeric interval
//!
//! `\` escapes any character, and `"..."` quotes a literal string.

mod parser;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;

use bitflags::bitflags;
use log::debug;

use crate::automaton::{
    complement, concatenate_all, intersection, make_any_char, make_any_string, make_char,
    make_char_range, make_empty, make_interval, make_string, optional, repeat, repeat_min,
    repeat_range, union_all, Automaton,
};
use crate::error::{AutomatonError, Result};

pub use parser::Node;
use parser::Parser;

bitflags! {
    /// Optional regexp operators.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyntaxFlags: u32 {
        /// `&`
        const INTERSECTION = 0x0001;
        /// `~`
        const COMPLEMENT = 0x0002;
        /// `#`
        const EMPTY = 0x0004;
        /// `@`
        const ANYSTRING = 0x0008;
        /// `<name>`
        const AUTOMATON = 0x0010;
        /// `<n-m>`
        const INTERVAL = 0x0020;
    }
}

impl Default for SyntaxFlags {
    fn default() -> Self {
        SyntaxFlags::all()
    }
}

/// Source of the automata referenced as `<name>`.
pub trait AutomatonProvider {
    fn automaton(&self, name: &str) -> Option<Automaton>;
}

impl<S: BuildHasher> AutomatonProvider for HashMap<String, Automaton, S> {
    fn automaton(&self, name: &str) -> Option<Automaton> {
        self.get(name).cloned()
    }
}

/// A parsed regular expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegExp {
    pattern: String,
    flags: SyntaxFlags,
    root: Node,
}

impl RegExp {
    /// Parses `pattern` with every optional operator enabled.
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_flags(pattern, SyntaxFlags::all())
    }

    pub fn with_flags(pattern: &str, flags: SyntaxFlags) -> Result<Self> {
        let root = Parser::new(pattern, flags).parse()?;
        Ok(RegExp {
            pattern: pattern.to_string(),
            flags,
            root,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> SyntaxFlags {
        self.flags
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Compiles to a minimal deterministic automaton. Fails with
    /// [`AutomatonError::UnknownAutomaton`] if the pattern names one.
    pub fn to_automaton(&self) -> Result<Automaton> {
        self.compile(None)
    }

    /// Compiles, resolving `<name>` through `provider`.
    pub fn to_automaton_with(&self, provider: &dyn AutomatonProvider) -> Result<Automaton> {
        self.compile(Some(provider))
    }

    fn compile(&self, provider: Option<&dyn AutomatonProvider>) -> Result<Automaton> {
        let a = compile(&self.root, provider)?;
        debug!("regexp {:?}: {} states", self.pattern, a.num_states());
        Ok(a)
    }

    /// Names of every `<name>` the pattern refers to.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Union(a, b) | Node::Concatenation(a, b) | Node::Intersection(a, b) => {
                    stack.push(a);
                    stack.push(b);
                }
                Node::Optional(a)
                | Node::Repeat(a)
                | Node::RepeatMin(a, _)
                | Node::RepeatMinMax(a, _, _)
                | Node::Complement(a) => stack.push(a),
                Node::Automaton(name) => {
                    names.insert(name.clone());
                }
                _ => {}
            }
        }
        names
    }
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

impl FromStr for RegExp {
    type Err = AutomatonError;

    fn from_str(s: &str) -> Result<Self> {
        RegExp::new(s)
    }
}

/// Operands of a chain of `Union` or `Concatenation` nodes, left to right.
fn flatten<'a>(node: &'a Node, union: bool) -> Vec<&'a Node> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        match n {
            Node::Union(a, b) if union => {
                stack.push(b);
                stack.push(a);
            }
            Node::Concatenation(a, b) if !union => {
                stack.push(b);
                stack.push(a);
            }
            _ => out.push(n),
        }
    }
    out
}

fn minimized(mut a: Automaton) -> Automaton {
    a.minimize();
    a
}

fn compile(node: &Node, provider: Option<&dyn AutomatonProvider>) -> Result<Automaton> {
    let a = match node {
        Node::Union(..) => {
            let parts = flatten(node, true)
                .into_iter()
                .map(|n| compile(n, provider))
                .collect::<Result<Vec<_>>>()?;
            minimized(union_all(parts))
        }
        Node::Concatenation(..) => {
            let parts = flatten(node, false)
                .into_iter()
                .map(|n| compile(n, provider))
                .collect::<Result<Vec<_>>>()?;
            minimized(concatenate_all(parts))
        }
        Node::Intersection(a, b) => {
            let (a, b) = (compile(a, provider)?, compile(b, provider)?);
            minimized(intersection(&a, &b))
        }
        Node::Optional(a) => minimized(optional(compile(a, provider)?)),
        Node::Repeat(a) => minimized(repeat(compile(a, provider)?)),
        Node::RepeatMin(a, min) => minimized(repeat_min(compile(a, provider)?, *min)),
        Node::RepeatMinMax(a, min, max) => {
            minimized(repeat_range(compile(a, provider)?, *min, *max))
        }
        Node::Complement(a) => minimized(complement(compile(a, provider)?)),
        Node::Char(c) => make_char(u32::from(*c)),
        Node::CharRange(from, to) => make_char_range(u32::from(*from), u32::from(*to)),
        Node::AnyChar => make_any_char(),
        Node::Empty => make_empty(),
        Node::String(s) => make_string(s),
        Node::AnyString => make_any_string(),
        Node::Automaton(name) => provider
            .and_then(|p| p.automaton(name))
            .ok_or_else(|| AutomatonError::UnknownAutomaton(name.clone()))?,
        Node::Interval { min, max, digits } => make_interval(*min, *max, *digits)?,
    };
    Ok(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{finite_strings, is_finite, CharacterRunAutomaton};

    fn matcher(pattern: &str) -> CharacterRunAutomaton {
        CharacterRunAutomaton::new(RegExp::new(pattern).unwrap().to_automaton().unwrap())
    }

    #[test]
    fn test_alternation_of_strings() {
        let a = RegExp::new("ab|cd").unwrap().to_automaton().unwrap();
        let strings = finite_strings(&a, None).unwrap();
        let expected: Vec<Vec<u32>> = ["ab", "cd"]
            .iter()
            .map(|s| s.chars().map(u32::from).collect())
            .collect();
        assert_eq!(strings, expected);
        for s in ["a", "abcd", ""] {
            assert!(!a.run(s), "{}", s);
        }
    }

    #[test]
    fn test_operators() {
        let cases: &[(&str, &[&str], &[&str])] = &[
            ("a*b", &["b", "ab", "aaab"], &["", "a", "ba"]),
            ("a+", &["a", "aa"], &[""]),
            ("(ab)?c", &["c", "abc"], &["ac", "ababc"]),
            ("a{2,3}", &["aa", "aaa"], &["a", "aaaa"]),
            ("a{2}", &["aa"], &["a", "aaa"]),
            ("a{2,}", &["aa", "aaaaa"], &["a"]),
            ("[a-c]x", &["ax", "cx"], &["dx", "x"]),
            ("[^a-c]", &["d", "\u{1F600}"], &["a", "", "dd"]),
            (".", &["\u{10FFFF}", "z"], &["", "zz"]),
            ("\\.\\*", &[".*"], &["a*"]),
            ("\"a|b\"", &["a|b"], &["a", "b"]),
            ("()", &[""], &["a"]),
            ("", &[""], &["a"]),
        ];
        for (pattern, accepted, rejected) in cases {
            let m = matcher(pattern);
            for s in *accepted {
                assert!(m.run(s), "{} should accept {:?}", pattern, s);
            }
            for s in *rejected {
                assert!(!m.run(s), "{} should reject {:?}", pattern, s);
            }
        }
    }

    #[test]
    fn test_intersection_and_complement() {
        let m = matcher("[a-z]*&~(.*x.*)");
        assert!(m.run("abc"));
        assert!(m.run(""));
        assert!(!m.run("abx"));
        assert!(!m.run("AB"));

        let none = matcher("a&b");
        assert!(!none.run("a"));
        assert!(!none.run("b"));
    }

    #[test]
    fn test_empty_and_any_string() {
        let empty = RegExp::new("#").unwrap().to_automaton().unwrap();
        assert!(crate::automaton::is_empty(&empty));
        let any = RegExp::new("@").unwrap().to_automaton().unwrap();
        assert!(crate::automaton::is_total(&any));
        assert!(matcher("ab@").run("abzzz"));
    }

    #[test]
    fn test_interval() {
        let m = matcher("<7-123>");
        assert!(m.run("7"));
        assert!(m.run("007"));
        assert!(m.run("123"));
        assert!(!m.run("124"));

        let padded = matcher("<05-15>");
        assert!(padded.run("05"));
        assert!(!padded.run("5"));
        assert!(padded.run("15"));
    }

    #[test]
    fn test_named_automata() {
        let re = RegExp::new("<greeting> <name>").unwrap();
        assert_eq!(
            re.identifiers().into_iter().collect::<Vec<_>>(),
            vec!["greeting".to_string(), "name".to_string()]
        );
        assert_eq!(
            re.to_automaton(),
            Err(AutomatonError::UnknownAutomaton("greeting".into()))
        );

        let mut provider = HashMap::new();
        provider.insert("greeting".to_string(), RegExp::new("hi|hello").unwrap().to_automaton().unwrap());
        provider.insert("name".to_string(), make_string("bob"));
        let a = re.to_automaton_with(&provider).unwrap();
        assert!(a.run("hi bob"));
        assert!(a.run("hello bob"));
        assert!(!a.run("hey bob"));
        assert!(is_finite(&a));
    }

    #[test]
    fn test_flags_change_meaning() {
        let plain = RegExp::with_flags("a&b|~c", SyntaxFlags::empty()).unwrap();
        assert_eq!(plain.flags(), SyntaxFlags::empty());
        let a = plain.to_automaton().unwrap();
        assert!(a.run("a&b"));
        assert!(a.run("~c"));
        assert!(!a.run("a"));
    }

    #[test]
    fn test_results_are_minimal_and_deterministic() {
        let a = RegExp::new("(a|b)*abb").unwrap().to_automaton().unwrap();
        assert!(a.is_deterministic());
        let mut again = a.clone();
        again.minimize();
        assert_eq!(a.num_states(), again.num_states());
        assert_eq!(a.num_states(), 4);
    }

    #[test]
    fn test_display_reparses_to_same_language() {
        for pattern in ["ab|c*", "[a-f]{1,3}&~(abc)", "<01-20>x", "\"q\"+#|@"] {
            let re: RegExp = pattern.parse().unwrap();
            let printed = re.to_string();
            let back = RegExp::new(&printed).unwrap();
            assert_eq!(
                re.to_automaton().unwrap(),
                back.to_automaton().unwrap(),
                "{} printed as {}",
                pattern,
                printed
            );
        }
    }

    #[test]
    fn test_errors_surface() {
        assert_eq!(
            "a(".parse::<RegExp>().unwrap_err(),
            AutomatonError::Syntax {
                message: "unexpected end-of-string".into(),
                position: 2
            }
        );
        assert!(matches!(
            RegExp::new("<9-99999999999>"),
            Err(AutomatonError::Syntax { .. })
        ));
        assert!(matches!(
            RegExp::new("<1-100000>").unwrap().to_automaton_with(&HashMap::<String, Automaton>::new()),
            Ok(_)
        ));
    }
}
