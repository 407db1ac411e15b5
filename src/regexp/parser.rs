//! Recursive-descent parser for the automaton regexp syntax.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! union      ::= inter ( '|' inter )*
//! inter      ::= concat ( '&' concat )*           [INTERSECTION]
//! concat     ::= repeat repeat*
//! repeat     ::= compl ( '?' | '*' | '+' | '{n}' | '{n,}' | '{n,m}' )*
//! compl      ::= '~'* charclass                    [COMPLEMENT]
//! charclass  ::= '[' '^'? ( char | char '-' char )+ ']' | simple
//! simple     ::= '.' | '#' [EMPTY] | '@' [ANYSTRING] | '"' chars '"'
//!              | '(' ')' | '(' union ')'
//!              | '<' name '>' [AUTOMATON] | '<' n '-' m '>' [INTERVAL]
//!              | char
//! char       ::= '\'? any
//! ```
//!
//! Positions in errors are byte offsets into the pattern.

use std::fmt;

use super::SyntaxFlags;
use crate::error::{AutomatonError, Result};

/// A parsed regular expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Union(Box<Node>, Box<Node>),
    Concatenation(Box<Node>, Box<Node>),
    Intersection(Box<Node>, Box<Node>),
    Optional(Box<Node>),
    Repeat(Box<Node>),
    RepeatMin(Box<Node>, u32),
    RepeatMinMax(Box<Node>, u32, u32),
    Complement(Box<Node>),
    Char(char),
    CharRange(char, char),
    AnyChar,
    Empty,
    String(String),
    AnyString,
    Automaton(String),
    Interval { min: u32, max: u32, digits: usize },
}

impl Node {
    fn literal(&self) -> Option<String> {
        match self {
            Node::Char(c) => Some(c.to_string()),
            Node::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Concatenation that merges adjacent literals into one string.
    fn concatenation(e1: Node, e2: Node) -> Node {
        if let (Some(a), Some(b)) = (e1.literal(), e2.literal()) {
            return Node::String(a + &b);
        }
        match (e1, e2) {
            (Node::Concatenation(x, y), e2) if y.literal().is_some() && e2.literal().is_some() => {
                Node::Concatenation(x, Box::new(Node::concatenation(*y, e2)))
            }
            (e1, Node::Concatenation(x, y)) if e1.literal().is_some() && x.literal().is_some() => {
                Node::Concatenation(Box::new(Node::concatenation(e1, *x)), y)
            }
            (e1, e2) => Node::Concatenation(Box::new(e1), Box::new(e2)),
        }
    }
}

/// Folds `first, rest..` into a right-leaning chain.
fn fold_right(first: Node, rest: Vec<Node>, combine: impl Fn(Node, Node) -> Node) -> Node {
    let mut all = rest;
    all.insert(0, first);
    let mut iter = all.into_iter().rev();
    match iter.next() {
        Some(last) => iter.fold(last, |acc, e| combine(e, acc)),
        None => Node::String(String::new()),
    }
}

/// Parser state: the pattern and a byte cursor into it.
pub(crate) struct Parser<'a> {
    pattern: &'a str,
    pos: usize,
    flags: SyntaxFlags,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(pattern: &'a str, flags: SyntaxFlags) -> Self {
        Parser {
            pattern,
            pos: 0,
            flags,
        }
    }

    /// Parses the whole pattern. The empty pattern is the empty string.
    pub(crate) fn parse(mut self) -> Result<Node> {
        if self.pattern.is_empty() {
            return Ok(Node::String(String::new()));
        }
        let e = self.parse_union()?;
        if self.more() {
            return Err(self.error("end-of-string expected", self.pos));
        }
        Ok(e)
    }

    fn error(&self, message: &str, position: usize) -> AutomatonError {
        AutomatonError::Syntax {
            message: message.to_string(),
            position,
        }
    }

    #[inline]
    fn more(&self) -> bool {
        self.pos < self.pattern.len()
    }

    #[inline]
    fn current(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    fn peek(&self, set: &str) -> bool {
        self.current().is_some_and(|c| set.contains(c))
    }

    fn match_char(&mut self, c: char) -> bool {
        if self.current() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn next(&mut self) -> Result<char> {
        let c = self
            .current()
            .ok_or_else(|| self.error("unexpected end-of-string", self.pos))?;
        self.pos += c.len_utf8();
        Ok(c)
    }

    #[inline]
    fn check(&self, flag: SyntaxFlags) -> bool {
        self.flags.contains(flag)
    }

    fn parse_union(&mut self) -> Result<Node> {
        let first = self.parse_inter()?;
        let mut rest = Vec::new();
        while self.match_char('|') {
            rest.push(self.parse_inter()?);
        }
        Ok(fold_right(first, rest, |a, b| Node::Union(Box::new(a), Box::new(b))))
    }

    fn parse_inter(&mut self) -> Result<Node> {
        let first = self.parse_concat()?;
        let mut rest = Vec::new();
        while self.check(SyntaxFlags::INTERSECTION) && self.match_char('&') {
            rest.push(self.parse_concat()?);
        }
        Ok(fold_right(first, rest, |a, b| Node::Intersection(Box::new(a), Box::new(b))))
    }

    fn parse_concat(&mut self) -> Result<Node> {
        let first = self.parse_repeat()?;
        let mut rest = Vec::new();
        while self.more()
            && !self.peek(")|")
            && !(self.check(SyntaxFlags::INTERSECTION) && self.peek("&"))
        {
            rest.push(self.parse_repeat()?);
        }
        Ok(fold_right(first, rest, Node::concatenation))
    }

    fn parse_repeat(&mut self) -> Result<Node> {
        let mut e = self.parse_complement()?;
        while self.peek("?*+{") {
            if self.match_char('?') {
                e = Node::Optional(Box::new(e));
            } else if self.match_char('*') {
                e = Node::Repeat(Box::new(e));
            } else if self.match_char('+') {
                e = Node::RepeatMin(Box::new(e), 1);
            } else if self.match_char('{') {
                let n = self
                    .parse_integer()?
                    .ok_or_else(|| self.error("integer expected", self.pos))?;
                let m = if self.match_char(',') {
                    self.parse_integer()?
                } else {
                    Some(n)
                };
                if !self.match_char('}') {
                    return Err(self.error("expected '}'", self.pos));
                }
                e = match m {
                    None => Node::RepeatMin(Box::new(e), n),
                    Some(m) => Node::RepeatMinMax(Box::new(e), n, m),
                };
            }
        }
        Ok(e)
    }

    /// Decimal digits at the cursor, if any.
    fn parse_integer(&mut self) -> Result<Option<u32>> {
        let start = self.pos;
        while self.peek("0123456789") {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        self.pattern[start..self.pos]
            .parse()
            .map(Some)
            .map_err(|_| self.error("integer out of range", start))
    }

    fn parse_complement(&mut self) -> Result<Node> {
        let mut depth = 0;
        while self.check(SyntaxFlags::COMPLEMENT) && self.match_char('~') {
            depth += 1;
        }
        let mut e = self.parse_char_class_exp()?;
        for _ in 0..depth {
            e = Node::Complement(Box::new(e));
        }
        Ok(e)
    }

    fn parse_char_class_exp(&mut self) -> Result<Node> {
        if !self.match_char('[') {
            return self.parse_simple();
        }
        let negate = self.match_char('^');
        let mut e = self.parse_char_class()?;
        while self.more() && !self.peek("]") {
            e = Node::Union(Box::new(e), Box::new(self.parse_char_class()?));
        }
        if negate {
            e = Node::Intersection(
                Box::new(Node::AnyChar),
                Box::new(Node::Complement(Box::new(e))),
            );
        }
        if !self.match_char(']') {
            return Err(self.error("expected ']'", self.pos));
        }
        Ok(e)
    }

    fn parse_char_class(&mut self) -> Result<Node> {
        let c = self.parse_char()?;
        if !self.match_char('-') {
            return Ok(Node::Char(c));
        }
        let to = self.parse_char()?;
        if c > to {
            return Err(AutomatonError::InvalidRange {
                from: u32::from(c),
                to: u32::from(to),
            });
        }
        Ok(Node::CharRange(c, to))
    }

    fn parse_simple(&mut self) -> Result<Node> {
        if self.match_char('.') {
            return Ok(Node::AnyChar);
        }
        if self.check(SyntaxFlags::EMPTY) && self.match_char('#') {
            return Ok(Node::Empty);
        }
        if self.check(SyntaxFlags::ANYSTRING) && self.match_char('@') {
            return Ok(Node::AnyString);
        }
        if self.match_char('"') {
            let start = self.pos;
            while self.more() && !self.peek("\"") {
                self.next()?;
            }
            let end = self.pos;
            if !self.match_char('"') {
                return Err(self.error("expected '\"'", self.pos));
            }
            return Ok(Node::String(self.pattern[start..end].to_string()));
        }
        if self.match_char('(') {
            if self.match_char(')') {
                return Ok(Node::String(String::new()));
            }
            let e = self.parse_union()?;
            if !self.match_char(')') {
                return Err(self.error("expected ')'", self.pos));
            }
            return Ok(e);
        }
        if (self.check(SyntaxFlags::AUTOMATON) || self.check(SyntaxFlags::INTERVAL))
            && self.match_char('<')
        {
            return self.parse_angle();
        }
        Ok(Node::Char(self.parse_char()?))
    }

    /// `<name>` or `<min-max>`, cursor just past the `<`.
    fn parse_angle(&mut self) -> Result<Node> {
        let start = self.pos;
        while self.more() && !self.peek(">") {
            self.next()?;
        }
        let end = self.pos;
        if !self.match_char('>') {
            return Err(self.error("expected '>'", self.pos));
        }
        let body = &self.pattern[start..end];
        let Some(i) = body.find('-') else {
            if !self.check(SyntaxFlags::AUTOMATON) {
                return Err(self.error("interval syntax error", end));
            }
            return Ok(Node::Automaton(body.to_string()));
        };
        if !self.check(SyntaxFlags::INTERVAL) {
            return Err(self.error("illegal identifier", end));
        }
        if i == 0 || i == body.len() - 1 || body.rfind('-') != Some(i) {
            return Err(self.error("interval syntax error", end));
        }
        let (smin, smax) = (&body[..i], &body[i + 1..]);
        let (Ok(mut min), Ok(mut max)) = (smin.parse::<u32>(), smax.parse::<u32>()) else {
            return Err(self.error("interval syntax error", end));
        };
        let digits = if smin.len() == smax.len() { smin.len() } else { 0 };
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Ok(Node::Interval { min, max, digits })
    }

    fn parse_char(&mut self) -> Result<char> {
        self.match_char('\\');
        self.next()
    }
}

fn write_padded(f: &mut fmt::Formatter<'_>, n: u32, digits: usize) -> fmt::Result {
    write!(f, "{:0>width$}", n, width = digits)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Union(a, b) => write!(f, "({}|{})", a, b),
            Node::Concatenation(a, b) => write!(f, "{}{}", a, b),
            Node::Intersection(a, b) => write!(f, "({}&{})", a, b),
            Node::Optional(a) => write!(f, "({})?", a),
            Node::Repeat(a) => write!(f, "({})*", a),
            Node::RepeatMin(a, min) => write!(f, "({}){{{},}}", a, min),
            Node::RepeatMinMax(a, min, max) => write!(f, "({}){{{},{}}}", a, min, max),
            Node::Complement(a) => write!(f, "~({})", a),
            Node::Char(c) => write!(f, "\\{}", c),
            Node::CharRange(from, to) => write!(f, "[\\{}-\\{}]", from, to),
            Node::AnyChar => f.write_str("."),
            Node::Empty => f.write_str("#"),
            Node::String(s) => write!(f, "\"{}\"", s),
            Node::AnyString => f.write_str("@"),
            Node::Automaton(name) => write!(f, "<{}>", name),
            Node::Interval { min, max, digits } => {
                f.write_str("<")?;
                write_padded(f, *min, *digits)?;
                f.write_str("-")?;
                write_padded(f, *max, *digits)?;
                f.write_str(">")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Node> {
        Parser::new(s, SyntaxFlags::all()).parse()
    }

    fn syntax_error(s: &str) -> (String, usize) {
        match parse(s) {
            Err(AutomatonError::Syntax { message, position }) => (message, position),
            other => panic!("expected syntax error for {:?}, got {:?}", s, other),
        }
    }

    #[test]
    fn test_adjacent_literals_fold_into_string() {
        assert_eq!(parse("abc").unwrap(), Node::String("abc".into()));
        assert_eq!(parse("\"ab\"c").unwrap(), Node::String("abc".into()));
        assert_eq!(
            parse("ab*").unwrap(),
            Node::Concatenation(
                Box::new(Node::Char('a')),
                Box::new(Node::Repeat(Box::new(Node::Char('b'))))
            )
        );
        assert_eq!(
            parse("a.bc").unwrap(),
            Node::Concatenation(
                Box::new(Node::Char('a')),
                Box::new(Node::Concatenation(
                    Box::new(Node::AnyChar),
                    Box::new(Node::String("bc".into()))
                ))
            )
        );
    }

    #[test]
    fn test_union_is_right_leaning() {
        assert_eq!(
            parse("a|b|c").unwrap(),
            Node::Union(
                Box::new(Node::Char('a')),
                Box::new(Node::Union(Box::new(Node::Char('b')), Box::new(Node::Char('c'))))
            )
        );
    }

    #[test]
    fn test_repeat_forms() {
        assert_eq!(parse("a{2}").unwrap(), Node::RepeatMinMax(Box::new(Node::Char('a')), 2, 2));
        assert_eq!(parse("a{2,}").unwrap(), Node::RepeatMin(Box::new(Node::Char('a')), 2));
        assert_eq!(parse("a{2,5}").unwrap(), Node::RepeatMinMax(Box::new(Node::Char('a')), 2, 5));
        assert_eq!(parse("a+").unwrap(), Node::RepeatMin(Box::new(Node::Char('a')), 1));
        assert_eq!(
            parse("a?*").unwrap(),
            Node::Repeat(Box::new(Node::Optional(Box::new(Node::Char('a')))))
        );
    }

    #[test]
    fn test_char_classes() {
        assert_eq!(parse("[a-c]").unwrap(), Node::CharRange('a', 'c'));
        assert_eq!(
            parse("[^a]").unwrap(),
            Node::Intersection(
                Box::new(Node::AnyChar),
                Box::new(Node::Complement(Box::new(Node::Char('a'))))
            )
        );
        assert_eq!(
            parse("[ab-d]").unwrap(),
            Node::Union(Box::new(Node::Char('a')), Box::new(Node::CharRange('b', 'd')))
        );
        assert_eq!(parse("[\\]]").unwrap(), Node::Char(']'));
    }

    #[test]
    fn test_flags_gate_operators() {
        let none = |s: &str| Parser::new(s, SyntaxFlags::empty()).parse().unwrap();
        assert_eq!(none("#"), Node::Char('#'));
        assert_eq!(none("@"), Node::Char('@'));
        assert_eq!(none("a&b"), Node::String("a&b".into()));
        assert_eq!(none("~a"), Node::String("~a".into()));
        assert_eq!(parse("~a").unwrap(), Node::Complement(Box::new(Node::Char('a'))));
    }

    #[test]
    fn test_angle_brackets() {
        assert_eq!(parse("<name>").unwrap(), Node::Automaton("name".into()));
        assert_eq!(
            parse("<10-5>").unwrap(),
            Node::Interval {
                min: 5,
                max: 10,
                digits: 0
            }
        );
        assert_eq!(
            parse("<007-120>").unwrap(),
            Node::Interval {
                min: 7,
                max: 120,
                digits: 3
            }
        );
        let interval_only = SyntaxFlags::INTERVAL;
        assert!(matches!(
            Parser::new("<name>", interval_only).parse(),
            Err(AutomatonError::Syntax { .. })
        ));
        assert_eq!(syntax_error("<1-2-3>"), ("interval syntax error".to_string(), 6));
        assert_eq!(syntax_error("<-3>"), ("interval syntax error".to_string(), 3));
    }

    #[test]
    fn test_empty_forms() {
        assert_eq!(parse("").unwrap(), Node::String(String::new()));
        assert_eq!(parse("()").unwrap(), Node::String(String::new()));
        assert_eq!(parse("\"\"").unwrap(), Node::String(String::new()));
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(syntax_error("a)"), ("end-of-string expected".to_string(), 1));
        assert_eq!(syntax_error("(a"), ("expected ')'".to_string(), 2));
        assert_eq!(syntax_error("a{x}"), ("integer expected".to_string(), 2));
        assert_eq!(syntax_error("a{2"), ("expected '}'".to_string(), 3));
        assert_eq!(syntax_error("[ab"), ("expected ']'".to_string(), 3));
        assert_eq!(syntax_error("\"ab"), ("expected '\"'".to_string(), 3));
        assert_eq!(syntax_error("a|"), ("unexpected end-of-string".to_string(), 2));
        assert_eq!(syntax_error("\u{e9}\u{e9})"), ("end-of-string expected".to_string(), 4));
    }

    #[test]
    fn test_reversed_range_is_an_error() {
        assert_eq!(
            parse("[z-a]"),
            Err(AutomatonError::InvalidRange {
                from: 'z' as u32,
                to: 'a' as u32
            })
        );
    }

    #[test]
    fn test_display() {
        let cases = [
            ("ab|c", "(\"ab\"|\\c)"),
            ("a*", "(\\a)*"),
            ("a{2,}", "(\\a){2,}"),
            ("a{1,3}", "(\\a){1,3}"),
            ("[a-z]", "[\\a-\\z]"),
            ("~a&.", "(~(\\a)&.)"),
            ("#@", "#@"),
            ("<id>", "<id>"),
            ("<1-10>", "<1-10>"),
            ("<01-10>", "<01-10>"),
        ];
        for (pattern, printed) in cases {
            assert_eq!(parse(pattern).unwrap().to_string(), printed, "{}", pattern);
        }
    }
}
