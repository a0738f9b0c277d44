//! Parsed field paths: the dotted/bracketed address language for
//! navigating document trees.
//!
//! A path like ``a.b[3].`odd name` `` parses into a sequence of
//! [`FieldSegment`]s: names and array indexes. Name comparison is
//! case-insensitive; the original quoting is remembered only so the path
//! prints back the way it was written.
//!
//! ## Examples
//!
//! ```rust
//! use jsondoc::FieldPath;
//!
//! let path = FieldPath::parse("a.b[3].c").unwrap();
//! assert_eq!(path.len(), 4);
//! assert_eq!(path.to_string(), "a.b[3].c");
//!
//! // Equality ignores case and quoting.
//! let other = FieldPath::parse("A.`B`[3].C").unwrap();
//! assert_eq!(path, other);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{Error, Result};

/// One link in a field path: a map key or an array index.
///
/// `Index(None)` is the "unspecified index" written `[]`, legal only as a
/// parse or construction artifact, never as a lookup target.
#[derive(Debug, Clone)]
pub enum FieldSegment {
    Name { name: String, quoted: bool },
    Index(Option<u32>),
}

impl FieldSegment {
    pub fn name(name: impl Into<String>) -> Self {
        FieldSegment::Name {
            name: name.into(),
            quoted: false,
        }
    }

    pub fn quoted_name(name: impl Into<String>) -> Self {
        FieldSegment::Name {
            name: name.into(),
            quoted: true,
        }
    }

    pub fn index(i: u32) -> Self {
        FieldSegment::Index(Some(i))
    }

    pub fn any_index() -> Self {
        FieldSegment::Index(None)
    }

    pub fn is_name(&self) -> bool {
        matches!(self, FieldSegment::Name { .. })
    }

    pub fn is_index(&self) -> bool {
        matches!(self, FieldSegment::Index(_))
    }

    fn write(&self, f: &mut String, quote_all: bool) {
        match self {
            FieldSegment::Name { name, quoted } => {
                if *quoted || quote_all || needs_quoting(name) {
                    f.push('`');
                    for c in name.chars() {
                        match c {
                            '`' => f.push_str("\\`"),
                            '\\' => f.push_str("\\\\"),
                            '\u{8}' => f.push_str("\\b"),
                            '\u{c}' => f.push_str("\\f"),
                            '\n' => f.push_str("\\n"),
                            '\r' => f.push_str("\\r"),
                            '\t' => f.push_str("\\t"),
                            c if (c as u32) < 0x20 => {
                                f.push_str(&format!("\\u{:04x}", c as u32));
                            }
                            c => f.push(c),
                        }
                    }
                    f.push('`');
                } else {
                    f.push_str(name);
                }
            }
            FieldSegment::Index(Some(i)) => {
                f.push('[');
                f.push_str(&i.to_string());
                f.push(']');
            }
            FieldSegment::Index(None) => f.push_str("[]"),
        }
    }
}

fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || name
            .chars()
            .any(|c| matches!(c, '.' | '[' | ']' | '`' | '"' | '\\') || (c as u32) < 0x20)
}

/// Case-insensitive lexicographic comparison.
fn cmp_name(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

impl PartialEq for FieldSegment {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldSegment {}

impl PartialOrd for FieldSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldSegment {
    /// Index segments sort before name segments; an unspecified index sorts
    /// before any concrete one; names compare case-insensitively.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldSegment::Index(a), FieldSegment::Index(b)) => match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            },
            (FieldSegment::Index(_), FieldSegment::Name { .. }) => Ordering::Less,
            (FieldSegment::Name { .. }, FieldSegment::Index(_)) => Ordering::Greater,
            (FieldSegment::Name { name: a, .. }, FieldSegment::Name { name: b, .. }) => {
                cmp_name(a, b)
            }
        }
    }
}

impl Hash for FieldSegment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            FieldSegment::Name { name, .. } => {
                0u8.hash(state);
                for c in name.chars().flat_map(char::to_lowercase) {
                    c.hash(state);
                }
            }
            FieldSegment::Index(i) => {
                1u8.hash(state);
                i.hash(state);
            }
        }
    }
}

/// A parsed path into a document tree.
///
/// Paths are immutable; the builder methods return extended copies. The
/// empty path is the root sentinel, an ancestor of every path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<FieldSegment>,
}

impl FieldPath {
    /// The root sentinel: an empty path, at or above every other path.
    pub const EMPTY: FieldPath = FieldPath {
        segments: Vec::new(),
    };

    pub fn from_segments(segments: Vec<FieldSegment>) -> Self {
        FieldPath { segments }
    }

    /// Parses the dotted/bracketed text form. The empty string parses to
    /// [`FieldPath::EMPTY`].
    pub fn parse(text: &str) -> Result<Self> {
        PathParser::new(text).parse()
    }

    pub fn segments(&self) -> &[FieldSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldSegment> {
        self.segments.iter()
    }

    /// This path extended by a name segment.
    pub fn child_name(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(FieldSegment::name(name));
        FieldPath { segments }
    }

    /// This path extended by a concrete index segment.
    pub fn child_index(&self, index: u32) -> Self {
        let mut segments = self.segments.clone();
        segments.push(FieldSegment::index(index));
        FieldPath { segments }
    }

    /// This path extended by an unspecified index segment (`[]`).
    pub fn child_any_index(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.push(FieldSegment::any_index());
        FieldPath { segments }
    }

    /// This path re-rooted under a new leading name segment.
    pub fn with_parent(&self, name: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(FieldSegment::name(name));
        segments.extend(self.segments.iter().cloned());
        FieldPath { segments }
    }

    /// The text form, quoting every name segment when `quote_all` is set,
    /// otherwise only names that need it (or were originally quoted).
    pub fn as_path_string(&self, quote_all: bool) -> String {
        let mut out = String::new();
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 && seg.is_name() {
                out.push('.');
            }
            seg.write(&mut out, quote_all);
        }
        out
    }

    /// Whether `other` lies in the subtree this path names.
    ///
    /// Conservative on arrays: if a comparison position holds an index
    /// segment on either side, the whole relation is assumed true, so
    /// `a[2]` contains `a[5]`. Used to decide whether to materialize or
    /// skip a subtree during a streaming scan.
    pub fn contains(&self, other: &FieldPath) -> bool {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            if a.is_index() || b.is_index() {
                return true;
            }
            if a != b {
                return false;
            }
        }
        self.segments.len() <= other.segments.len()
    }

    /// Whether this path is an ancestor of `other` or equal to it.
    ///
    /// Exact segment match: concrete indexes must agree, but an unspecified
    /// index on this side matches any index in `other`.
    pub fn is_at_or_above(&self, other: &FieldPath) -> bool {
        if self.segments.len() > other.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(other.segments.iter())
            .all(|(a, b)| match (a, b) {
                (FieldSegment::Index(None), FieldSegment::Index(_)) => true,
                (a, b) => a == b,
            })
    }

    /// Whether this path is a descendant of `other` or equal to it.
    pub fn is_at_or_below(&self, other: &FieldPath) -> bool {
        other.is_at_or_above(self)
    }
}

impl PartialOrd for FieldPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldPath {
    /// Segment-wise comparison; a strict prefix sorts before its extensions.
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments.cmp(&other.segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_path_string(false))
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FieldPath::parse(s)
    }
}

/// Accepted by every path-taking accessor: an already-parsed [`FieldPath`]
/// (by value or reference) or path text, parsed on the way in.
pub trait IntoPath {
    fn into_path(self) -> Result<FieldPath>;
}

impl IntoPath for FieldPath {
    fn into_path(self) -> Result<FieldPath> {
        Ok(self)
    }
}

impl IntoPath for &FieldPath {
    fn into_path(self) -> Result<FieldPath> {
        Ok(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Result<FieldPath> {
        FieldPath::parse(self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Result<FieldPath> {
        FieldPath::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Result<FieldPath> {
        FieldPath::parse(&self)
    }
}

struct PathParser {
    chars: Vec<char>,
    pos: usize,
}

impl PathParser {
    fn new(text: &str) -> Self {
        PathParser {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn err(&self, msg: impl Into<String>) -> Error {
        Error::syntax(1, self.pos + 1, msg)
    }

    fn parse(mut self) -> Result<FieldPath> {
        if self.chars.is_empty() {
            return Ok(FieldPath::EMPTY);
        }
        let mut segments = vec![self.parse_name()?];
        while let Some(c) = self.next_char() {
            match c {
                '.' => segments.push(self.parse_name()?),
                '[' => segments.push(self.parse_index()?),
                c => return Err(self.err(format!("unexpected character '{}'", c))),
            }
        }
        Ok(FieldPath { segments })
    }

    fn parse_name(&mut self) -> Result<FieldSegment> {
        match self.peek() {
            Some(q @ ('"' | '`')) => {
                self.pos += 1;
                self.parse_quoted(q)
            }
            Some(_) => self.parse_bare(),
            None => Err(self.err("empty field name")),
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<FieldSegment> {
        let mut name = String::new();
        loop {
            match self.next_char() {
                None => return Err(self.err("unterminated quoted field name")),
                Some(c) if c == quote => break,
                Some('\\') => name.push(self.parse_escape()?),
                Some(c) => name.push(c),
            }
        }
        // A quoted name must end the segment.
        match self.peek() {
            None | Some('.') | Some('[') => Ok(FieldSegment::quoted_name(name)),
            Some(c) => Err(self.err(format!("unexpected character '{}' after quoted name", c))),
        }
    }

    fn parse_bare(&mut self) -> Result<FieldSegment> {
        let mut name = String::new();
        loop {
            match self.peek() {
                None | Some('.') | Some('[') => break,
                Some(']') => return Err(self.err("']' outside an index segment")),
                Some('\\') => {
                    self.pos += 1;
                    name.push(self.parse_escape()?);
                }
                Some(c) => {
                    self.pos += 1;
                    name.push(c);
                }
            }
        }
        if name.is_empty() {
            return Err(self.err("empty field name"));
        }
        Ok(FieldSegment::name(name))
    }

    fn parse_escape(&mut self) -> Result<char> {
        match self.next_char() {
            None => Err(self.err("dangling escape")),
            Some('"') => Ok('"'),
            Some('`') => Ok('`'),
            Some('\\') => Ok('\\'),
            Some('.') => Ok('.'),
            Some('[') => Ok('['),
            Some(']') => Ok(']'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let d = self
                        .next_char()
                        .and_then(|c| c.to_digit(16))
                        .ok_or_else(|| self.err("malformed unicode escape"))?;
                    code = code * 16 + d;
                }
                char::from_u32(code).ok_or_else(|| self.err("invalid unicode escape"))
            }
            Some(c) => Err(self.err(format!("invalid escape '\\{}'", c))),
        }
    }

    fn parse_index(&mut self) -> Result<FieldSegment> {
        let mut digits = String::new();
        loop {
            match self.next_char() {
                None => return Err(self.err("unterminated index segment")),
                Some(']') => break,
                Some(c) if c.is_ascii_digit() => digits.push(c),
                Some(c) => {
                    return Err(self.err(format!("invalid character '{}' in index segment", c)))
                }
            }
        }
        if digits.is_empty() {
            return Ok(FieldSegment::any_index());
        }
        digits
            .parse::<u32>()
            .map(FieldSegment::index)
            .map_err(|_| self.err(format!("index '{}' out of range", digits)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn test_parse_basic() {
        let path = p("a.b[2].c");
        assert_eq!(
            path.segments(),
            &[
                FieldSegment::name("a"),
                FieldSegment::name("b"),
                FieldSegment::index(2),
                FieldSegment::name("c"),
            ]
        );
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert_eq!(p(""), FieldPath::EMPTY);
        assert!(FieldPath::EMPTY.is_empty());
    }

    #[test]
    fn test_parse_quoted_and_escapes() {
        let path = p(r#"a.`odd.name`.b"#);
        assert_eq!(path.segments()[1], FieldSegment::name("odd.name"));

        let escaped = p(r"a\.b");
        assert_eq!(escaped.len(), 1);
        assert_eq!(escaped.segments()[0], FieldSegment::name("a.b"));

        let unicode = p(r#""tab\there""#);
        assert_eq!(unicode.segments()[0], FieldSegment::name("tab\there"));

        assert_eq!(
            p(r#""snow☃man""#).segments()[0],
            FieldSegment::name("snow\u{2603}man")
        );
    }

    #[test]
    fn test_parse_unspecified_index() {
        let path = p("a[]");
        assert_eq!(path.segments()[1], FieldSegment::any_index());
    }

    #[test]
    fn test_parse_errors() {
        assert!(FieldPath::parse("a.`oops").is_err());
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse("a.").is_err());
        assert!(FieldPath::parse("a[x]").is_err());
        assert!(FieldPath::parse("a[1").is_err());
        assert!(FieldPath::parse("a]b").is_err());
        assert!(FieldPath::parse(r"a\qb").is_err());
        assert!(FieldPath::parse(r#""bad\uZZZZ""#).is_err());
        assert!(FieldPath::parse("a[99999999999]").is_err());
    }

    #[test]
    fn test_print_round_trip() {
        for s in ["a.b[3].c", "a[]", "x", "a.`need quoting.here`[0]"] {
            let path = p(s);
            assert_eq!(FieldPath::parse(&path.to_string()).unwrap(), path);
        }
        // A name with structural characters prints quoted.
        let odd = FieldPath::EMPTY.child_name("we.ird[1]");
        assert_eq!(FieldPath::parse(&odd.to_string()).unwrap(), odd);
    }

    #[test]
    fn test_quote_all() {
        let path = p("a.b[1]");
        assert_eq!(path.as_path_string(true), "`a`.`b`[1]");
        assert_eq!(path.as_path_string(false), "a.b[1]");
    }

    #[test]
    fn test_case_insensitive_equality() {
        assert_eq!(p("a.Foo"), p("A.foo"));
        assert_eq!(p("`a`"), p("a"));
        assert!(p("a[1]") != p("a[2]"));
        assert!(p("a") != p("a.b"));
    }

    #[test]
    fn test_ordering() {
        assert!(p("a") < p("a.b"));
        assert!(p("a.b") < p("a.c"));
        // Index precedence: indexes sort before names.
        assert!(p("a[5]") < p("a.b"));
        assert!(p("a[]") < p("a[0]"));
        assert_eq!(p("a.B").cmp(&p("A.b")), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_contains() {
        assert!(p("a.b").contains(&p("a.b.c")));
        assert!(p("a.b").contains(&p("a.b")));
        assert!(!p("a.b.c").contains(&p("a.b")));
        assert!(!p("a.x").contains(&p("a.y")));
        // Conservative index policy.
        assert!(p("a[2]").contains(&p("a[5]")));
        assert!(p("a[2].x").contains(&p("a[5].y")));
    }

    #[test]
    fn test_at_or_above_below() {
        assert!(FieldPath::EMPTY.is_at_or_above(&p("a.b[2]")));
        assert!(p("a").is_at_or_above(&p("a.b")));
        assert!(p("a.b").is_at_or_above(&p("a.b")));
        assert!(!p("a.b").is_at_or_above(&p("a")));
        assert!(p("a[2]").is_at_or_above(&p("a[2].x")));
        assert!(!p("a[2]").is_at_or_above(&p("a[3].x")));
        assert!(p("a[]").is_at_or_above(&p("a[3]")));
        assert!(p("a.b.c").is_at_or_below(&p("a.b")));
    }

    #[test]
    fn test_builders() {
        let path = FieldPath::EMPTY
            .child_name("a")
            .child_index(2)
            .child_name("c");
        assert_eq!(path, p("a[2].c"));
        assert_eq!(path.with_parent("root"), p("root.a[2].c"));
        assert_eq!(p("b").child_any_index(), p("b[]"));
    }
}
