//! Field path parsing, rendering, and algebra.

use jsondoc::{Error, FieldPath, FieldSegment};

fn path(text: &str) -> FieldPath {
    FieldPath::parse(text).unwrap()
}

#[test]
fn test_parse_simple_names() {
    let p = path("a.b.c");
    assert_eq!(p.len(), 3);
    assert!(p.segments().iter().all(FieldSegment::is_name));
    assert_eq!(p.to_string(), "a.b.c");
}

#[test]
fn test_parse_indexes() {
    let p = path("a[2].b[]");
    assert_eq!(
        p.segments(),
        &[
            FieldSegment::name("a"),
            FieldSegment::index(2),
            FieldSegment::name("b"),
            FieldSegment::any_index(),
        ]
    );
    assert_eq!(p.to_string(), "a[2].b[]");
}

#[test]
fn test_parse_quoted_names() {
    let p = path("`a.b`.c");
    assert_eq!(p.len(), 2);
    assert_eq!(p.segments()[0], FieldSegment::quoted_name("a.b"));
    assert_eq!(p.to_string(), "`a.b`.c");
}

#[test]
fn test_parse_escapes_in_quoted_names() {
    let p = path(r"`a\`b`");
    assert_eq!(p.segments()[0], FieldSegment::quoted_name("a`b"));

    let p = path(r"`tab\there`");
    assert_eq!(p.segments()[0], FieldSegment::quoted_name("tab\there"));

    let p = path(r"`A`");
    assert_eq!(p.segments()[0], FieldSegment::quoted_name("A"));
}

#[test]
fn test_parse_errors() {
    for bad in ["a..b", "a.", ".a", "a[", "a[x]", "a[1", "`unterminated", "a[-1]", "[1]extra"] {
        assert!(
            matches!(FieldPath::parse(bad), Err(Error::Syntax { .. })),
            "expected a syntax error for {:?}",
            bad
        );
    }
}

#[test]
fn test_round_trip_rendering() {
    for text in ["a", "a.b[3].c", "`weird name`.x[]", "xs[0][1]"] {
        assert_eq!(path(text).to_string(), text);
    }
}

#[test]
fn test_quote_all_rendering() {
    let p = path("a.b[1]");
    assert_eq!(p.as_path_string(true), "`a`.`b`[1]");
}

#[test]
fn test_ordering_is_case_insensitive() {
    assert_eq!(path("Name.Sub"), path("name.sub"));
    assert!(path("alpha") < path("BETA"));
}

#[test]
fn test_index_sorts_before_name() {
    assert!(path("a[0]") < path("a.b"));
    assert!(path("a[]") < path("a[0]"));
}

#[test]
fn test_child_and_parent_builders() {
    let p = path("a").child_name("b").child_index(2).child_any_index();
    assert_eq!(p.to_string(), "a.b[2][]");
    assert_eq!(p.with_parent("root").to_string(), "root.a.b[2][]");
}

#[test]
fn test_is_at_or_above() {
    assert!(path("a").is_at_or_above(&path("a.b.c")));
    assert!(path("a.b").is_at_or_above(&path("a.b")));
    assert!(!path("a.b.c").is_at_or_above(&path("a.b")));
    assert!(!path("x").is_at_or_above(&path("a.b")));
    // A wildcard index covers every concrete index.
    assert!(path("a[]").is_at_or_above(&path("a[3].b")));
    assert!(path("a.b").is_at_or_below(&path("a")));
}

#[test]
fn test_contains_is_conservative_on_indexes() {
    assert!(path("a.b").contains(&path("a.b.c")));
    assert!(!path("a.b.c").contains(&path("a.b")));
    assert!(!path("a.x").contains(&path("a.y")));
    // Any index segment on either side makes the relation true.
    assert!(path("a[1]").contains(&path("a.b")));
    assert!(path("a.b").contains(&path("a[1].c")));
}

#[test]
fn test_empty_path() {
    assert!(FieldPath::EMPTY.is_empty());
    assert_eq!(FieldPath::EMPTY.to_string(), "");
    assert!(FieldPath::EMPTY.is_at_or_above(&path("a")));
}

#[test]
fn test_from_str_impl() {
    let p: FieldPath = "a.b".parse().unwrap();
    assert_eq!(p, path("a.b"));
    assert!("a..b".parse::<FieldPath>().is_err());
}

#[test]
fn test_hash_matches_equality() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(path("Name.Sub"));
    assert!(set.contains(&path("name.sub")));
    assert!(!set.contains(&path("name.other")));
}
