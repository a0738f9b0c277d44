//! Property-based tests: the text round trip is lossless over generated
//! value trees, and the path language round-trips through its printed
//! form.

use jsondoc::{from_str, to_json_string, Decimal, Document, FieldPath, FieldSegment, Value};
use proptest::prelude::*;

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        any::<i8>().prop_map(Value::Byte),
        any::<i16>().prop_map(Value::Short),
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        // Finite floats only; non-finite values are unencodable.
        (-1.0e30f32..1.0e30).prop_map(Value::Float),
        (-1.0e30f64..1.0e30).prop_map(Value::Double),
        (any::<i64>(), -6i32..6).prop_map(|(unscaled, scale)| {
            Value::Decimal(Decimal::new(unscaled.into(), scale))
        }),
        // Stay inside chrono's calendar range.
        (-100_000i32..100_000).prop_map(|d| Value::Date(jsondoc::Date::new(d))),
        (0u32..86_400_000).prop_map(|ms| Value::Time(jsondoc::Time::new(ms))),
        (-10_000_000_000_000i64..10_000_000_000_000)
            .prop_map(|ms| Value::Timestamp(jsondoc::Timestamp::new(ms))),
        any::<i64>().prop_map(|ms| Value::Interval(jsondoc::Interval::new(ms))),
        any::<String>().prop_map(Value::String),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Binary),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| Value::Array(items.into())),
            proptest::collection::vec(("[a-z][a-z0-9_]{0,7}", inner), 0..6)
                .prop_map(|fields| Value::Map(fields.into_iter().collect())),
        ]
    })
}

fn document_strategy() -> impl Strategy<Value = Document> {
    proptest::collection::vec(("[a-z][a-z0-9_]{0,7}", value_strategy()), 0..8)
        .prop_map(|fields| fields.into_iter().collect())
}

fn segment_strategy() -> impl Strategy<Value = FieldSegment> {
    prop_oneof![
        "[a-zA-Z][a-zA-Z0-9_]{0,7}".prop_map(FieldSegment::name),
        // Names that force quoting on the way out.
        "[a-z.\\[\\]` ]{1,8}".prop_map(FieldSegment::quoted_name),
        (0u32..1000).prop_map(FieldSegment::index),
        Just(FieldSegment::any_index()),
    ]
}

proptest! {
    #[test]
    fn round_trip_preserves_documents(doc in document_strategy()) {
        let json = to_json_string(&Value::Map(doc.clone())).unwrap();
        let back = from_str(&json).unwrap();
        prop_assert_eq!(doc, back);
    }

    #[test]
    fn round_trip_preserves_field_order(doc in document_strategy()) {
        let back = from_str(&doc.to_json_string().unwrap()).unwrap();
        let before: Vec<_> = doc.keys().collect();
        let after: Vec<_> = back.keys().collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn scalar_kinds_survive_the_trip(value in scalar_strategy()) {
        let mut doc = Document::new();
        doc.insert("v", value.clone());
        let back = from_str(&doc.to_json_string().unwrap()).unwrap();
        let got = back.get("v").unwrap().unwrap();
        prop_assert_eq!(got.value_type(), value.value_type());
        prop_assert_eq!(got, &value);
    }

    #[test]
    fn path_print_parse_round_trip(
        first in "[a-zA-Z][a-zA-Z0-9_]{0,7}",
        rest in proptest::collection::vec(segment_strategy(), 0..5)
    ) {
        // The text form is name-rooted; an index can never lead.
        let mut segments = vec![FieldSegment::name(first)];
        segments.extend(rest);
        let path = FieldPath::from_segments(segments);
        let printed = path.as_path_string(false);
        let reparsed = FieldPath::parse(&printed).unwrap();
        prop_assert_eq!(&path, &reparsed);
        // quote_all is a rendering choice, not a different path.
        let quoted = FieldPath::parse(&path.as_path_string(true)).unwrap();
        prop_assert_eq!(&path, &quoted);
    }

    #[test]
    fn containment_is_reflexive_and_prefix_monotone(
        segments in proptest::collection::vec(segment_strategy(), 1..6)
    ) {
        let path = FieldPath::from_segments(segments.clone());
        prop_assert!(path.contains(&path));
        prop_assert!(path.is_at_or_above(&path));
        let prefix = FieldPath::from_segments(segments[..segments.len() - 1].to_vec());
        prop_assert!(prefix.contains(&path));
    }

    #[test]
    fn set_then_get_returns_the_value(
        name in "[a-z]{1,8}",
        sub in "[a-z]{1,8}",
        n in any::<i32>()
    ) {
        let mut doc = Document::new();
        let path = format!("{}.{}", name, sub);
        doc.set(path.as_str(), n).unwrap();
        prop_assert_eq!(doc.get_int(path.as_str()).unwrap(), Some(n));
    }

    #[test]
    fn numeric_coercion_agrees_with_as_casts(n in any::<i64>()) {
        let v = Value::Long(n);
        prop_assert_eq!(v.get_byte().unwrap(), n as i8);
        prop_assert_eq!(v.get_short().unwrap(), n as i16);
        prop_assert_eq!(v.get_int().unwrap(), n as i32);
        prop_assert_eq!(v.get_double().unwrap(), n as f64);
    }

    #[test]
    fn tokenizer_never_panics(input in ".*") {
        let mut t = jsondoc::JsonTokenizer::new(&input);
        for _ in 0..10_000 {
            match t.next_token() {
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }
    }

    #[test]
    fn parser_never_panics(input in ".*") {
        let _ = from_str(&input);
    }
}
