/// Builds a [`Value`](crate::Value) tree from JSON-like syntax.
///
/// Maps become [`Document`](crate::Document)s and preserve the written
/// field order; any other expression goes through `Value::from`, so the
/// extended scalar types work too.
///
/// ```rust
/// use jsondoc::{doc, Date, Value};
///
/// let value = doc!({
///     "name": "Alice",
///     "joined": (Date::parse("2024-03-15").unwrap()),
///     "scores": [1, 2, 3],
/// });
/// assert!(value.is_map());
/// ```
#[macro_export]
macro_rules! doc {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Boolean(true)
    };

    (false) => {
        $crate::Value::Boolean(false)
    };

    ([]) => {
        $crate::Value::Array($crate::List::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array($crate::List::from(vec![$($crate::doc!($elem)),*]))
    };

    ({}) => {
        $crate::Value::Map($crate::Document::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut document = $crate::Document::new();
        $(
            document.insert($key.to_string(), $crate::doc!($value));
        )*
        $crate::Value::Map(document)
    }};

    // Fallback for any expression, the extended scalars included.
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Date, Document, Value};

    #[test]
    fn test_doc_macro_primitives() {
        assert_eq!(doc!(null), Value::Null);
        assert_eq!(doc!(true), Value::Boolean(true));
        assert_eq!(doc!(false), Value::Boolean(false));
        assert_eq!(doc!(42), Value::Int(42));
        assert_eq!(doc!(3.5), Value::Double(3.5));
        assert_eq!(doc!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_doc_macro_arrays() {
        assert_eq!(doc!([]), Value::Array(crate::List::new()));

        let arr = doc!([1, "two", null]);
        match arr {
            Value::Array(list) => {
                assert_eq!(list.len(), 3);
                assert_eq!(list[0], Value::Int(1));
                assert_eq!(list[1], Value::String("two".to_string()));
                assert_eq!(list[2], Value::Null);
            }
            _ => panic!("expected an array"),
        }
    }

    #[test]
    fn test_doc_macro_maps() {
        assert_eq!(doc!({}), Value::Map(Document::new()));

        let value = doc!({
            "name": "Alice",
            "age": 30,
            "tags": ["a", "b"]
        });

        let doc = value.get_map().unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get_string("name").unwrap(), Some("Alice"));
        assert_eq!(doc.get_int("age").unwrap(), Some(30));
        assert_eq!(
            doc.keys().collect::<Vec<_>>(),
            vec!["name", "age", "tags"]
        );
    }

    #[test]
    fn test_doc_macro_extended_scalars() {
        let date = Date::parse("2024-03-15").unwrap();
        let value = doc!({ "d": (date) });
        let doc = value.get_map().unwrap();
        assert_eq!(doc.get_date("d").unwrap(), Some(date));
    }

    #[test]
    fn test_doc_macro_nesting() {
        let value = doc!({
            "outer": {
                "inner": [true, { "deep": 1 }]
            }
        });
        let doc = value.get_map().unwrap();
        assert_eq!(doc.get_int("outer.inner[1].deep").unwrap(), Some(1));
    }
}
