//! # jsondoc
//!
//! A document model and streaming codec for JSON with extended types.
//!
//! Plain JSON distinguishes five scalar kinds; real data has more. This
//! crate models documents with seventeen value kinds (sized integers,
//! decimals, dates, times, timestamps, intervals, binary) and keeps them
//! intact across a round trip through JSON text using a single-field
//! `{"$tag": payload}` convention, so `{"$date": "2024-03-15"}` reads
//! back as a DATE, not a map.
//!
//! ## Key Features
//!
//! - **Rich value model**: [`Value`] covers seventeen kinds with
//!   as-cast numeric coercion between the eight numeric ones
//! - **Order-preserving documents**: [`Document`] keeps fields in
//!   insertion order and resolves dotted [`FieldPath`]s like
//!   `"a.b[2].c"` for deep access and mutation
//! - **Event protocol**: [`DocumentReader`] and [`DocumentBuilder`]
//!   stream documents as typed event sequences, tree-backed or straight
//!   off the wire
//! - **Lossless text round trip**: extended types survive
//!   encode-then-decode with their exact kinds
//! - **No unsafe code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use jsondoc::{from_str, Document};
//!
//! let mut doc = from_str(r#"{
//!     "name": "Alice",
//!     "joined": {"$date": "2024-03-15"},
//!     "address": {"city": "Oslo"}
//! }"#).unwrap();
//!
//! assert_eq!(doc.get_string("name").unwrap(), Some("Alice"));
//! assert_eq!(doc.get_string("address.city").unwrap(), Some("Oslo"));
//! assert!(doc.get_date("joined").unwrap().is_some());
//!
//! doc.set("address.zip", "0150").unwrap();
//! let json = doc.to_json_string().unwrap();
//! let back = from_str(&json).unwrap();
//! assert_eq!(doc, back);
//! ```
//!
//! ## Dynamic Values with the doc! Macro
//!
//! ```rust
//! use jsondoc::doc;
//!
//! let value = doc!({
//!     "name": "Alice",
//!     "age": 30,
//!     "tags": ["rust", "json"]
//! });
//! let doc = value.get_map().unwrap();
//! assert_eq!(doc.get_int("age").unwrap(), Some(30));
//! ```
//!
//! ## Streaming
//!
//! [`document_stream`] reads concatenated or newline-separated documents
//! one at a time; [`JsonDocumentReader`] exposes raw events for callers
//! that never want a tree in memory.

pub mod de;
pub mod document;
pub mod dom;
pub mod error;
pub mod event;
pub mod field_path;
pub mod list;
pub mod macros;
pub mod options;
pub mod ser;
pub mod types;
pub mod value;

pub use de::{JsonDocumentReader, JsonDocumentStream, JsonToken, JsonTokenizer};
pub use document::Document;
pub use dom::DomDocumentReader;
pub use error::{Error, Result};
pub use event::{copy_reader, DocumentBuilder, DocumentReader, EventType};
pub use field_path::{FieldPath, FieldSegment, IntoPath};
pub use list::List;
pub use options::JsonOptions;
pub use ser::JsonDocumentBuilder;
pub use types::{Date, Decimal, Interval, Time, Timestamp};
pub use value::{Value, ValueType};

use std::io;

/// Parses one document from a string of tagged JSON.
///
/// The root must be a map, and nothing but whitespace may follow it.
///
/// # Examples
///
/// ```rust
/// use jsondoc::from_str;
///
/// let doc = from_str(r#"{"x": 1}"#).unwrap();
/// assert_eq!(doc.get_int("x").unwrap(), Some(1));
/// ```
///
/// # Errors
///
/// Returns an error on malformed JSON, a malformed tag payload, a
/// non-map root, or trailing content. Syntax errors carry line and
/// column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<Document> {
    let mut reader = JsonDocumentReader::new(s);
    let doc = Document::from_reader(&mut reader)?;
    reader.ensure_eof()?;
    Ok(doc)
}

/// Parses one document from an I/O stream of tagged JSON.
///
/// # Errors
///
/// Returns an error if reading fails or the text does not parse.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Document> {
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// An iterator over the documents in input holding zero or more of them.
///
/// # Examples
///
/// ```rust
/// use jsondoc::document_stream;
///
/// let docs: Result<Vec<_>, _> = document_stream(r#"{"a":1} {"b":2}"#).collect();
/// assert_eq!(docs.unwrap().len(), 2);
/// ```
pub fn document_stream(s: &str) -> JsonDocumentStream<'_> {
    JsonDocumentStream::new(s)
}

/// Renders any value as compact tagged JSON.
///
/// # Examples
///
/// ```rust
/// use jsondoc::{doc, to_json_string};
///
/// let value = doc!({ "n": 1 });
/// assert_eq!(to_json_string(&value).unwrap(), r#"{"n":1}"#);
/// ```
///
/// # Errors
///
/// Returns an error on non-finite floating point values.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_json_string(value: &Value) -> Result<String> {
    to_json_string_with_options(value, &JsonOptions::default())
}

/// Renders any value as tagged JSON with explicit options.
///
/// # Errors
///
/// Returns an error on non-finite floating point values.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_json_string_with_options(value: &Value, options: &JsonOptions) -> Result<String> {
    let mut reader = DomDocumentReader::new(value);
    let mut builder = JsonDocumentBuilder::with_options(options.clone());
    copy_reader(&mut reader, &mut builder)?;
    builder.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_kinds() {
        let input = concat!(
            r#"{"b":{"$byte":7},"s":{"$short":300},"i":12,"l":{"$long":5},"#,
            r#""f":{"$float":2.5},"d":3.25,"dec":{"$decimal":"1.20"},"#,
            r#""date":{"$date":"2024-03-15"},"time":{"$time":"10:30:00.500"},"#,
            r#""ts":{"$timestamp":"2024-03-15T10:30:00.000Z"},"#,
            r#""iv":{"$interval":500},"bin":{"$binary":"AQID"},"#,
            r#""nested":{"xs":[1,null,true]}}"#
        );
        let doc = from_str(input).unwrap();
        let json = to_json_string(&Value::Map(doc.clone())).unwrap();
        let back = from_str(&json).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn test_non_map_root_rejected() {
        assert!(from_str("[1,2]").is_err());
        assert!(from_str("5").is_err());
        assert!(from_str(r#""text""#).is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(from_str("").is_err());
        assert!(from_str("   ").is_err());
    }

    #[test]
    fn test_to_json_string_of_scalar() {
        assert_eq!(to_json_string(&Value::Int(5)).unwrap(), "5");
        assert_eq!(
            to_json_string(&Value::Long(5)).unwrap(),
            r#"{"$long":5}"#
        );
    }

    #[test]
    fn test_from_reader() {
        let cursor = std::io::Cursor::new(br#"{"x": 1}"#);
        let doc = from_reader(cursor).unwrap();
        assert_eq!(doc.get_int("x").unwrap(), Some(1));
    }

    #[test]
    fn test_document_display_round_trips() {
        let mut doc = Document::new();
        doc.set("a.b", 1).unwrap();
        doc.set("xs[0]", "first").unwrap();
        let text = doc.to_string();
        assert_eq!(from_str(&text).unwrap(), doc);
    }
}
