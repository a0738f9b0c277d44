//! Tagged-JSON encoding.
//!
//! [`JsonDocumentBuilder`] is the [`DocumentBuilder`] that renders an
//! event sequence as JSON text. Extended types are written with the
//! `{"$tag": payload}` convention so a later read reconstructs the exact
//! kinds; tags can be switched off for interoperability at the cost of
//! that fidelity.
//!
//! ## Usage
//!
//! ```rust
//! use jsondoc::{DocumentBuilder, JsonDocumentBuilder, Value};
//!
//! let mut builder = JsonDocumentBuilder::new();
//! builder.add_new_map().unwrap();
//! builder.put("name", &Value::from("Alice")).unwrap();
//! builder.put_long("visits", 5).unwrap();
//! builder.end_map().unwrap();
//!
//! let json = builder.into_string().unwrap();
//! assert_eq!(json, r#"{"name":"Alice","visits":{"$long":5}}"#);
//! ```

use std::fmt;

use base64ct::{Base64, Encoding};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::event::DocumentBuilder;
use crate::options::JsonOptions;
use crate::types::{Date, Decimal, Interval, Time, Timestamp};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    Map,
    Array,
}

struct Ctx {
    kind: Container,
    count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BuildState {
    Start,
    Running,
    Closed,
}

/// A [`DocumentBuilder`] that renders tagged JSON into a string.
///
/// Single-use: once the root value is complete the builder is closed, and
/// the text is taken with [`into_string`](Self::into_string) or parsed
/// back with [`get_document`](Self::get_document).
pub struct JsonDocumentBuilder {
    buffer: String,
    options: JsonOptions,
    stack: Vec<Ctx>,
    state: BuildState,
    root_is_map: bool,
    check_context: bool,
}

impl Default for JsonDocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonDocumentBuilder {
    pub fn new() -> Self {
        Self::with_options(JsonOptions::default())
    }

    pub fn with_options(options: JsonOptions) -> Self {
        JsonDocumentBuilder {
            buffer: String::with_capacity(256),
            options,
            stack: Vec::new(),
            state: BuildState::Start,
            root_is_map: false,
            check_context: true,
        }
    }

    /// Disables the map/array context checks. The caller then guarantees a
    /// well-formed event sequence; violations produce garbage output
    /// instead of errors.
    pub fn set_check_context(&mut self, check: bool) {
        self.check_context = check;
    }

    /// The finished JSON text. Fails unless the root value is complete.
    pub fn into_string(self) -> Result<String> {
        if self.state != BuildState::Closed {
            return Err(Error::illegal_state("document is not complete"));
        }
        Ok(self.buffer)
    }

    /// Parses the finished text back into a [`Document`]. Fails unless the
    /// root value is a complete map.
    pub fn get_document(&self) -> Result<Document> {
        if self.state != BuildState::Closed {
            return Err(Error::illegal_state("document is not complete"));
        }
        if !self.root_is_map {
            return Err(Error::illegal_state("root value is not a map"));
        }
        crate::from_str(&self.buffer)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == BuildState::Closed {
            Err(Error::illegal_state("builder used after the root value closed"))
        } else {
            Ok(())
        }
    }

    fn in_map(&self) -> Result<()> {
        if !self.check_context {
            return Ok(());
        }
        match self.stack.last() {
            Some(ctx) if ctx.kind == Container::Map => Ok(()),
            _ => Err(Error::illegal_state("put is valid only inside a map")),
        }
    }

    fn in_array_or_root(&self) -> Result<()> {
        if !self.check_context {
            return Ok(());
        }
        match self.stack.last() {
            Some(ctx) if ctx.kind == Container::Array => Ok(()),
            Some(_) => Err(Error::illegal_state(
                "add is valid only inside an array or at the root",
            )),
            None => Ok(()),
        }
    }

    fn newline_indent(&mut self, depth: usize) {
        self.buffer.push('\n');
        for _ in 0..depth * self.options.indent {
            self.buffer.push(' ');
        }
    }

    /// Separator and field name before a value inside the current map.
    fn field_prelude(&mut self, field: &str) {
        let depth = self.stack.len();
        if let Some(ctx) = self.stack.last_mut() {
            if ctx.count > 0 {
                self.buffer.push(',');
            }
            ctx.count += 1;
        }
        if self.options.pretty {
            self.newline_indent(depth);
        }
        write_escaped(&mut self.buffer, field);
        self.buffer.push(':');
        if self.options.pretty {
            self.buffer.push(' ');
        }
    }

    /// Separator before a value inside the current array, or nothing at
    /// the root.
    fn element_prelude(&mut self) {
        let depth = self.stack.len();
        if let Some(ctx) = self.stack.last_mut() {
            if ctx.count > 0 {
                self.buffer.push(',');
            }
            ctx.count += 1;
            if self.options.pretty {
                self.newline_indent(depth);
            }
        }
    }

    fn open(&mut self, kind: Container) {
        if self.state == BuildState::Start {
            self.state = BuildState::Running;
            self.root_is_map = kind == Container::Map;
        }
        self.buffer.push(match kind {
            Container::Map => '{',
            Container::Array => '[',
        });
        self.stack.push(Ctx { kind, count: 0 });
    }

    fn close(&mut self, expected: Container) -> Result<()> {
        self.ensure_open()?;
        match self.stack.pop() {
            Some(ctx) if ctx.kind == expected => {
                if self.options.pretty && ctx.count > 0 {
                    self.newline_indent(self.stack.len());
                }
                self.buffer.push(match expected {
                    Container::Map => '}',
                    Container::Array => ']',
                });
                if self.stack.is_empty() {
                    self.state = BuildState::Closed;
                }
                Ok(())
            }
            Some(ctx) => {
                self.stack.push(ctx);
                Err(Error::illegal_state("mismatched container close"))
            }
            None => Err(Error::illegal_state("no open container")),
        }
    }

    fn finish_value(&mut self) {
        if self.stack.is_empty() {
            self.state = BuildState::Closed;
        } else {
            self.state = BuildState::Running;
        }
    }

    /// Renders `value` in place, containers included. `depth` is the
    /// pretty-print nesting level of the value itself.
    fn write_value(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Null => self.buffer.push_str("null"),
            Value::Boolean(b) => self.buffer.push_str(if *b { "true" } else { "false" }),
            Value::String(s) => write_escaped(&mut self.buffer, s),
            Value::Int(i) => self.buffer.push_str(&i.to_string()),
            Value::Double(d) => {
                if !d.is_finite() {
                    return Err(Error::encoding("non-finite double"));
                }
                push_float_text(&mut self.buffer, *d, d.abs());
            }
            Value::Byte(b) => self.tagged_raw("$byte", &b.to_string()),
            Value::Short(s) => self.tagged_raw("$short", &s.to_string()),
            Value::Long(l) => self.tagged_raw("$long", &l.to_string()),
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(Error::encoding("non-finite float"));
                }
                let mut text = String::new();
                push_float_text(&mut text, *f, f.abs() as f64);
                if self.options.with_tags {
                    self.tagged_raw_always("$float", &text);
                } else {
                    self.buffer.push_str(&text);
                }
            }
            Value::Decimal(d) => {
                if self.options.with_tags {
                    self.tagged_string("$decimal", &d.to_string());
                } else {
                    self.buffer.push_str(&d.to_string());
                }
            }
            Value::Date(d) => self.tagged_string_or_plain("$date", &d.to_string()),
            Value::Time(t) => self.tagged_string_or_plain("$time", &t.to_string()),
            Value::Timestamp(ts) => self.tagged_string_or_plain("$timestamp", &ts.to_string()),
            Value::Interval(iv) => self.tagged_raw("$interval", &iv.millis().to_string()),
            Value::Binary(bytes) => {
                let encoded = Base64::encode_string(bytes);
                if self.options.with_tags {
                    self.tagged_string("$binary", &encoded);
                } else {
                    write_escaped(&mut self.buffer, &encoded);
                }
            }
            Value::Map(doc) => {
                self.buffer.push('{');
                let mut first = true;
                for (name, field_value) in doc.iter() {
                    if !first {
                        self.buffer.push(',');
                    }
                    first = false;
                    if self.options.pretty {
                        self.newline_indent(depth + 1);
                    }
                    write_escaped(&mut self.buffer, name);
                    self.buffer.push(':');
                    if self.options.pretty {
                        self.buffer.push(' ');
                    }
                    self.write_value(field_value, depth + 1)?;
                }
                if self.options.pretty && !first {
                    self.newline_indent(depth);
                }
                self.buffer.push('}');
            }
            Value::Array(list) => {
                self.buffer.push('[');
                let mut first = true;
                for item in list.iter() {
                    if !first {
                        self.buffer.push(',');
                    }
                    first = false;
                    if self.options.pretty {
                        self.newline_indent(depth + 1);
                    }
                    self.write_value(item, depth + 1)?;
                }
                if self.options.pretty && !first {
                    self.newline_indent(depth);
                }
                self.buffer.push(']');
            }
        }
        Ok(())
    }

    // Tag objects are always compact, pretty mode included.

    fn tagged_raw(&mut self, tag: &str, raw: &str) {
        if self.options.with_tags {
            self.tagged_raw_always(tag, raw);
        } else {
            self.buffer.push_str(raw);
        }
    }

    fn tagged_raw_always(&mut self, tag: &str, raw: &str) {
        self.buffer.push_str("{\"");
        self.buffer.push_str(tag);
        self.buffer.push_str("\":");
        self.buffer.push_str(raw);
        self.buffer.push('}');
    }

    fn tagged_string(&mut self, tag: &str, text: &str) {
        self.buffer.push_str("{\"");
        self.buffer.push_str(tag);
        self.buffer.push_str("\":");
        write_escaped(&mut self.buffer, text);
        self.buffer.push('}');
    }

    fn tagged_string_or_plain(&mut self, tag: &str, text: &str) {
        if self.options.with_tags {
            self.tagged_string(tag, text);
        } else {
            write_escaped(&mut self.buffer, text);
        }
    }

    // Typed convenience methods over the trait surface.

    pub fn put_boolean(&mut self, field: &str, value: bool) -> Result<()> {
        self.put(field, &Value::Boolean(value))
    }

    pub fn put_string(&mut self, field: &str, value: &str) -> Result<()> {
        self.put(field, &Value::String(value.to_string()))
    }

    pub fn put_byte(&mut self, field: &str, value: i8) -> Result<()> {
        self.put(field, &Value::Byte(value))
    }

    pub fn put_short(&mut self, field: &str, value: i16) -> Result<()> {
        self.put(field, &Value::Short(value))
    }

    pub fn put_int(&mut self, field: &str, value: i32) -> Result<()> {
        self.put(field, &Value::Int(value))
    }

    pub fn put_long(&mut self, field: &str, value: i64) -> Result<()> {
        self.put(field, &Value::Long(value))
    }

    pub fn put_float(&mut self, field: &str, value: f32) -> Result<()> {
        self.put(field, &Value::Float(value))
    }

    pub fn put_double(&mut self, field: &str, value: f64) -> Result<()> {
        self.put(field, &Value::Double(value))
    }

    pub fn put_decimal(&mut self, field: &str, value: Decimal) -> Result<()> {
        self.put(field, &Value::Decimal(value))
    }

    pub fn put_date(&mut self, field: &str, value: Date) -> Result<()> {
        self.put(field, &Value::Date(value))
    }

    pub fn put_time(&mut self, field: &str, value: Time) -> Result<()> {
        self.put(field, &Value::Time(value))
    }

    pub fn put_timestamp(&mut self, field: &str, value: Timestamp) -> Result<()> {
        self.put(field, &Value::Timestamp(value))
    }

    pub fn put_interval(&mut self, field: &str, value: Interval) -> Result<()> {
        self.put(field, &Value::Interval(value))
    }

    pub fn put_binary(&mut self, field: &str, value: &[u8]) -> Result<()> {
        self.put(field, &Value::Binary(value.to_vec()))
    }

    pub fn add_boolean(&mut self, value: bool) -> Result<()> {
        self.add(&Value::Boolean(value))
    }

    pub fn add_string(&mut self, value: &str) -> Result<()> {
        self.add(&Value::String(value.to_string()))
    }

    pub fn add_long(&mut self, value: i64) -> Result<()> {
        self.add(&Value::Long(value))
    }

    pub fn add_double(&mut self, value: f64) -> Result<()> {
        self.add(&Value::Double(value))
    }
}

impl DocumentBuilder for JsonDocumentBuilder {
    fn add_new_map(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.in_array_or_root()?;
        self.element_prelude();
        if self.state == BuildState::Start && self.stack.is_empty() {
            self.open(Container::Map);
        } else {
            self.state = BuildState::Running;
            self.buffer.push('{');
            self.stack.push(Ctx {
                kind: Container::Map,
                count: 0,
            });
        }
        Ok(())
    }

    fn put_new_map(&mut self, field: &str) -> Result<()> {
        self.ensure_open()?;
        self.in_map()?;
        self.field_prelude(field);
        self.buffer.push('{');
        self.stack.push(Ctx {
            kind: Container::Map,
            count: 0,
        });
        Ok(())
    }

    fn put_new_array(&mut self, field: &str) -> Result<()> {
        self.ensure_open()?;
        self.in_map()?;
        self.field_prelude(field);
        self.buffer.push('[');
        self.stack.push(Ctx {
            kind: Container::Array,
            count: 0,
        });
        Ok(())
    }

    fn add_new_array(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.in_array_or_root()?;
        self.element_prelude();
        if self.state == BuildState::Start && self.stack.is_empty() {
            self.open(Container::Array);
        } else {
            self.state = BuildState::Running;
            self.buffer.push('[');
            self.stack.push(Ctx {
                kind: Container::Array,
                count: 0,
            });
        }
        Ok(())
    }

    fn end_map(&mut self) -> Result<()> {
        self.close(Container::Map)
    }

    fn end_array(&mut self) -> Result<()> {
        self.close(Container::Array)
    }

    fn put(&mut self, field: &str, value: &Value) -> Result<()> {
        self.ensure_open()?;
        self.in_map()?;
        self.field_prelude(field);
        let depth = self.stack.len();
        self.write_value(value, depth)
    }

    fn add(&mut self, value: &Value) -> Result<()> {
        self.ensure_open()?;
        self.in_array_or_root()?;
        self.element_prelude();
        if self.stack.is_empty() {
            self.root_is_map = value.is_map();
        }
        let depth = self.stack.len();
        self.write_value(value, depth)?;
        if self.stack.is_empty() {
            self.finish_value();
        }
        Ok(())
    }
}

/// Appends `s` as a JSON string literal, quotes included.
fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Appends a finite float keeping it lexically floating point, so a later
/// read does not demote it to an integer kind. `Display` for floats never
/// uses exponent notation, so extreme magnitudes switch to `{:e}` instead
/// of spelling out hundreds of digits.
fn push_float_text(out: &mut String, value: impl fmt::Display + fmt::LowerExp, magnitude: f64) {
    if magnitude >= 1e21 || (magnitude > 0.0 && magnitude < 1e-6) {
        out.push_str(&format!("{:e}", value));
        return;
    }
    let text = value.to_string();
    out.push_str(&text);
    if !text.contains(['.', 'e', 'E']) {
        out.push_str(".0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_map() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        b.put_string("name", "Alice").unwrap();
        b.put_int("age", 30).unwrap();
        b.put_boolean("active", true).unwrap();
        b.put_null("note").unwrap();
        b.end_map().unwrap();
        assert_eq!(
            b.into_string().unwrap(),
            r#"{"name":"Alice","age":30,"active":true,"note":null}"#
        );
    }

    #[test]
    fn test_nested_containers() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        b.put_new_map("inner").unwrap();
        b.put_int("x", 1).unwrap();
        b.end_map().unwrap();
        b.put_new_array("xs").unwrap();
        b.add_long(5).unwrap();
        b.add_string("two").unwrap();
        b.end_array().unwrap();
        b.end_map().unwrap();
        assert_eq!(
            b.into_string().unwrap(),
            r#"{"inner":{"x":1},"xs":[{"$long":5},"two"]}"#
        );
    }

    #[test]
    fn test_extended_types_are_tagged() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        b.put_byte("b", 7).unwrap();
        b.put_short("s", 300).unwrap();
        b.put_long("l", 5).unwrap();
        b.put_float("f", 2.5).unwrap();
        b.put_decimal("dec", "123.450".parse().unwrap()).unwrap();
        b.put_date("d", Date::parse("2024-03-15").unwrap()).unwrap();
        b.put_interval("iv", Interval::from_parts(2, 0, 0, 0, 0)).unwrap();
        b.put_binary("bin", &[1, 2, 3]).unwrap();
        b.end_map().unwrap();
        assert_eq!(
            b.into_string().unwrap(),
            concat!(
                r#"{"b":{"$byte":7},"s":{"$short":300},"l":{"$long":5},"#,
                r#""f":{"$float":2.5},"dec":{"$decimal":"123.450"},"#,
                r#""d":{"$date":"2024-03-15"},"iv":{"$interval":172800000},"#,
                r#""bin":{"$binary":"AQID"}}"#
            )
        );
    }

    #[test]
    fn test_untagged_mode_degrades() {
        let mut b = JsonDocumentBuilder::with_options(JsonOptions::new().with_tags(false));
        b.add_new_map().unwrap();
        b.put_long("l", 5).unwrap();
        b.put_decimal("dec", "123.45".parse().unwrap()).unwrap();
        b.put_date("d", Date::parse("2024-03-15").unwrap()).unwrap();
        b.put_interval("iv", Interval::new(500)).unwrap();
        b.put_binary("bin", &[1, 2, 3]).unwrap();
        b.end_map().unwrap();
        assert_eq!(
            b.into_string().unwrap(),
            r#"{"l":5,"dec":123.45,"d":"2024-03-15","iv":500,"bin":"AQID"}"#
        );
    }

    #[test]
    fn test_double_stays_lexically_float() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        b.put_double("d", 5.0).unwrap();
        b.put_double("e", 1.5e300).unwrap();
        b.put_double("t", 2.5e-9).unwrap();
        b.end_map().unwrap();
        let json = b.into_string().unwrap();
        assert_eq!(json, r#"{"d":5.0,"e":1.5e300,"t":2.5e-9}"#);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        assert!(matches!(
            b.put_double("d", f64::NAN),
            Err(Error::Encoding(_))
        ));
        assert!(b.put_float("f", f32::INFINITY).is_err());
    }

    #[test]
    fn test_string_escapes() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        b.put_string("s", "a\"b\\c\nd\u{1}").unwrap();
        b.end_map().unwrap();
        assert_eq!(
            b.into_string().unwrap(),
            "{\"s\":\"a\\\"b\\\\c\\nd\\u0001\"}"
        );
    }

    #[test]
    fn test_context_violations() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        assert!(b.add(&Value::Int(1)).is_err());
        assert!(b.end_array().is_err());
        b.put_new_array("xs").unwrap();
        assert!(b.put_int("x", 1).is_err());
        b.end_array().unwrap();
        b.end_map().unwrap();
        assert!(b.put_int("y", 2).is_err());
    }

    #[test]
    fn test_incomplete_document_rejected() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        assert!(b.into_string().is_err());
    }

    #[test]
    fn test_container_value_written_whole() {
        let mut doc = Document::new();
        doc.set("x", 1).unwrap();
        doc.set("ys", vec![Value::Int(2), Value::Int(3)]).unwrap();
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        b.put("sub", &Value::Map(doc)).unwrap();
        b.end_map().unwrap();
        assert_eq!(b.into_string().unwrap(), r#"{"sub":{"x":1,"ys":[2,3]}}"#);
    }

    #[test]
    fn test_pretty_output() {
        let mut b = JsonDocumentBuilder::with_options(JsonOptions::pretty());
        b.add_new_map().unwrap();
        b.put_int("a", 1).unwrap();
        b.put_new_array("xs").unwrap();
        b.add(&Value::Int(2)).unwrap();
        b.end_array().unwrap();
        b.end_map().unwrap();
        assert_eq!(
            b.into_string().unwrap(),
            "{\n  \"a\": 1,\n  \"xs\": [\n    2\n  ]\n}"
        );
    }

    #[test]
    fn test_pretty_keeps_tags_compact() {
        let mut b = JsonDocumentBuilder::with_options(JsonOptions::pretty());
        b.add_new_map().unwrap();
        b.put_long("l", 5).unwrap();
        b.end_map().unwrap();
        assert_eq!(
            b.into_string().unwrap(),
            "{\n  \"l\": {\"$long\":5}\n}"
        );
    }

    #[test]
    fn test_scalar_root() {
        let mut b = JsonDocumentBuilder::new();
        b.add(&Value::from("hello")).unwrap();
        assert_eq!(b.into_string().unwrap(), r#""hello""#);
    }

    #[test]
    fn test_array_root() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_array().unwrap();
        b.add(&Value::Int(1)).unwrap();
        b.add_null().unwrap();
        b.end_array().unwrap();
        assert_eq!(b.into_string().unwrap(), "[1,null]");
    }

    #[test]
    fn test_get_document() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_map().unwrap();
        b.put_long("l", 5).unwrap();
        b.end_map().unwrap();
        let doc = b.get_document().unwrap();
        assert_eq!(doc.get("l").unwrap(), Some(&Value::Long(5)));
    }

    #[test]
    fn test_get_document_from_added_map_root() {
        let mut doc = Document::new();
        doc.set("x", 1).unwrap();
        let mut b = JsonDocumentBuilder::new();
        b.add(&Value::Map(doc.clone())).unwrap();
        assert_eq!(b.get_document().unwrap(), doc);
    }

    #[test]
    fn test_get_document_requires_map_root() {
        let mut b = JsonDocumentBuilder::new();
        b.add_new_array().unwrap();
        b.end_array().unwrap();
        assert!(b.get_document().is_err());
    }

    #[test]
    fn test_closed_builder_rejects_writes() {
        let mut b = JsonDocumentBuilder::new();
        b.add(&Value::Int(1)).unwrap();
        assert!(matches!(b.add(&Value::Int(2)), Err(Error::IllegalState(_))));
        assert!(b.add_new_map().is_err());
    }

    #[test]
    fn test_unchecked_context() {
        let mut b = JsonDocumentBuilder::new();
        b.set_check_context(false);
        b.add_new_map().unwrap();
        // No error even though add inside a map is malformed.
        assert!(b.add(&Value::Int(1)).is_ok());
    }
}
