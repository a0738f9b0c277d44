//! The MAP container: an insertion-ordered document of named values.
//!
//! [`Document`] is both the root type users hold and the payload of every
//! nested `Value::Map`. Fields are addressed two ways:
//!
//! - directly by exact key (`get_field`, `insert`, `remove`), or
//! - through a [`FieldPath`](crate::FieldPath), where `set` creates
//!   intermediate containers on demand and `delete` is a silent no-op on
//!   any mismatch.
//!
//! ## Examples
//!
//! ```rust
//! use jsondoc::Document;
//!
//! let mut doc = Document::new();
//! doc.set("user.name", "Alice").unwrap();
//! doc.set("user.scores[0]", 10).unwrap();
//!
//! assert_eq!(doc.get_string("user.name").unwrap(), Some("Alice"));
//! assert_eq!(doc.get_int("user.scores[0]").unwrap(), Some(10));
//!
//! doc.delete("user.name").unwrap();
//! assert_eq!(doc.get("user.name").unwrap(), None);
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dom::DomDocumentReader;
use crate::error::{Error, Result};
use crate::event::{DocumentReader, EventType};
use crate::field_path::{FieldSegment, IntoPath};
use crate::list::List;
use crate::options::JsonOptions;
use crate::types::{Date, Decimal, Interval, Time, Timestamp};
use crate::value::Value;

/// An ordered mapping from field name to [`Value`].
///
/// Iteration and serialization preserve insertion order. Direct key lookup
/// is exact-match; only path comparison (the
/// [`FieldPath`](crate::FieldPath) algebra) is case-insensitive.
///
/// Not safe for concurrent mutation; readers obtained from
/// [`as_reader`](Document::as_reader) borrow the tree, so the borrow
/// checker rules out mutation while one is open.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    fields: IndexMap<String, Value>,
}

impl Document {
    /// The reserved application-identity field name. Convention only; the
    /// model does not enforce its presence or kind.
    pub const ID_FIELD: &'static str = "_id";

    pub fn new() -> Self {
        Document {
            fields: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Exact-match lookup of a direct field.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Inserts or replaces a direct field, returning the prior value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a direct field, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// The `_id` field, if present.
    pub fn id(&self) -> Option<&Value> {
        self.get_field(Self::ID_FIELD)
    }

    pub fn set_id(&mut self, value: impl Into<Value>) -> &mut Self {
        self.insert(Self::ID_FIELD, value);
        self
    }

    pub(crate) fn entry_slot(&mut self, name: &str) -> &mut Value {
        self.fields
            .entry(name.to_string())
            .or_insert(Value::Null)
    }

    /// The value at `path`, or `None` when any step is absent or of the
    /// wrong container kind. The empty path addresses the document itself,
    /// which is not a value slot, and resolves to `None`.
    pub fn get<P: IntoPath>(&self, path: P) -> Result<Option<&Value>> {
        let path = path.into_path()?;
        let Some((first, rest)) = path.segments().split_first() else {
            return Ok(None);
        };
        let FieldSegment::Name { name, .. } = first else {
            return Ok(None);
        };
        match self.get_field(name) {
            Some(child) => Ok(get_in(child, rest)),
            None => Ok(None),
        }
    }

    /// Sets the value at `path`, creating intermediate maps and lists on
    /// demand. An intermediate of the wrong container kind is discarded and
    /// replaced with a fresh container of the kind the next segment needs;
    /// this is not a validating read-check-write.
    pub fn set<P: IntoPath, V: Into<Value>>(&mut self, path: P, value: V) -> Result<&mut Self> {
        let path = path.into_path()?;
        let Some((first, rest)) = path.segments().split_first() else {
            return Err(Error::illegal_state("cannot set the document root"));
        };
        let FieldSegment::Name { name, .. } = first else {
            return Err(Error::illegal_state(
                "a document path must start with a field name",
            ));
        };
        if rest.is_empty() {
            self.insert(name.clone(), value.into());
        } else {
            set_in(self.entry_slot(name), rest, value.into());
        }
        Ok(self)
    }

    pub fn set_null<P: IntoPath>(&mut self, path: P) -> Result<&mut Self> {
        self.set(path, Value::Null)
    }

    /// Removes the value at `path`. Any kind mismatch or absent step along
    /// the way makes this a silent no-op.
    pub fn delete<P: IntoPath>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.into_path()?;
        let Some((first, rest)) = path.segments().split_first() else {
            return Ok(self);
        };
        let FieldSegment::Name { name, .. } = first else {
            return Ok(self);
        };
        if rest.is_empty() {
            self.remove(name);
        } else if let Some(child) = self.get_field_mut(name) {
            delete_in(child, rest);
        }
        Ok(self)
    }

    pub fn get_string<P: IntoPath>(&self, path: P) -> Result<Option<&str>> {
        self.get(path)?.map(Value::get_string).transpose()
    }

    pub fn get_boolean<P: IntoPath>(&self, path: P) -> Result<Option<bool>> {
        self.get(path)?.map(Value::get_boolean).transpose()
    }

    pub fn get_byte<P: IntoPath>(&self, path: P) -> Result<Option<i8>> {
        self.get(path)?.map(Value::get_byte).transpose()
    }

    pub fn get_short<P: IntoPath>(&self, path: P) -> Result<Option<i16>> {
        self.get(path)?.map(Value::get_short).transpose()
    }

    pub fn get_int<P: IntoPath>(&self, path: P) -> Result<Option<i32>> {
        self.get(path)?.map(Value::get_int).transpose()
    }

    pub fn get_long<P: IntoPath>(&self, path: P) -> Result<Option<i64>> {
        self.get(path)?.map(Value::get_long).transpose()
    }

    pub fn get_float<P: IntoPath>(&self, path: P) -> Result<Option<f32>> {
        self.get(path)?.map(Value::get_float).transpose()
    }

    pub fn get_double<P: IntoPath>(&self, path: P) -> Result<Option<f64>> {
        self.get(path)?.map(Value::get_double).transpose()
    }

    pub fn get_decimal<P: IntoPath>(&self, path: P) -> Result<Option<Decimal>> {
        self.get(path)?.map(Value::get_decimal).transpose()
    }

    pub fn get_date<P: IntoPath>(&self, path: P) -> Result<Option<Date>> {
        self.get(path)?.map(Value::get_date).transpose()
    }

    pub fn get_time<P: IntoPath>(&self, path: P) -> Result<Option<Time>> {
        self.get(path)?.map(Value::get_time).transpose()
    }

    pub fn get_timestamp<P: IntoPath>(&self, path: P) -> Result<Option<Timestamp>> {
        self.get(path)?.map(Value::get_timestamp).transpose()
    }

    pub fn get_interval<P: IntoPath>(&self, path: P) -> Result<Option<Interval>> {
        self.get(path)?.map(Value::get_interval).transpose()
    }

    pub fn get_binary<P: IntoPath>(&self, path: P) -> Result<Option<&[u8]>> {
        self.get(path)?.map(Value::get_binary).transpose()
    }

    pub fn get_document<P: IntoPath>(&self, path: P) -> Result<Option<&Document>> {
        self.get(path)?.map(Value::get_map).transpose()
    }

    pub fn get_list<P: IntoPath>(&self, path: P) -> Result<Option<&List>> {
        self.get(path)?.map(Value::get_list).transpose()
    }

    /// A pull-based event reader over this document. The reader borrows the
    /// tree, so the document cannot be mutated while one is open.
    pub fn as_reader(&self) -> DomDocumentReader<'_> {
        DomDocumentReader::from_document(self)
    }

    /// Encodes this document as tagged JSON with default options.
    pub fn to_json_string(&self) -> Result<String> {
        self.to_json_string_with_options(&JsonOptions::default())
    }

    pub fn to_json_string_with_options(&self, options: &JsonOptions) -> Result<String> {
        crate::to_json_string_with_options(&Value::Map(self.clone()), options)
    }

    /// Materializes a document from any event source. The first event must
    /// open a map.
    pub fn from_reader(reader: &mut dyn DocumentReader) -> Result<Document> {
        match reader.next()? {
            Some(EventType::StartMap) => read_map(reader),
            Some(other) => Err(Error::decoding(format!(
                "expected START_MAP at document root, found {}",
                other
            ))),
            None => Err(Error::decoding("empty event stream")),
        }
    }
}

fn get_in<'a>(value: &'a Value, segments: &[FieldSegment]) -> Option<&'a Value> {
    let Some((seg, rest)) = segments.split_first() else {
        return Some(value);
    };
    let child = match (seg, value) {
        (FieldSegment::Name { name, .. }, Value::Map(m)) => m.get_field(name)?,
        (FieldSegment::Index(Some(i)), Value::Array(l)) => l.get(*i as usize)?,
        _ => return None,
    };
    get_in(child, rest)
}

fn set_in(slot: &mut Value, segments: &[FieldSegment], value: Value) {
    let Some((seg, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };
    match seg {
        FieldSegment::Name { name, .. } => {
            let map = slot.ensure_map();
            if rest.is_empty() {
                map.insert(name.clone(), value);
            } else {
                set_in(map.entry_slot(name), rest, value);
            }
        }
        FieldSegment::Index(i) => {
            let list = slot.ensure_list();
            // An unspecified index appends.
            let index = i.map(|v| v as usize).unwrap_or(list.len());
            if rest.is_empty() {
                list.set(index, value);
            } else {
                set_in(list.slot_at(index), rest, value);
            }
        }
    }
}

fn delete_in(slot: &mut Value, segments: &[FieldSegment]) {
    let Some((seg, rest)) = segments.split_first() else {
        return;
    };
    match (seg, slot) {
        (FieldSegment::Name { name, .. }, Value::Map(m)) => {
            if rest.is_empty() {
                m.remove(name);
            } else if let Some(child) = m.get_field_mut(name) {
                delete_in(child, rest);
            }
        }
        (FieldSegment::Index(Some(i)), Value::Array(l)) => {
            if rest.is_empty() {
                l.remove(*i as usize);
            } else if let Some(child) = l.get_mut(*i as usize) {
                delete_in(child, rest);
            }
        }
        _ => {}
    }
}

fn read_map(reader: &mut dyn DocumentReader) -> Result<Document> {
    let mut doc = Document::new();
    loop {
        match reader.next()? {
            Some(EventType::EndMap) => return Ok(doc),
            Some(EventType::FieldName) => {
                let name = reader.get_field_name()?.to_string();
                let value = read_value(reader)?;
                doc.insert(name, value);
            }
            Some(other) => {
                return Err(Error::decoding(format!(
                    "expected FIELD_NAME or END_MAP, found {}",
                    other
                )))
            }
            None => return Err(Error::decoding("event stream ended inside a map")),
        }
    }
}

fn read_array(reader: &mut dyn DocumentReader) -> Result<List> {
    let mut list = List::new();
    loop {
        match reader.next()? {
            Some(EventType::EndArray) => return Ok(list),
            Some(EventType::StartMap) => list.push(Value::Map(read_map(reader)?)),
            Some(EventType::StartArray) => list.push(Value::Array(read_array(reader)?)),
            Some(EventType::FieldName) => {
                return Err(Error::decoding("FIELD_NAME inside an array"))
            }
            Some(EventType::EndMap) => {
                return Err(Error::decoding("END_MAP without a matching START_MAP"))
            }
            Some(_) => list.push(reader.current_scalar()?.clone()),
            None => return Err(Error::decoding("event stream ended inside an array")),
        }
    }
}

fn read_value(reader: &mut dyn DocumentReader) -> Result<Value> {
    match reader.next()? {
        Some(EventType::StartMap) => Ok(Value::Map(read_map(reader)?)),
        Some(EventType::StartArray) => Ok(Value::Array(read_array(reader)?)),
        Some(EventType::FieldName | EventType::EndMap | EventType::EndArray) => {
            Err(Error::decoding("expected a value after FIELD_NAME"))
        }
        Some(_) => Ok(reader.current_scalar()?.clone()),
        None => Err(Error::decoding("event stream ended before a field value")),
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json_string() {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Document, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = IndexMap::<String, Value>::deserialize(deserializer)?;
        Ok(Document { fields })
    }
}
