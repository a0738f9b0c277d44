//! Dynamic value representation for self-describing documents.
//!
//! This module provides the [`Value`] enum, a tagged union over the
//! seventeen kinds a document field can hold, and [`ValueType`], its
//! parallel discriminant.
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use jsondoc::{Date, Value};
//!
//! let null = Value::Null;
//! let flag = Value::from(true);
//! let count = Value::from(42);
//! let text = Value::from("hello");
//! let day = Value::from(Date::from_ymd(2024, 3, 15).unwrap());
//! ```
//!
//! ### Type Checking
//!
//! ```rust
//! use jsondoc::{Value, ValueType};
//!
//! let value = Value::from(42);
//! assert_eq!(value.value_type(), ValueType::Int);
//! assert!(value.is_numeric());
//! assert!(!value.is_string());
//! ```
//!
//! ### Extracting Values
//!
//! The numeric getters coerce between the eight numeric kinds with the
//! same narrowing rules as an `as` cast; every other getter requires the
//! exact kind and fails with a type-mismatch error otherwise.
//!
//! ```rust
//! use jsondoc::Value;
//!
//! let v = Value::Double(65.675);
//! assert_eq!(v.get_int().unwrap(), 65);
//! assert!(v.get_string().is_err());
//! ```

use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::list::List;
use crate::types::{Date, Decimal, Interval, Time, Timestamp};

/// The discriminant of a [`Value`].
///
/// Displays in the wire-format spelling (`NULL`, `BOOLEAN`, ...), which is
/// also what type-mismatch errors report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Boolean,
    String,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Date,
    Time,
    Timestamp,
    Interval,
    Binary,
    Map,
    Array,
}

impl ValueType {
    /// True for the eight numeric kinds, which coerce among each other.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Byte
                | ValueType::Short
                | ValueType::Int
                | ValueType::Long
                | ValueType::Float
                | ValueType::Double
                | ValueType::Decimal
        )
    }

    /// True for `Map` and `Array`.
    pub fn is_container(&self) -> bool {
        matches!(self, ValueType::Map | ValueType::Array)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Null => "NULL",
            ValueType::Boolean => "BOOLEAN",
            ValueType::String => "STRING",
            ValueType::Byte => "BYTE",
            ValueType::Short => "SHORT",
            ValueType::Int => "INT",
            ValueType::Long => "LONG",
            ValueType::Float => "FLOAT",
            ValueType::Double => "DOUBLE",
            ValueType::Decimal => "DECIMAL",
            ValueType::Date => "DATE",
            ValueType::Time => "TIME",
            ValueType::Timestamp => "TIMESTAMP",
            ValueType::Interval => "INTERVAL",
            ValueType::Binary => "BINARY",
            ValueType::Map => "MAP",
            ValueType::Array => "ARRAY",
        };
        f.write_str(name)
    }
}

/// A dynamically-typed document value.
///
/// A value's kind is fixed at construction; mutation replaces the whole
/// value, never its discriminant. Containers own their children, so a
/// `Value` is always a tree.
///
/// # Examples
///
/// ```rust
/// use jsondoc::{doc, Value};
///
/// let v = doc!({
///     "name": "Alice",
///     "scores": [1, 2, 3]
/// });
/// assert!(v.is_map());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    String(String),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Date(Date),
    Time(Time),
    Timestamp(Timestamp),
    Interval(Interval),
    Binary(Vec<u8>),
    Map(Document),
    Array(List),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::String(_) => ValueType::String,
            Value::Byte(_) => ValueType::Byte,
            Value::Short(_) => ValueType::Short,
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::Decimal(_) => ValueType::Decimal,
            Value::Date(_) => ValueType::Date,
            Value::Time(_) => ValueType::Time,
            Value::Timestamp(_) => ValueType::Timestamp,
            Value::Interval(_) => ValueType::Interval,
            Value::Binary(_) => ValueType::Binary,
            Value::Map(_) => ValueType::Map,
            Value::Array(_) => ValueType::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_numeric(&self) -> bool {
        self.value_type().is_numeric()
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Value::Binary(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    fn numeric_mismatch(&self) -> Error {
        Error::type_mismatch("a numeric type", self.value_type())
    }

    /// Coerces any numeric kind to `i8` with `as`-cast narrowing.
    pub fn get_byte(&self) -> Result<i8> {
        Ok(self.get_long()? as i8)
    }

    /// Coerces any numeric kind to `i16` with `as`-cast narrowing.
    pub fn get_short(&self) -> Result<i16> {
        Ok(self.get_long()? as i16)
    }

    /// Coerces any numeric kind to `i32` with `as`-cast narrowing.
    ///
    /// Float sources truncate toward zero; wider integers wrap.
    pub fn get_int(&self) -> Result<i32> {
        Ok(self.get_long()? as i32)
    }

    /// Coerces any numeric kind to `i64`.
    pub fn get_long(&self) -> Result<i64> {
        match self {
            Value::Byte(v) => Ok(*v as i64),
            Value::Short(v) => Ok(*v as i64),
            Value::Int(v) => Ok(*v as i64),
            Value::Long(v) => Ok(*v),
            Value::Float(v) => Ok(*v as i64),
            Value::Double(v) => Ok(*v as i64),
            Value::Decimal(v) => Ok(v.to_i64_wrapping()),
            _ => Err(self.numeric_mismatch()),
        }
    }

    /// Coerces any numeric kind to `f32`.
    pub fn get_float(&self) -> Result<f32> {
        Ok(self.get_double()? as f32)
    }

    /// Coerces any numeric kind to `f64`.
    pub fn get_double(&self) -> Result<f64> {
        match self {
            Value::Byte(v) => Ok(*v as f64),
            Value::Short(v) => Ok(*v as f64),
            Value::Int(v) => Ok(*v as f64),
            Value::Long(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v as f64),
            Value::Double(v) => Ok(*v),
            Value::Decimal(v) => Ok(v.to_f64()),
            _ => Err(self.numeric_mismatch()),
        }
    }

    /// Coerces any numeric kind to [`Decimal`].
    ///
    /// Non-finite floats have no decimal form and fail.
    pub fn get_decimal(&self) -> Result<Decimal> {
        match self {
            Value::Byte(v) => Ok(Decimal::from(*v)),
            Value::Short(v) => Ok(Decimal::from(*v)),
            Value::Int(v) => Ok(Decimal::from(*v)),
            Value::Long(v) => Ok(Decimal::from(*v)),
            Value::Float(v) => Decimal::from_f64(*v as f64)
                .ok_or_else(|| Error::decoding("non-finite float has no decimal form")),
            Value::Double(v) => Decimal::from_f64(*v)
                .ok_or_else(|| Error::decoding("non-finite float has no decimal form")),
            Value::Decimal(v) => Ok(v.clone()),
            _ => Err(self.numeric_mismatch()),
        }
    }

    pub fn get_boolean(&self) -> Result<bool> {
        match self {
            Value::Boolean(v) => Ok(*v),
            other => Err(Error::type_mismatch(ValueType::Boolean, other.value_type())),
        }
    }

    pub fn get_string(&self) -> Result<&str> {
        match self {
            Value::String(v) => Ok(v),
            other => Err(Error::type_mismatch(ValueType::String, other.value_type())),
        }
    }

    pub fn get_date(&self) -> Result<Date> {
        match self {
            Value::Date(v) => Ok(*v),
            other => Err(Error::type_mismatch(ValueType::Date, other.value_type())),
        }
    }

    pub fn get_time(&self) -> Result<Time> {
        match self {
            Value::Time(v) => Ok(*v),
            other => Err(Error::type_mismatch(ValueType::Time, other.value_type())),
        }
    }

    pub fn get_timestamp(&self) -> Result<Timestamp> {
        match self {
            Value::Timestamp(v) => Ok(*v),
            other => Err(Error::type_mismatch(
                ValueType::Timestamp,
                other.value_type(),
            )),
        }
    }

    pub fn get_interval(&self) -> Result<Interval> {
        match self {
            Value::Interval(v) => Ok(*v),
            other => Err(Error::type_mismatch(
                ValueType::Interval,
                other.value_type(),
            )),
        }
    }

    pub fn get_binary(&self) -> Result<&[u8]> {
        match self {
            Value::Binary(v) => Ok(v),
            other => Err(Error::type_mismatch(ValueType::Binary, other.value_type())),
        }
    }

    pub fn get_map(&self) -> Result<&Document> {
        match self {
            Value::Map(v) => Ok(v),
            other => Err(Error::type_mismatch(ValueType::Map, other.value_type())),
        }
    }

    pub fn get_list(&self) -> Result<&List> {
        match self {
            Value::Array(v) => Ok(v),
            other => Err(Error::type_mismatch(ValueType::Array, other.value_type())),
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Replaces any non-map value with an empty map and returns it mutably.
    pub(crate) fn ensure_map(&mut self) -> &mut Document {
        if !self.is_map() {
            *self = Value::Map(Document::new());
        }
        match self {
            Value::Map(m) => m,
            _ => unreachable!(),
        }
    }

    /// Replaces any non-array value with an empty list and returns it mutably.
    pub(crate) fn ensure_list(&mut self) -> &mut List {
        if !self.is_array() {
            *self = Value::Array(List::new());
        }
        match self {
            Value::Array(l) => l,
            _ => unreachable!(),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(v.to_vec())
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Value::Date(v)
    }
}

impl From<Time> for Value {
    fn from(v: Time) -> Self {
        Value::Time(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Interval> for Value {
    fn from(v: Interval) -> Self {
        Value::Interval(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Value::Map(v)
    }
}

impl From<List> for Value {
    fn from(v: List) -> Self {
        Value::Array(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(List::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

macro_rules! value_eq_exact {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl PartialEq<$t> for Value {
                fn eq(&self, other: &$t) -> bool {
                    matches!(self, Value::$variant(v) if v == other)
                }
            }

            impl PartialEq<Value> for $t {
                fn eq(&self, other: &Value) -> bool {
                    other == self
                }
            }
        )*
    };
}

value_eq_exact!(
    bool => Boolean,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
);

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Value::String(v) if v == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<String> for Value {
    fn eq(&self, other: &String) -> bool {
        self == other.as_str()
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(v) => serializer.serialize_bool(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Byte(v) => serializer.serialize_i8(*v),
            Value::Short(v) => serializer.serialize_i16(*v),
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::Long(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f32(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::Decimal(v) => serializer.serialize_str(&v.to_string()),
            Value::Date(v) => serializer.serialize_str(&v.to_string()),
            Value::Time(v) => serializer.serialize_str(&v.to_string()),
            Value::Timestamp(v) => serializer.serialize_str(&v.to_string()),
            Value::Interval(v) => serializer.serialize_i64(v.millis()),
            Value::Binary(v) => serializer.serialize_bytes(v),
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Array(a) => {
                let mut seq = serializer.serialize_seq(Some(a.len()))?;
                for v in a.iter() {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any document value")
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Boolean(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        if let Ok(i) = i32::try_from(v) {
            Ok(Value::Int(i))
        } else {
            Ok(Value::Long(v))
        }
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        match i64::try_from(v) {
            Ok(i) => self.visit_i64(i),
            Err(_) => Ok(Value::Decimal(Decimal::from(v))),
        }
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Double(v))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> std::result::Result<Value, E> {
        Ok(Value::Binary(v.to_vec()))
    }

    fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: serde::de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut list = List::new();
        while let Some(v) = seq.next_element::<Value>()? {
            list.push(v);
        }
        Ok(Value::Array(list))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut doc = Document::new();
        while let Some((k, v)) = map.next_entry::<String, Value>()? {
            doc.insert(k, v);
        }
        Ok(Value::Map(doc))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}
