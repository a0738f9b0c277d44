//! The pull-based event protocol: readers expose a value tree as a flat
//! sequence of typed events, builders consume the same sequence.
//!
//! Event grammar, enforced by every conforming implementation:
//!
//! ```text
//! document := value
//! value    := scalar | map | array
//! map      := START_MAP (FIELD_NAME value)* END_MAP
//! array    := START_ARRAY value* END_ARRAY
//! ```
//!
//! Both reader families in this crate emit `FIELD_NAME` as its own event;
//! [`DocumentReader::get_field_name`] is valid only on that event. Typed
//! getters are valid only immediately after `next()` returned the matching
//! event; the numeric getters additionally accept any numeric event and
//! coerce with the same rules as [`Value`](crate::Value).

use std::fmt;

use crate::error::{Error, Result};
use crate::types::{Date, Decimal, Interval, Time, Timestamp};
use crate::value::Value;

/// The closed set of reader/builder events.
///
/// Displays in the wire-independent spelling (`START_MAP`, `FIELD_NAME`,
/// ...), which is what decoding and mismatch errors report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
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
    FieldName,
    StartMap,
    EndMap,
    StartArray,
    EndArray,
}

impl EventType {
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            EventType::FieldName
                | EventType::StartMap
                | EventType::EndMap
                | EventType::StartArray
                | EventType::EndArray
        )
    }
}

/// The event a scalar value produces. Containers are driven by their
/// reader's frame stack, never through this mapping.
pub(crate) fn scalar_event(value: &Value) -> EventType {
    match value {
        Value::Null => EventType::Null,
        Value::Boolean(_) => EventType::Boolean,
        Value::String(_) => EventType::String,
        Value::Byte(_) => EventType::Byte,
        Value::Short(_) => EventType::Short,
        Value::Int(_) => EventType::Int,
        Value::Long(_) => EventType::Long,
        Value::Float(_) => EventType::Float,
        Value::Double(_) => EventType::Double,
        Value::Decimal(_) => EventType::Decimal,
        Value::Date(_) => EventType::Date,
        Value::Time(_) => EventType::Time,
        Value::Timestamp(_) => EventType::Timestamp,
        Value::Interval(_) => EventType::Interval,
        Value::Binary(_) => EventType::Binary,
        Value::Map(_) => EventType::StartMap,
        Value::Array(_) => EventType::StartArray,
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::Null => "NULL",
            EventType::Boolean => "BOOLEAN",
            EventType::String => "STRING",
            EventType::Byte => "BYTE",
            EventType::Short => "SHORT",
            EventType::Int => "INT",
            EventType::Long => "LONG",
            EventType::Float => "FLOAT",
            EventType::Double => "DOUBLE",
            EventType::Decimal => "DECIMAL",
            EventType::Date => "DATE",
            EventType::Time => "TIME",
            EventType::Timestamp => "TIMESTAMP",
            EventType::Interval => "INTERVAL",
            EventType::Binary => "BINARY",
            EventType::FieldName => "FIELD_NAME",
            EventType::StartMap => "START_MAP",
            EventType::EndMap => "END_MAP",
            EventType::StartArray => "START_ARRAY",
            EventType::EndArray => "END_ARRAY",
        };
        f.write_str(name)
    }
}

/// A single-use forward cursor over one document's events.
///
/// `next()` never rewinds. After it has reported exhaustion with
/// `Ok(None)`, a further call is an illegal-state error; after it has
/// failed, the reader is unusable.
pub trait DocumentReader {
    /// Advances to the next event, or `Ok(None)` once the document is
    /// complete.
    fn next(&mut self) -> Result<Option<EventType>>;

    /// The event `next()` most recently returned, if any.
    fn current_event(&self) -> Option<EventType>;

    /// The field name; valid only on a `FIELD_NAME` event.
    fn get_field_name(&self) -> Result<&str>;

    /// The current scalar value; fails on structural and `FIELD_NAME`
    /// events. Implementations back the typed getters with this.
    fn current_scalar(&self) -> Result<&Value>;

    fn get_boolean(&self) -> Result<bool> {
        self.current_scalar()?.get_boolean()
    }

    fn get_string(&self) -> Result<&str> {
        self.current_scalar()?.get_string()
    }

    fn get_byte(&self) -> Result<i8> {
        self.current_scalar()?.get_byte()
    }

    fn get_short(&self) -> Result<i16> {
        self.current_scalar()?.get_short()
    }

    fn get_int(&self) -> Result<i32> {
        self.current_scalar()?.get_int()
    }

    fn get_long(&self) -> Result<i64> {
        self.current_scalar()?.get_long()
    }

    fn get_float(&self) -> Result<f32> {
        self.current_scalar()?.get_float()
    }

    fn get_double(&self) -> Result<f64> {
        self.current_scalar()?.get_double()
    }

    fn get_decimal(&self) -> Result<Decimal> {
        self.current_scalar()?.get_decimal()
    }

    fn get_date(&self) -> Result<Date> {
        self.current_scalar()?.get_date()
    }

    fn get_time(&self) -> Result<Time> {
        self.current_scalar()?.get_time()
    }

    fn get_timestamp(&self) -> Result<Timestamp> {
        self.current_scalar()?.get_timestamp()
    }

    fn get_interval(&self) -> Result<Interval> {
        self.current_scalar()?.get_interval()
    }

    fn get_binary(&self) -> Result<&[u8]> {
        self.current_scalar()?.get_binary()
    }
}

/// A single-use, stack-disciplined event consumer.
///
/// `put*` methods are legal only inside a map context, `add*` only inside
/// an array context or at the root; violations are illegal-state errors
/// (the check can be disabled by performance-sensitive callers that
/// guarantee well-formed sequences themselves). Once the root value is
/// complete the builder is closed and rejects further writes.
pub trait DocumentBuilder {
    /// Opens a map at the root or inside an array.
    fn add_new_map(&mut self) -> Result<()>;

    /// Opens a map under `field` inside the current map.
    fn put_new_map(&mut self, field: &str) -> Result<()>;

    /// Opens an array under `field` inside the current map.
    fn put_new_array(&mut self, field: &str) -> Result<()>;

    /// Opens an array at the root or inside an array.
    fn add_new_array(&mut self) -> Result<()>;

    fn end_map(&mut self) -> Result<()>;

    fn end_array(&mut self) -> Result<()>;

    /// Writes `field: value` inside the current map. A container value is
    /// written in full, tree included.
    fn put(&mut self, field: &str, value: &Value) -> Result<()>;

    fn put_null(&mut self, field: &str) -> Result<()> {
        self.put(field, &Value::Null)
    }

    /// Appends a value inside the current array (or as the root scalar).
    fn add(&mut self, value: &Value) -> Result<()>;

    fn add_null(&mut self) -> Result<()> {
        self.add(&Value::Null)
    }
}

/// Pumps one complete value from `reader` into `builder`, event by event.
///
/// Stops after the root value closes; fails if the reader's events end
/// mid-container or violate the event grammar.
pub fn copy_reader(
    reader: &mut dyn DocumentReader,
    builder: &mut dyn DocumentBuilder,
) -> Result<()> {
    let mut depth = 0usize;
    let mut field: Option<String> = None;
    loop {
        let Some(event) = reader.next()? else {
            return if depth == 0 {
                Ok(())
            } else {
                Err(Error::decoding("event stream ended inside a container"))
            };
        };
        match event {
            EventType::FieldName => {
                field = Some(reader.get_field_name()?.to_string());
            }
            EventType::StartMap => {
                match field.take() {
                    Some(f) => builder.put_new_map(&f)?,
                    None => builder.add_new_map()?,
                }
                depth += 1;
            }
            EventType::StartArray => {
                match field.take() {
                    Some(f) => builder.put_new_array(&f)?,
                    None => builder.add_new_array()?,
                }
                depth += 1;
            }
            EventType::EndMap => {
                if depth == 0 {
                    return Err(Error::decoding("END_MAP without a matching START_MAP"));
                }
                builder.end_map()?;
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            EventType::EndArray => {
                if depth == 0 {
                    return Err(Error::decoding("END_ARRAY without a matching START_ARRAY"));
                }
                builder.end_array()?;
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            _ => {
                let value = reader.current_scalar()?.clone();
                match field.take() {
                    Some(f) => builder.put(&f, &value)?,
                    None => builder.add(&value)?,
                }
                if depth == 0 {
                    return Ok(());
                }
            }
        }
    }
}
