//! Tree-backed event reader: walks a borrowed [`Value`] with an explicit
//! frame stack, emitting the same event sequence the streaming reader
//! produces from text.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::event::{scalar_event, DocumentReader, EventType};
use crate::value::Value;

enum Frame<'a> {
    Map {
        entries: indexmap::map::Iter<'a, String, Value>,
        // Set while the FIELD_NAME event is current; its value comes next.
        pending: Option<&'a Value>,
    },
    Array(std::slice::Iter<'a, Value>),
}

enum Current<'a> {
    None,
    Structural(EventType),
    Field(&'a str),
    Scalar(EventType, &'a Value),
}

enum State<'a> {
    BeforeStart(Root<'a>),
    Running,
    /// All events delivered; the next call reports exhaustion.
    Drained,
    Exhausted,
}

enum Root<'a> {
    Document(&'a Document),
    Value(&'a Value),
}

/// A [`DocumentReader`] over an in-memory tree.
///
/// Borrows the tree for its whole lifetime, so the borrow checker rules
/// out mutation while the reader is open. Single-use: reading past
/// exhaustion is an illegal-state error.
pub struct DomDocumentReader<'a> {
    state: State<'a>,
    stack: Vec<Frame<'a>>,
    current: Current<'a>,
}

impl<'a> DomDocumentReader<'a> {
    /// A reader over any value, scalars included (scalar-as-root produces a
    /// one-event sequence).
    pub fn new(value: &'a Value) -> Self {
        DomDocumentReader {
            state: State::BeforeStart(Root::Value(value)),
            stack: Vec::new(),
            current: Current::None,
        }
    }

    pub fn from_document(document: &'a Document) -> Self {
        DomDocumentReader {
            state: State::BeforeStart(Root::Document(document)),
            stack: Vec::new(),
            current: Current::None,
        }
    }

    /// Emits the event for `value` in the current position, pushing a frame
    /// for containers.
    fn enter(&mut self, value: &'a Value) -> EventType {
        match value {
            Value::Map(m) => {
                self.stack.push(Frame::Map {
                    entries: m.iter(),
                    pending: None,
                });
                self.current = Current::Structural(EventType::StartMap);
                EventType::StartMap
            }
            Value::Array(a) => {
                self.stack.push(Frame::Array(a.iter()));
                self.current = Current::Structural(EventType::StartArray);
                EventType::StartArray
            }
            scalar => {
                let event = scalar_event(scalar);
                self.current = Current::Scalar(event, scalar);
                event
            }
        }
    }

    fn advance(&mut self) -> Option<EventType> {
        let frame = self.stack.last_mut()?;
        match frame {
            Frame::Map { entries, pending } => {
                if let Some(value) = pending.take() {
                    return Some(self.enter(value));
                }
                match entries.next() {
                    Some((name, value)) => {
                        *pending = Some(value);
                        self.current = Current::Field(name.as_str());
                        Some(EventType::FieldName)
                    }
                    None => {
                        self.stack.pop();
                        self.current = Current::Structural(EventType::EndMap);
                        Some(EventType::EndMap)
                    }
                }
            }
            Frame::Array(items) => match items.next() {
                Some(value) => Some(self.enter(value)),
                None => {
                    self.stack.pop();
                    self.current = Current::Structural(EventType::EndArray);
                    Some(EventType::EndArray)
                }
            },
        }
    }
}

impl<'a> DocumentReader for DomDocumentReader<'a> {
    fn next(&mut self) -> Result<Option<EventType>> {
        match std::mem::replace(&mut self.state, State::Running) {
            State::BeforeStart(root) => {
                let event = match root {
                    Root::Document(doc) => {
                        self.stack.push(Frame::Map {
                            entries: doc.iter(),
                            pending: None,
                        });
                        self.current = Current::Structural(EventType::StartMap);
                        EventType::StartMap
                    }
                    Root::Value(value) => self.enter(value),
                };
                if self.stack.is_empty() {
                    // Scalar root: one event and done.
                    self.state = State::Drained;
                }
                Ok(Some(event))
            }
            State::Running => match self.advance() {
                Some(event) => {
                    if self.stack.is_empty() {
                        self.state = State::Drained;
                    }
                    Ok(Some(event))
                }
                None => {
                    self.state = State::Exhausted;
                    Ok(None)
                }
            },
            State::Drained => {
                self.current = Current::None;
                self.state = State::Exhausted;
                Ok(None)
            }
            State::Exhausted => {
                self.state = State::Exhausted;
                Err(Error::illegal_state("reader used after exhaustion"))
            }
        }
    }

    fn current_event(&self) -> Option<EventType> {
        match &self.current {
            Current::None => None,
            Current::Structural(e) => Some(*e),
            Current::Field(_) => Some(EventType::FieldName),
            Current::Scalar(e, _) => Some(*e),
        }
    }

    fn get_field_name(&self) -> Result<&str> {
        match &self.current {
            Current::Field(name) => Ok(name),
            _ => Err(Error::illegal_state(
                "get_field_name is valid only on a FIELD_NAME event",
            )),
        }
    }

    fn current_scalar(&self) -> Result<&Value> {
        match &self.current {
            Current::Scalar(_, value) => Ok(value),
            Current::None => Err(Error::type_mismatch("a scalar event", "no current event")),
            other => {
                let event = match other {
                    Current::Structural(e) => *e,
                    _ => EventType::FieldName,
                };
                Err(Error::type_mismatch("a scalar event", event))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn events(reader: &mut DomDocumentReader<'_>) -> Vec<EventType> {
        let mut out = Vec::new();
        while let Some(e) = reader.next().unwrap() {
            out.push(e);
        }
        out
    }

    #[test]
    fn test_walk_nested() {
        let value = doc!({
            "a": 1,
            "b": { "c": true },
            "xs": [1, "two"]
        });
        let mut reader = DomDocumentReader::new(&value);
        assert_eq!(
            events(&mut reader),
            vec![
                EventType::StartMap,
                EventType::FieldName,
                EventType::Int,
                EventType::FieldName,
                EventType::StartMap,
                EventType::FieldName,
                EventType::Boolean,
                EventType::EndMap,
                EventType::FieldName,
                EventType::StartArray,
                EventType::Int,
                EventType::String,
                EventType::EndArray,
                EventType::EndMap,
            ]
        );
    }

    #[test]
    fn test_field_names_and_values() {
        let value = doc!({ "name": "Alice", "age": 30 });
        let mut reader = DomDocumentReader::new(&value);
        assert_eq!(reader.next().unwrap(), Some(EventType::StartMap));

        assert_eq!(reader.next().unwrap(), Some(EventType::FieldName));
        assert_eq!(reader.get_field_name().unwrap(), "name");
        assert_eq!(reader.next().unwrap(), Some(EventType::String));
        assert_eq!(reader.get_string().unwrap(), "Alice");

        assert_eq!(reader.next().unwrap(), Some(EventType::FieldName));
        assert_eq!(reader.get_field_name().unwrap(), "age");
        assert_eq!(reader.next().unwrap(), Some(EventType::Int));
        assert_eq!(reader.get_int().unwrap(), 30);
        // Numeric coercion applies to the event getters too.
        assert_eq!(reader.get_double().unwrap(), 30.0);
    }

    #[test]
    fn test_scalar_root() {
        let value = Value::from("hello");
        let mut reader = DomDocumentReader::new(&value);
        assert_eq!(reader.next().unwrap(), Some(EventType::String));
        assert_eq!(reader.get_string().unwrap(), "hello");
        assert_eq!(reader.next().unwrap(), None);
    }

    #[test]
    fn test_read_past_exhaustion_is_illegal() {
        let value = Value::Int(1);
        let mut reader = DomDocumentReader::new(&value);
        reader.next().unwrap();
        assert_eq!(reader.next().unwrap(), None);
        assert!(matches!(reader.next(), Err(Error::IllegalState(_))));
    }

    #[test]
    fn test_mismatched_getter() {
        let value = doc!({ "a": 1 });
        let mut reader = DomDocumentReader::new(&value);
        reader.next().unwrap();
        // START_MAP has no scalar value.
        assert!(reader.get_int().is_err());
        reader.next().unwrap();
        assert!(reader.get_string().is_err());
        assert_eq!(reader.get_field_name().unwrap(), "a");
    }

    #[test]
    fn test_from_document() {
        let mut doc = Document::new();
        doc.set("x", 1).unwrap();
        let mut reader = doc.as_reader();
        assert_eq!(
            events(&mut reader),
            vec![
                EventType::StartMap,
                EventType::FieldName,
                EventType::Int,
                EventType::EndMap,
            ]
        );
    }
}
