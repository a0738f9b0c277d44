//! Streaming tagged-JSON decoding.
//!
//! Three layers, bottom up:
//!
//! - [`JsonTokenizer`]: a single-pass, hand-written lexer over UTF-8 text
//!   producing [`JsonToken`]s and enforcing the JSON grammar with a
//!   container stack. Reports line/column positions on syntax errors.
//! - [`JsonDocumentReader`]: a [`DocumentReader`] over the token stream
//!   that recognizes the `{"$tag": payload}` extended-type convention and
//!   emits typed scalar events for it.
//! - [`JsonDocumentStream`]: an iterator of documents over input holding
//!   zero or more concatenated or whitespace-separated documents.
//!
//! ## Tag detection
//!
//! On every `{` the reader peeks at up to three tokens. If and only if
//! they form exactly `"$tag": <scalar> }` for a known tag, the object is
//! consumed whole and surfaces as one scalar event; the implied `}` is
//! swallowed, never emitted. Any other shape, including a second field
//! after a tag-named one, is an ordinary map, and unknown `$`-prefixed
//! names always pass through as ordinary fields. A recognized tag whose
//! scalar payload does not parse is a decoding error naming the tag and
//! the raw text.
//!
//! ## Usage
//!
//! ```rust
//! use jsondoc::from_str;
//!
//! let doc = from_str(r#"{"when": {"$date": "2024-03-15"}, "n": 1}"#).unwrap();
//! assert!(doc.get_date("when").unwrap().is_some());
//! ```

use std::collections::VecDeque;

use base64ct::{Base64, Encoding};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::event::{scalar_event, DocumentReader, EventType};
use crate::types::{Date, Decimal, Interval, Time, Timestamp};
use crate::value::Value;

/// One lexical token of the JSON grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonToken {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    FieldName(String),
    Str(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Null,
}

impl JsonToken {
    fn is_scalar(&self) -> bool {
        matches!(
            self,
            JsonToken::Str(_)
                | JsonToken::Int(_)
                | JsonToken::Double(_)
                | JsonToken::Bool(_)
                | JsonToken::Null
        )
    }

    fn raw_text(&self) -> String {
        match self {
            JsonToken::Str(s) => s.clone(),
            JsonToken::Int(i) => i.to_string(),
            JsonToken::Double(d) => d.to_string(),
            JsonToken::Bool(b) => b.to_string(),
            JsonToken::Null => "null".to_string(),
            JsonToken::StartObject => "{".to_string(),
            JsonToken::EndObject => "}".to_string(),
            JsonToken::StartArray => "[".to_string(),
            JsonToken::EndArray => "]".to_string(),
            JsonToken::FieldName(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LexState {
    /// Expecting a value.
    Value,
    /// Just after `[`: a value or an immediate `]`.
    ArrayFirst,
    /// Just after `{`: a field name or an immediate `}`.
    ObjectFirst,
    /// After `,` inside an object: a field name.
    ObjectField,
    /// A value just ended: `,` or the container's closer.
    AfterValue,
}

/// A grammar-enforcing JSON lexer.
///
/// At the top level, completed values may follow one another; this is
/// what lets [`JsonDocumentStream`] read concatenated documents. Any
/// structural violation inside a value fails the tokenizer permanently.
pub struct JsonTokenizer<'de> {
    input: &'de str,
    position: usize,
    line: usize,
    column: usize,
    stack: Vec<Container>,
    state: LexState,
}

impl<'de> JsonTokenizer<'de> {
    pub fn new(input: &'de str) -> Self {
        JsonTokenizer {
            input,
            position: 0,
            line: 1,
            column: 1,
            stack: Vec::new(),
            state: LexState::Value,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(' ' | '\t' | '\n' | '\r')) {
            self.next_char();
        }
    }

    fn err(&self, msg: impl Into<String>) -> Error {
        Error::syntax(self.line, self.column, msg)
    }

    /// Returns the next token, or `None` at a document boundary with no
    /// further input.
    pub fn next_token(&mut self) -> Result<Option<JsonToken>> {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek_char() else {
                return if self.stack.is_empty() {
                    Ok(None)
                } else {
                    Err(self.err("unexpected end of input inside a container"))
                };
            };
            match self.state {
                LexState::Value => return self.lex_value().map(Some),
                LexState::ArrayFirst => {
                    if c == ']' {
                        self.next_char();
                        return self.close(Container::Array).map(Some);
                    }
                    return self.lex_value().map(Some);
                }
                LexState::ObjectFirst => {
                    if c == '}' {
                        self.next_char();
                        return self.close(Container::Object).map(Some);
                    }
                    return self.lex_field_name().map(Some);
                }
                LexState::ObjectField => return self.lex_field_name().map(Some),
                LexState::AfterValue => match c {
                    ',' => {
                        self.next_char();
                        self.state = match self.stack.last() {
                            Some(Container::Object) => LexState::ObjectField,
                            Some(Container::Array) => LexState::Value,
                            None => return Err(Error::decoding("',' outside a container")),
                        };
                    }
                    '}' => {
                        self.next_char();
                        return self.close(Container::Object).map(Some);
                    }
                    ']' => {
                        self.next_char();
                        return self.close(Container::Array).map(Some);
                    }
                    c => {
                        return Err(
                            self.err(format!("expected ',' or a closing bracket, found '{}'", c))
                        )
                    }
                },
            }
        }
    }

    fn close(&mut self, expected: Container) -> Result<JsonToken> {
        match self.stack.pop() {
            Some(c) if c == expected => {
                self.finish_value();
                Ok(match expected {
                    Container::Object => JsonToken::EndObject,
                    Container::Array => JsonToken::EndArray,
                })
            }
            Some(_) => Err(Error::decoding("mismatched closing bracket")),
            None => Err(Error::decoding("closing bracket without an open container")),
        }
    }

    fn finish_value(&mut self) {
        self.state = if self.stack.is_empty() {
            LexState::Value
        } else {
            LexState::AfterValue
        };
    }

    fn lex_value(&mut self) -> Result<JsonToken> {
        match self.peek_char() {
            Some('{') => {
                self.next_char();
                self.stack.push(Container::Object);
                self.state = LexState::ObjectFirst;
                Ok(JsonToken::StartObject)
            }
            Some('[') => {
                self.next_char();
                self.stack.push(Container::Array);
                self.state = LexState::ArrayFirst;
                Ok(JsonToken::StartArray)
            }
            Some('"') => {
                let s = self.lex_string()?;
                self.finish_value();
                Ok(JsonToken::Str(s))
            }
            Some('t') => {
                self.expect_keyword("true")?;
                self.finish_value();
                Ok(JsonToken::Bool(true))
            }
            Some('f') => {
                self.expect_keyword("false")?;
                self.finish_value();
                Ok(JsonToken::Bool(false))
            }
            Some('n') => {
                self.expect_keyword("null")?;
                self.finish_value();
                Ok(JsonToken::Null)
            }
            Some(c) if c == '-' || c.is_ascii_digit() => {
                let token = self.lex_number()?;
                self.finish_value();
                Ok(token)
            }
            Some(c) => Err(self.err(format!("unexpected character '{}'", c))),
            None => Err(self.err("unexpected end of input")),
        }
    }

    fn lex_field_name(&mut self) -> Result<JsonToken> {
        if self.peek_char() != Some('"') {
            return Err(self.err("expected a quoted field name"));
        }
        let name = self.lex_string()?;
        self.skip_whitespace();
        match self.next_char() {
            Some(':') => {
                self.state = LexState::Value;
                Ok(JsonToken::FieldName(name))
            }
            _ => Err(self.err("expected ':' after field name")),
        }
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<()> {
        for expected in keyword.chars() {
            if self.next_char() != Some(expected) {
                return Err(self.err(format!("invalid literal, expected '{}'", keyword)));
            }
        }
        Ok(())
    }

    fn lex_string(&mut self) -> Result<String> {
        self.next_char(); // opening quote
        let mut out = String::new();
        loop {
            match self.next_char() {
                None => return Err(self.err("unterminated string")),
                Some('"') => return Ok(out),
                Some('\\') => out.push(self.lex_escape()?),
                Some(c) if (c as u32) < 0x20 => {
                    return Err(self.err("unescaped control character in string"))
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn lex_escape(&mut self) -> Result<char> {
        match self.next_char() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => {
                let high = self.lex_hex4()?;
                if (0xD800..=0xDBFF).contains(&high) {
                    // Surrogate pair: the low half must follow immediately.
                    if self.next_char() != Some('\\') || self.next_char() != Some('u') {
                        return Err(self.err("unpaired surrogate in unicode escape"));
                    }
                    let low = self.lex_hex4()?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(self.err("invalid low surrogate in unicode escape"));
                    }
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(code).ok_or_else(|| self.err("invalid unicode code point"))
                } else {
                    char::from_u32(high).ok_or_else(|| self.err("unpaired surrogate in unicode escape"))
                }
            }
            Some(c) => Err(self.err(format!("invalid escape '\\{}'", c))),
            None => Err(self.err("unterminated string")),
        }
    }

    fn lex_hex4(&mut self) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let d = self
                .next_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.err("malformed unicode escape (expected 4 hex digits)"))?;
            code = code * 16 + d;
        }
        Ok(code)
    }

    fn take_digits(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.next_char();
            count += 1;
        }
        count
    }

    fn lex_number(&mut self) -> Result<JsonToken> {
        let start = self.position;
        if self.peek_char() == Some('-') {
            self.next_char();
        }
        if self.take_digits() == 0 {
            return Err(self.err("malformed number"));
        }
        let mut is_float = false;
        if self.peek_char() == Some('.') {
            is_float = true;
            self.next_char();
            if self.take_digits() == 0 {
                return Err(self.err("malformed number"));
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            is_float = true;
            self.next_char();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.next_char();
            }
            if self.take_digits() == 0 {
                return Err(self.err("malformed number"));
            }
        }
        let text = &self.input[start..self.position];
        if is_float {
            text.parse::<f64>()
                .map(JsonToken::Double)
                .map_err(|_| self.err("malformed number"))
        } else {
            match text.parse::<i64>() {
                Ok(i) => Ok(JsonToken::Int(i)),
                // Integer magnitude beyond 64 bits falls back to a double.
                Err(_) => text
                    .parse::<f64>()
                    .map(JsonToken::Double)
                    .map_err(|_| self.err("malformed number")),
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tag {
    Byte,
    Short,
    Long,
    Float,
    Decimal,
    Date,
    Time,
    Timestamp,
    Interval,
    Binary,
}

impl Tag {
    fn of(name: &str) -> Option<Tag> {
        match name {
            "$byte" => Some(Tag::Byte),
            "$short" => Some(Tag::Short),
            "$long" => Some(Tag::Long),
            "$float" => Some(Tag::Float),
            "$decimal" => Some(Tag::Decimal),
            "$date" => Some(Tag::Date),
            "$time" => Some(Tag::Time),
            "$timestamp" => Some(Tag::Timestamp),
            "$interval" => Some(Tag::Interval),
            "$binary" => Some(Tag::Binary),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Tag::Byte => "$byte",
            Tag::Short => "$short",
            Tag::Long => "$long",
            Tag::Float => "$float",
            Tag::Decimal => "$decimal",
            Tag::Date => "$date",
            Tag::Time => "$time",
            Tag::Timestamp => "$timestamp",
            Tag::Interval => "$interval",
            Tag::Binary => "$binary",
        }
    }

    fn decode(&self, payload: &JsonToken) -> Result<Value> {
        let fail = || {
            Error::decoding(format!(
                "malformed {} payload: {}",
                self.name(),
                payload.raw_text()
            ))
        };
        match (self, payload) {
            (Tag::Byte, JsonToken::Int(i)) => {
                i8::try_from(*i).map(Value::Byte).map_err(|_| fail())
            }
            (Tag::Short, JsonToken::Int(i)) => {
                i16::try_from(*i).map(Value::Short).map_err(|_| fail())
            }
            (Tag::Long, JsonToken::Int(i)) => Ok(Value::Long(*i)),
            (Tag::Interval, JsonToken::Int(i)) => Ok(Value::Interval(Interval::new(*i))),
            (Tag::Float, JsonToken::Int(i)) => Ok(Value::Float(*i as f32)),
            (Tag::Float, JsonToken::Double(d)) => Ok(Value::Float(*d as f32)),
            (Tag::Decimal, JsonToken::Str(s)) => {
                s.parse::<Decimal>().map(Value::Decimal).map_err(|_| fail())
            }
            (Tag::Decimal, JsonToken::Int(i)) => Ok(Value::Decimal(Decimal::from(*i))),
            (Tag::Decimal, JsonToken::Double(d)) => {
                Decimal::from_f64(*d).map(Value::Decimal).ok_or_else(fail)
            }
            (Tag::Date, JsonToken::Str(s)) => Date::parse(s).map(Value::Date).map_err(|_| fail()),
            (Tag::Time, JsonToken::Str(s)) => Time::parse(s).map(Value::Time).map_err(|_| fail()),
            (Tag::Timestamp, JsonToken::Str(s)) => {
                Timestamp::parse(s).map(Value::Timestamp).map_err(|_| fail())
            }
            (Tag::Binary, JsonToken::Str(s)) => {
                Base64::decode_vec(s).map(Value::Binary).map_err(|_| fail())
            }
            _ => Err(fail()),
        }
    }
}

enum Current {
    None,
    Structural(EventType),
    Field(String),
    Scalar(EventType, Value),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ReadState {
    Running,
    /// Root value delivered; the next call reports exhaustion.
    Drained,
    Exhausted,
    Failed,
}

/// A [`DocumentReader`] over tagged-JSON text.
///
/// Single-use for one document: reading past exhaustion, or after an
/// earlier failure, is an illegal-state error.
pub struct JsonDocumentReader<'de> {
    tokenizer: JsonTokenizer<'de>,
    lookahead: VecDeque<JsonToken>,
    depth: usize,
    current: Current,
    state: ReadState,
}

impl<'de> JsonDocumentReader<'de> {
    pub fn new(input: &'de str) -> Self {
        JsonDocumentReader {
            tokenizer: JsonTokenizer::new(input),
            lookahead: VecDeque::new(),
            depth: 0,
            current: Current::None,
            state: ReadState::Running,
        }
    }

    fn peek(&mut self, n: usize) -> Result<Option<&JsonToken>> {
        while self.lookahead.len() <= n {
            match self.tokenizer.next_token()? {
                Some(token) => self.lookahead.push_back(token),
                None => break,
            }
        }
        Ok(self.lookahead.get(n))
    }

    fn pull(&mut self) -> Result<Option<JsonToken>> {
        match self.lookahead.pop_front() {
            Some(token) => Ok(Some(token)),
            None => self.tokenizer.next_token(),
        }
    }

    /// True when more input follows the current document boundary.
    pub(crate) fn has_more(&mut self) -> Result<bool> {
        Ok(self.peek(0)?.is_some())
    }

    /// Fails on trailing content after the document just read.
    pub(crate) fn ensure_eof(&mut self) -> Result<()> {
        if self.has_more()? {
            Err(Error::decoding("trailing content after document"))
        } else {
            Ok(())
        }
    }

    /// Re-arms the reader for the next concatenated document.
    pub(crate) fn rearm(&mut self) {
        self.depth = 0;
        self.current = Current::None;
        self.state = ReadState::Running;
    }

    /// Commits a `{"$tag": scalar}` object to a single scalar, or leaves the
    /// buffered tokens alone and reports `None` for an ordinary map.
    fn try_tagged_scalar(&mut self) -> Result<Option<Value>> {
        let tag = match self.peek(0)? {
            Some(JsonToken::FieldName(name)) => match Tag::of(name) {
                Some(tag) => tag,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        match self.peek(1)? {
            Some(token) if token.is_scalar() => {}
            _ => return Ok(None),
        }
        if !matches!(self.peek(2)?, Some(JsonToken::EndObject)) {
            return Ok(None);
        }
        self.lookahead.pop_front(); // field name
        let Some(payload) = self.lookahead.pop_front() else {
            return Ok(None);
        };
        self.lookahead.pop_front(); // end object
        tag.decode(&payload).map(Some)
    }

    fn advance(&mut self) -> Result<Option<EventType>> {
        let Some(token) = self.pull()? else {
            return Ok(None);
        };
        let event = match token {
            JsonToken::StartObject => {
                if let Some(scalar) = self.try_tagged_scalar()? {
                    let event = scalar_event(&scalar);
                    self.current = Current::Scalar(event, scalar);
                    event
                } else {
                    self.depth += 1;
                    self.current = Current::Structural(EventType::StartMap);
                    EventType::StartMap
                }
            }
            JsonToken::EndObject => {
                self.depth -= 1;
                self.current = Current::Structural(EventType::EndMap);
                EventType::EndMap
            }
            JsonToken::StartArray => {
                self.depth += 1;
                self.current = Current::Structural(EventType::StartArray);
                EventType::StartArray
            }
            JsonToken::EndArray => {
                self.depth -= 1;
                self.current = Current::Structural(EventType::EndArray);
                EventType::EndArray
            }
            JsonToken::FieldName(name) => {
                self.current = Current::Field(name);
                EventType::FieldName
            }
            JsonToken::Str(s) => {
                self.current = Current::Scalar(EventType::String, Value::String(s));
                EventType::String
            }
            JsonToken::Int(i) => {
                // Untagged integers in i32 range are INT, wider are LONG.
                let value = match i32::try_from(i) {
                    Ok(v) => Value::Int(v),
                    Err(_) => Value::Long(i),
                };
                let event = scalar_event(&value);
                self.current = Current::Scalar(event, value);
                event
            }
            JsonToken::Double(d) => {
                self.current = Current::Scalar(EventType::Double, Value::Double(d));
                EventType::Double
            }
            JsonToken::Bool(b) => {
                self.current = Current::Scalar(EventType::Boolean, Value::Boolean(b));
                EventType::Boolean
            }
            JsonToken::Null => {
                self.current = Current::Scalar(EventType::Null, Value::Null);
                EventType::Null
            }
        };
        if self.depth == 0 && event != EventType::FieldName {
            self.state = ReadState::Drained;
        }
        Ok(Some(event))
    }
}

impl<'de> DocumentReader for JsonDocumentReader<'de> {
    fn next(&mut self) -> Result<Option<EventType>> {
        match self.state {
            ReadState::Running => {}
            ReadState::Drained => {
                self.current = Current::None;
                self.state = ReadState::Exhausted;
                return Ok(None);
            }
            ReadState::Exhausted => {
                return Err(Error::illegal_state("reader used after exhaustion"))
            }
            ReadState::Failed => {
                return Err(Error::illegal_state("reader unusable after an earlier failure"))
            }
        }
        match self.advance() {
            Ok(Some(event)) => Ok(Some(event)),
            Ok(None) => {
                self.state = ReadState::Exhausted;
                Ok(None)
            }
            Err(e) => {
                self.state = ReadState::Failed;
                Err(e)
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
            Current::Structural(e) => Err(Error::type_mismatch("a scalar event", e)),
            Current::Field(_) => Err(Error::type_mismatch("a scalar event", EventType::FieldName)),
        }
    }
}

/// An iterator of documents over input holding zero or more top-level
/// JSON documents, concatenated or whitespace-separated.
///
/// The first error ends the iteration.
pub struct JsonDocumentStream<'de> {
    reader: JsonDocumentReader<'de>,
    done: bool,
}

impl<'de> JsonDocumentStream<'de> {
    pub fn new(input: &'de str) -> Self {
        JsonDocumentStream {
            reader: JsonDocumentReader::new(input),
            done: false,
        }
    }
}

impl<'de> Iterator for JsonDocumentStream<'de> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.has_more() {
            Ok(false) => {
                self.done = true;
                None
            }
            Ok(true) => {
                self.reader.rearm();
                match Document::from_reader(&mut self.reader) {
                    Ok(doc) => Some(Ok(doc)),
                    Err(e) => {
                        self.done = true;
                        Some(Err(e))
                    }
                }
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
