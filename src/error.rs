//! Error types for the document model, field-path parser, and JSON codec.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: malformed field-path text or malformed JSON input,
//!   with line/column information
//! - **Decoding Errors**: token-grammar violations and malformed extended-type
//!   payloads in the streaming reader
//! - **Type Mismatches**: a typed getter called against a value or event of a
//!   different kind
//! - **Illegal State**: reader/builder call-sequence violations
//!
//! All failures are surfaced synchronously at the point of detection; nothing
//! in this crate retries or recovers internally.
//!
//! ## Examples
//!
//! ```rust
//! use jsondoc::{Error, FieldPath};
//!
//! let result = FieldPath::parse("a.`unterminated");
//! assert!(matches!(result, Err(Error::Syntax { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by the document model and codec.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Syntax error in field-path text or JSON input
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// Token-grammar violation or malformed extended-type payload
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Value cannot be represented in the output encoding
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Typed getter called against an incompatible value kind or event
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Call-sequence violation on a reader or builder
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsondoc::Error;
    ///
    /// let err = Error::syntax(1, 5, "unexpected character");
    /// assert!(err.to_string().contains("column 5"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.into(),
        }
    }

    /// Creates a decoding error for a token-grammar violation or a malformed
    /// extended-type payload.
    pub fn decoding(msg: impl Into<String>) -> Self {
        Error::Decoding(msg.into())
    }

    /// Creates an encoding error for output that cannot be represented.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Error::Encoding(msg.into())
    }

    /// Creates a type-mismatch error naming the expected and actual kind.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsondoc::Error;
    ///
    /// let err = Error::type_mismatch("STRING", "INT");
    /// assert!(err.to_string().contains("expected STRING"));
    /// ```
    pub fn type_mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an illegal-state error for a call-sequence violation.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Error::IllegalState(msg.into())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsondoc::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
