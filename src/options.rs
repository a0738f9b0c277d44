//! Configuration options for the tagged-JSON writer.
//!
//! ## Examples
//!
//! ```rust
//! use jsondoc::{doc, JsonOptions};
//!
//! let value = doc!({ "n": 1 });
//! let doc = value.get_map().unwrap();
//!
//! // Compact, tagged output (the default).
//! let compact = doc.to_json_string().unwrap();
//! assert_eq!(compact, r#"{"n":1}"#);
//!
//! // Pretty-printed output.
//! let options = JsonOptions::pretty();
//! let pretty = doc.to_json_string_with_options(&options).unwrap();
//! assert!(pretty.contains('\n'));
//! ```

/// Output options for [`JsonDocumentBuilder`](crate::JsonDocumentBuilder).
///
/// `with_tags` controls extended-type fidelity: when off, DECIMAL, DATE,
/// TIME, TIMESTAMP, INTERVAL and BINARY degrade to plain strings and
/// numbers, and a later read cannot reconstruct their kinds from the text
/// alone.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonOptions {
    pub pretty: bool,
    pub with_tags: bool,
    pub indent: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions {
            pretty: false,
            with_tags: true,
            indent: 2,
        }
    }
}

impl JsonOptions {
    /// Creates default options (compact output, tags on, 2-space indent).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pretty-printed output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsondoc::JsonOptions;
    ///
    /// let options = JsonOptions::pretty();
    /// assert!(options.pretty);
    /// ```
    #[must_use]
    pub fn pretty() -> Self {
        JsonOptions {
            pretty: true,
            ..Default::default()
        }
    }

    /// Turns pretty-printing on or off.
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Turns extended-type tags on or off.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsondoc::JsonOptions;
    ///
    /// let options = JsonOptions::new().with_tags(false);
    /// assert!(!options.with_tags);
    /// ```
    #[must_use]
    pub fn with_tags(mut self, with_tags: bool) -> Self {
        self.with_tags = with_tags;
        self
    }

    /// Sets the indentation size for pretty-printed output. Default is 2.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
