//! Splitting a raw line into timestamp, event name and parameter text.

use super::LineFormat;

/// Borrowed view of one decomposed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParts<'a> {
    /// Text before the timestamp separator; empty when the separator is missing.
    pub timestamp: &'a str,
    /// Text between the timestamp separator and the first parameter separator.
    pub event_name: &'a str,
    /// Text after the first parameter separator, if there was one.
    pub parameter_text: Option<&'a str>,
    /// Whether the timestamp separator was found.
    pub has_timestamp_separator: bool,
}

impl LineParts<'_> {
    /// A line that needed a fallback to decompose.
    pub const fn is_degraded(&self) -> bool {
        !self.has_timestamp_separator || self.parameter_text.is_none()
    }
}

/// Locates the timestamp and event-name boundaries of a line.
#[derive(Debug, Clone)]
pub struct LineDecomposer {
    timestamp_separator: String,
    parameter_separator: char,
}

impl LineDecomposer {
    /// Create a decomposer for the given line format.
    #[must_use]
    pub fn new(format: &LineFormat) -> Self {
        Self {
            timestamp_separator: format.timestamp_separator().to_string(),
            parameter_separator: format.parameter_separator() as char,
        }
    }

    /// Decompose `line`.
    ///
    /// Without a timestamp separator the whole line is the remainder and the
    /// timestamp is empty. Without a parameter separator the remainder is
    /// the event name and there is no parameter text.
    pub fn decompose<'a>(&self, line: &'a str) -> LineParts<'a> {
        let (timestamp, remainder, has_timestamp_separator) =
            match line.split_once(self.timestamp_separator.as_str()) {
                Some((timestamp, remainder)) => (timestamp, remainder, true),
                None => ("", line, false),
            };

        let (event_name, parameter_text) = match remainder.split_once(self.parameter_separator) {
            Some((name, params)) => (name, Some(params)),
            None => (remainder, None),
        };

        LineParts {
            timestamp,
            event_name,
            parameter_text,
            has_timestamp_separator,
        }
    }
}

impl Default for LineDecomposer {
    fn default() -> Self {
        Self::new(&LineFormat::default())
    }
}
