//! Data model for parsed combat-log events.
//!
//! A [`ParsedEvent`] is built for one line, handed to the consumer, and then
//! forgotten by the stream that produced it.

use serde::{Deserialize, Serialize};

/// One combat-log line turned into structured fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    /// Event name, e.g. `SPELL_DAMAGE`.
    pub event_name: String,
    /// Parameters in left-to-right order, quotes already removed.
    pub parameters: Vec<String>,
    /// 1-based line number as configured by [`crate::config::LineNumbering`].
    pub line_number: usize,
    /// Timestamp text exactly as it appears in the source line.
    pub timestamp: String,
}

impl ParsedEvent {
    /// Create a new event.
    #[must_use]
    pub fn new(
        event_name: impl Into<String>,
        parameters: Vec<String>,
        line_number: usize,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            parameters,
            line_number,
            timestamp: timestamp.into(),
        }
    }

    /// Get the event name.
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Get all parameters.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Get the parameter at `index`, if present.
    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.parameters.get(index).map(String::as_str)
    }

    /// Number of parameters.
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Get the line number.
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    /// Get the unparsed timestamp text.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Check whether this line carried any timestamp text.
    pub fn has_timestamp(&self) -> bool {
        !self.timestamp.is_empty()
    }
}
