//! Combat-log line parsing.
//!
//! This module turns raw combat-log lines into [`ParsedEvent`]s:
//! - [`LineDecomposer`] separates timestamp, event name and parameter text
//! - [`LineSplitter`] tokenizes the parameter text with quote handling
//! - [`EventStream`] drives both over a buffered reader, one line at a time
//!
//! # Example
//!
//! ```rust
//! use combatlog_stream::parser::LineParser;
//!
//! let parser = LineParser::default();
//! let event = parser
//!     .parse_line(r#"12:34:56.789  SPELL_DAMAGE,"Player-1-0001",0,Fireball"#, 1)
//!     .unwrap();
//!
//! assert_eq!(event.event_name(), "SPELL_DAMAGE");
//! assert_eq!(event.parameters(), ["Player-1-0001", "0", "Fireball"]);
//! ```
//!
//! # Parsing Modes
//!
//! - **Lenient mode** (default): lines without a timestamp separator keep an
//!   empty timestamp and are counted as degraded
//! - **Strict mode**: such lines end the stream with [`LogError::MalformedLine`]

mod decompose;
mod splitter;
mod streaming;

use tracing::trace;

pub use decompose::{LineDecomposer, LineParts};
pub use splitter::LineSplitter;
pub use streaming::*;

use crate::config::{LineNumbering, ReaderConfig};
use crate::error::{LogError, Result};
use crate::model::ParsedEvent;

/// Separator, quote and escape characters of a combat-log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    timestamp_separator: String,
    parameter_separator: u8,
    quote: u8,
    escape: u8,
}

impl LineFormat {
    /// Create a validated line format.
    ///
    /// The parameter separator, quote and escape must be distinct ASCII
    /// characters and the timestamp separator must not be empty.
    pub fn new(
        timestamp_separator: &str,
        parameter_separator: char,
        quote: char,
        escape: char,
    ) -> Result<Self> {
        if timestamp_separator.is_empty() {
            return Err(LogError::config("timestamp_separator must not be empty"));
        }

        let parameter_separator = ascii_byte("parameter_separator", parameter_separator)?;
        let quote = ascii_byte("quote", quote)?;
        let escape = ascii_byte("escape", escape)?;

        if parameter_separator == quote || parameter_separator == escape || quote == escape {
            return Err(LogError::config(
                "parameter_separator, quote and escape must be distinct",
            ));
        }

        Ok(Self {
            timestamp_separator: timestamp_separator.to_string(),
            parameter_separator,
            quote,
            escape,
        })
    }

    /// Text between the timestamp and the event name.
    pub fn timestamp_separator(&self) -> &str {
        &self.timestamp_separator
    }

    /// Byte separating the event name and each parameter.
    pub const fn parameter_separator(&self) -> u8 {
        self.parameter_separator
    }

    /// Quote byte.
    pub const fn quote(&self) -> u8 {
        self.quote
    }

    /// Escape byte for quotes inside quoted tokens.
    pub const fn escape(&self) -> u8 {
        self.escape
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            timestamp_separator: "  ".to_string(),
            parameter_separator: b',',
            quote: b'"',
            escape: b'\\',
        }
    }
}

fn ascii_byte(name: &str, c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(LogError::config(format!("{name} must be an ASCII character, got {c:?}")))
    }
}

/// Decomposes and tokenizes single lines.
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    decomposer: LineDecomposer,
    splitter: LineSplitter,
    strict: bool,
}

impl LineParser {
    /// Create a lenient parser for the given format.
    #[must_use]
    pub fn new(format: &LineFormat) -> Self {
        Self {
            decomposer: LineDecomposer::new(format),
            splitter: LineSplitter::new(format),
            strict: false,
        }
    }

    /// Build a parser from a stream configuration.
    pub fn from_config(config: &ReaderConfig) -> Result<Self> {
        Ok(Self::new(&config.line_format()?).with_strict(config.strict))
    }

    /// Set strict mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether this parser rejects lines without a timestamp separator.
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Decompose `line`, applying the strict-mode check.
    pub fn decompose<'a>(&self, line: &'a str, line_number: usize) -> Result<LineParts<'a>> {
        let parts = self.decomposer.decompose(line);
        if self.strict && !parts.has_timestamp_separator {
            return Err(LogError::MalformedLine {
                line: line_number,
                reason: "missing timestamp separator".to_string(),
            });
        }
        Ok(parts)
    }

    /// Turn decomposed parts into an owned event.
    pub fn build_event(&self, parts: &LineParts<'_>, line_number: usize) -> ParsedEvent {
        let parameters = match parts.parameter_text {
            Some(text) => self.splitter.split(text),
            None => Vec::new(),
        };
        ParsedEvent::new(parts.event_name, parameters, line_number, parts.timestamp)
    }

    /// Parse one raw line into an event reported as `line_number`.
    pub fn parse_line(&self, line: &str, line_number: usize) -> Result<ParsedEvent> {
        let parts = self.decompose(line, line_number)?;
        Ok(self.build_event(&parts, line_number))
    }

    /// Tokenize parameter text on its own.
    pub fn split_parameters(&self, text: &str) -> Vec<String> {
        self.splitter.split(text)
    }
}

/// Statistics about a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Raw lines consumed from the source, skipped ones included.
    pub lines_read: usize,
    /// Lines consumed but not emitted because of the offset.
    pub lines_skipped: usize,
    /// Events handed to the consumer.
    pub events_emitted: usize,
    /// Emitted lines missing a timestamp or parameter separator.
    pub degraded_lines: usize,
}

/// Per-stream cursor shared by the sync and async readers.
#[derive(Debug)]
pub(crate) struct StreamCore {
    parser: LineParser,
    offset: usize,
    numbering: LineNumbering,
    position: usize,
    stats: ParseStats,
    done: bool,
}

impl StreamCore {
    pub(crate) fn new(config: &ReaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: LineParser::from_config(config)?,
            offset: config.offset,
            numbering: config.line_numbering,
            position: 0,
            stats: ParseStats::default(),
            done: false,
        })
    }

    pub(crate) const fn stats(&self) -> ParseStats {
        self.stats
    }

    pub(crate) const fn is_done(&self) -> bool {
        self.done
    }

    /// Raw position of the next line to be read.
    pub(crate) const fn next_position(&self) -> usize {
        self.position + 1
    }

    pub(crate) const fn needs_skip(&self) -> bool {
        self.position < self.offset
    }

    pub(crate) fn record_skip(&mut self) {
        self.position += 1;
        self.stats.lines_read += 1;
        self.stats.lines_skipped += 1;
    }

    /// Turn the next raw line into an event.
    pub(crate) fn emit(&mut self, line: &str) -> Result<ParsedEvent> {
        self.position += 1;
        self.stats.lines_read += 1;

        let line_number = match self.numbering {
            LineNumbering::Relative => self.position - self.offset,
            LineNumbering::Absolute => self.position,
        };

        let parts = match self.parser.decompose(line, line_number) {
            Ok(parts) => parts,
            Err(e) => return Err(self.fail(e)),
        };
        if parts.is_degraded() {
            self.stats.degraded_lines += 1;
            trace!(
                line = self.position,
                timestamp = parts.has_timestamp_separator,
                parameters = parts.parameter_text.is_some(),
                "Degraded line"
            );
        }

        self.stats.events_emitted += 1;
        Ok(self.parser.build_event(&parts, line_number))
    }

    /// Mark the stream terminated by `err`.
    pub(crate) fn fail(&mut self, err: LogError) -> LogError {
        self.done = true;
        err
    }

    pub(crate) fn finish(&mut self) {
        self.done = true;
    }
}

/// Finds line ends across buffered chunks.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. A `\r` at the end of a
/// chunk leaves `pending_lf` set so that a `\n` opening the next chunk is
/// swallowed instead of ending an empty line.
#[derive(Debug, Default)]
pub(crate) struct LineScanner {
    pending_lf: bool,
}

/// Result of scanning one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Scanned {
    /// Bytes to consume from the reader.
    pub consumed: usize,
    /// Whether the chunk held line content or a terminator.
    pub content: bool,
    /// Whether the line ended inside the chunk.
    pub complete: bool,
}

impl LineScanner {
    /// Scan `chunk`, appending line content to `line` when given.
    pub(crate) fn scan(&mut self, chunk: &[u8], line: Option<&mut Vec<u8>>) -> Scanned {
        let mut start = 0;
        if self.pending_lf && !chunk.is_empty() {
            self.pending_lf = false;
            if chunk[0] == b'\n' {
                start = 1;
            }
        }

        let rest = &chunk[start..];
        match rest.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                if let Some(line) = line {
                    line.extend_from_slice(&rest[..end]);
                }
                self.pending_lf = rest[end] == b'\r';
                Scanned {
                    consumed: start + end + 1,
                    content: true,
                    complete: true,
                }
            }
            None => {
                if let Some(line) = line {
                    line.extend_from_slice(rest);
                }
                Scanned {
                    consumed: chunk.len(),
                    content: !rest.is_empty(),
                    complete: false,
                }
            }
        }
    }
}

/// Decode a raw line, reporting invalid UTF-8 as `InvalidData`.
pub(crate) fn decode_line(raw: &[u8]) -> std::io::Result<&str> {
    std::str::from_utf8(raw)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spell_damage() {
        let event = LineParser::default()
            .parse_line(
                r#"12:34:56.789  SPELL_DAMAGE,"Player-1-0001",0,"Target-1-0002",Fireball,1200"#,
                1,
            )
            .unwrap();

        assert_eq!(event.timestamp(), "12:34:56.789");
        assert_eq!(event.event_name(), "SPELL_DAMAGE");
        assert_eq!(
            event.parameters(),
            ["Player-1-0001", "0", "Target-1-0002", "Fireball", "1200"]
        );
        assert_eq!(event.line_number(), 1);
    }

    #[test]
    fn test_event_without_parameters() {
        let event = LineParser::default().parse_line("t  ZONE_CHANGE", 4).unwrap();
        assert_eq!(event.event_name(), "ZONE_CHANGE");
        assert!(event.parameters().is_empty());
    }

    #[test]
    fn test_trailing_separator_gives_one_empty_parameter() {
        let event = LineParser::default().parse_line("t  EVT,", 1).unwrap();
        assert_eq!(event.parameters(), [""]);
    }

    #[test]
    fn test_lenient_missing_timestamp() {
        let event = LineParser::default().parse_line("EVT,1,2", 9).unwrap();
        assert_eq!(event.timestamp(), "");
        assert_eq!(event.event_name(), "EVT");
        assert_eq!(event.parameters(), ["1", "2"]);
    }

    #[test]
    fn test_strict_missing_timestamp() {
        let parser = LineParser::default().with_strict(true);
        let err = parser.parse_line("EVT,1,2", 9).unwrap_err();
        assert!(matches!(err, LogError::MalformedLine { line: 9, .. }));
    }

    #[test]
    fn test_line_format_validation() {
        assert!(LineFormat::new("", ',', '"', '\\').is_err());
        assert!(LineFormat::new("  ", '，', '"', '\\').is_err());
        assert!(LineFormat::new("  ", ',', ',', '\\').is_err());
        assert!(LineFormat::new("  ", ',', '"', '"').is_err());
        assert_eq!(LineFormat::new("  ", ',', '"', '\\').unwrap(), LineFormat::default());
    }

    fn scan_all(chunks: &[&[u8]]) -> Vec<Vec<u8>> {
        let mut scanner = LineScanner::default();
        let mut lines = Vec::new();
        let mut line = Vec::new();
        let mut pending = false;
        for chunk in chunks {
            let mut chunk: &[u8] = chunk;
            while !chunk.is_empty() {
                let scanned = scanner.scan(chunk, Some(&mut line));
                pending |= scanned.content;
                if scanned.complete {
                    lines.push(std::mem::take(&mut line));
                    pending = false;
                }
                chunk = &chunk[scanned.consumed..];
            }
        }
        if pending {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_scanner_terminators() {
        let lines = scan_all(&[b"a\nb\r\nc\rd"]);
        assert_eq!(lines, [b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]);
    }

    #[test]
    fn test_scanner_crlf_split_across_chunks() {
        let lines = scan_all(&[b"a\r", b"\nb\r", b"\r\n"]);
        assert_eq!(lines, [b"a".to_vec(), b"b".to_vec(), Vec::new()]);
    }

    #[test]
    fn test_scanner_trailing_crlf_adds_no_line() {
        let lines = scan_all(&[b"a\r", b"\n"]);
        assert_eq!(lines, [b"a".to_vec()]);
    }

    #[test]
    fn test_stream_core_numbering() {
        let config = ReaderConfig::default().with_offset(2);
        let mut core = StreamCore::new(&config).unwrap();
        core.record_skip();
        core.record_skip();
        assert!(!core.needs_skip());
        assert_eq!(core.emit("t  A,1").unwrap().line_number(), 1);

        let config = config.with_line_numbering(LineNumbering::Absolute);
        let mut core = StreamCore::new(&config).unwrap();
        core.record_skip();
        core.record_skip();
        assert_eq!(core.emit("t  A,1").unwrap().line_number(), 3);
        assert_eq!(core.stats().lines_skipped, 2);
        assert_eq!(core.stats().events_emitted, 1);
    }
}
