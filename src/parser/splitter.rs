//! Quote-aware parameter tokenizer.

use super::LineFormat;

/// Splits the parameter portion of a combat-log line into tokens.
///
/// The scan is a single pass with no backtracking. A token starting with
/// the quote character is quoted: separators inside it are content unless
/// they directly follow an unescaped quote. A quoted token loses its first
/// and last character when it ends, so a token that never closes runs to
/// the end of the input and still has its final character dropped.
#[derive(Debug, Clone)]
pub struct LineSplitter {
    separator: u8,
    quote: u8,
    escape: u8,
    escaped_quote: String,
    quote_text: String,
}

impl LineSplitter {
    /// Create a splitter for the given line format.
    #[must_use]
    pub fn new(format: &LineFormat) -> Self {
        let quote = format.quote();
        let escape = format.escape();
        Self {
            separator: format.parameter_separator(),
            quote,
            escape,
            escaped_quote: [escape as char, quote as char].iter().collect(),
            quote_text: (quote as char).to_string(),
        }
    }

    /// Split `text` into tokens. Always returns at least one token.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        self.split_into(text, &mut tokens);
        tokens
    }

    /// Split `text` into `tokens`, clearing it first.
    pub fn split_into(&self, text: &str, tokens: &mut Vec<String>) {
        tokens.clear();

        let bytes = text.as_bytes();
        let mut start = 0;
        let mut quoted = bytes.first() == Some(&self.quote);

        for (i, &byte) in bytes.iter().enumerate() {
            if byte != self.separator {
                continue;
            }
            if quoted && !self.closes_before(bytes, start, i) {
                continue;
            }

            tokens.push(self.finish_token(&text[start..i], quoted));
            start = i + 1;
            quoted = bytes.get(start) == Some(&self.quote);
        }

        tokens.push(self.finish_token(&text[start..], quoted));
    }

    /// Whether the separator at `end` closes the quoted token at `start`.
    fn closes_before(&self, bytes: &[u8], start: usize, end: usize) -> bool {
        end > start
            && bytes[end - 1] == self.quote
            && (end - start < 2 || bytes[end - 2] != self.escape)
    }

    fn finish_token(&self, raw: &str, quoted: bool) -> String {
        if !quoted {
            return raw.to_string();
        }

        // Delimiting quotes are dropped by position, closed or not.
        let mut chars = raw.chars();
        chars.next();
        chars.next_back();
        let inner = chars.as_str();

        if inner.as_bytes().contains(&self.escape) {
            inner.replace(&self.escaped_quote, &self.quote_text)
        } else {
            inner.to_string()
        }
    }
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(&LineFormat::default())
    }
}
