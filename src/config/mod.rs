//! Configuration for combat-log streams.
//!
//! Handles:
//! - Starting offset and line numbering
//! - Line format characters (separators, quote, escape)
//! - Strict vs lenient line decomposition
//! - Reader buffer sizing

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};
use crate::parser::LineFormat;

/// Default reader buffer capacity in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// How line numbers reported on events are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineNumbering {
    /// The first emitted line is line 1, regardless of offset.
    #[default]
    Relative,
    /// Raw file position: the first emitted line is `offset + 1`.
    Absolute,
}

/// Stream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Number of leading lines to skip without emitting.
    #[serde(default)]
    pub offset: usize,
    /// Line numbering mode.
    #[serde(default)]
    pub line_numbering: LineNumbering,
    /// Fail on lines without a timestamp separator instead of degrading.
    #[serde(default)]
    pub strict: bool,
    /// Reader buffer capacity in bytes.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Line format characters.
    #[serde(default)]
    pub format: FormatConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            offset: 0,
            line_numbering: LineNumbering::default(),
            strict: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            format: FormatConfig::default(),
        }
    }
}

impl ReaderConfig {
    /// Load configuration from the default location, or defaults if absent.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LogError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| LogError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the starting offset (builder pattern).
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the line numbering mode (builder pattern).
    #[must_use]
    pub fn with_line_numbering(mut self, numbering: LineNumbering) -> Self {
        self.line_numbering = numbering;
        self
    }

    /// Enable or disable strict mode (builder pattern).
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Check that the configuration can drive a stream.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(LogError::config("buffer_capacity must be greater than zero"));
        }
        self.line_format().map(|_| ())
    }

    /// Build the validated [`LineFormat`] described by this configuration.
    pub fn line_format(&self) -> Result<LineFormat> {
        LineFormat::new(
            &self.format.timestamp_separator,
            self.format.parameter_separator,
            self.format.quote,
            self.format.escape,
        )
    }

    /// Save configuration to a specific path as TOML.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LogError::config(format!("Failed to serialize config: {e}")))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LogError::io(format!("Failed to create directory: {}", parent.display()), e)
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| LogError::io(format!("Failed to write config: {}", path.display()), e))
    }
}

/// Line format configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Text between the timestamp and the event name.
    #[serde(default = "default_timestamp_separator")]
    pub timestamp_separator: String,
    /// Character between event name and parameters, and between parameters.
    #[serde(default = "default_parameter_separator")]
    pub parameter_separator: char,
    /// Quote character for quoted parameters.
    #[serde(default = "default_quote")]
    pub quote: char,
    /// Escape character for quotes inside quoted parameters.
    #[serde(default = "default_escape")]
    pub escape: char,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            timestamp_separator: default_timestamp_separator(),
            parameter_separator: default_parameter_separator(),
            quote: default_quote(),
            escape: default_escape(),
        }
    }
}

// Default value functions for serde
fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_timestamp_separator() -> String {
    "  ".to_string()
}

fn default_parameter_separator() -> char {
    ','
}

fn default_quote() -> char {
    '"'
}

fn default_escape() -> char {
    '\\'
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| LogError::config("config directory could not be determined"))?;

    Ok(config_dir.join("combatlog-stream").join("config.toml"))
}
