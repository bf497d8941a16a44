//! Command-line interface for combatlog-stream.
//!
//! `combatlog <FILE>` streams a combat log and prints one event per line,
//! either as tab-separated text or as JSON. Timing and completion logging
//! happen here, around the `began`/`finished` signals of the stream.

use std::io::{self, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use crate::config::{LineNumbering, ReaderConfig};
use crate::error::{LogError, Result};
use crate::handler::{drive_file, DriveOutcome, EventHandler};
use crate::model::ParsedEvent;

/// Stream a combat log as structured events.
#[derive(Debug, Parser)]
#[command(name = "combatlog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Combat log file to read.
    pub file: PathBuf,

    /// Number of leading lines to skip.
    #[arg(long, env = "COMBATLOG_OFFSET")]
    pub offset: Option<usize>,

    /// Report raw file positions instead of emission-relative line numbers.
    #[arg(long)]
    pub absolute_lines: bool,

    /// Fail on lines without a timestamp separator.
    #[arg(long)]
    pub strict: bool,

    /// Only print the number of events.
    #[arg(long)]
    pub count: bool,

    /// Output format for events.
    #[arg(short = 'o', long, default_value = "text", env = "COMBATLOG_OUTPUT")]
    pub output: OutputFormat,

    /// Path to custom configuration file.
    #[arg(long, env = "COMBATLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn", env = "COMBATLOG_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, default_value = "text", env = "COMBATLOG_LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Event output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `line<TAB>timestamp<TAB>event<TAB>p1|p2|...`
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Merge command-line overrides into a loaded configuration.
    #[must_use]
    pub fn apply_to(&self, mut config: ReaderConfig) -> ReaderConfig {
        if let Some(offset) = self.offset {
            config.offset = offset;
        }
        if self.absolute_lines {
            config.line_numbering = LineNumbering::Absolute;
        }
        if self.strict {
            config.strict = true;
        }
        config
    }
}

/// Writes events to an output and times the stream.
pub struct PrintHandler<W: Write> {
    out: W,
    format: OutputFormat,
    count_only: bool,
    started: Option<Instant>,
    write_error: Option<io::Error>,
}

impl<W: Write> PrintHandler<W> {
    /// Create a handler writing to `out`.
    pub fn new(out: W, format: OutputFormat, count_only: bool) -> Self {
        Self {
            out,
            format,
            count_only,
            started: None,
            write_error: None,
        }
    }

    /// Take the write error that stopped the stream, if any.
    pub fn take_write_error(&mut self) -> Option<io::Error> {
        self.write_error.take()
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_event(&mut self, event: &ParsedEvent) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(
                self.out,
                "{}\t{}\t{}\t{}",
                event.line_number(),
                event.timestamp(),
                event.event_name(),
                event.parameters().join("|")
            ),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, event).map_err(io::Error::from)?;
                self.out.write_all(b"\n")
            }
        }
    }
}

impl<W: Write> EventHandler for PrintHandler<W> {
    fn began(&mut self) {
        self.started = Some(Instant::now());
    }

    fn record(&mut self, event: ParsedEvent) -> ControlFlow<()> {
        if self.count_only {
            return ControlFlow::Continue(());
        }
        match self.write_event(&event) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                self.write_error = Some(e);
                ControlFlow::Break(())
            }
        }
    }

    fn finished(&mut self, total: usize) {
        if self.count_only {
            if let Err(e) = writeln!(self.out, "{total}") {
                self.write_error = Some(e);
            }
        }
        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        info!(events = total, elapsed_ms = elapsed.as_millis() as u64, "Finished reading log");
    }

    fn error(&mut self, error: &LogError) {
        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        warn!(error = %error, elapsed_ms = elapsed.as_millis() as u64, "Stream failed");
    }
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match &cli.config {
        Some(path) => ReaderConfig::load_from(path)?,
        None => ReaderConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load default config, using defaults");
            ReaderConfig::default()
        }),
    };
    let config = cli.apply_to(config);

    let stdout = io::stdout();
    let mut handler = PrintHandler::new(BufWriter::new(stdout.lock()), cli.output, cli.count);
    let outcome = drive_file(&cli.file, &config, &mut handler)?;

    if let Some(e) = handler.take_write_error() {
        // A closed pipe (e.g. `| head`) is a normal way to stop reading.
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(LogError::io("Failed to write output", e));
    }
    if let DriveOutcome::Stopped { emitted } = outcome {
        info!(events = emitted, "Stopped early");
    }

    handler
        .into_inner()
        .map(|_| ())
        .map_err(|e| LogError::io("Failed to flush output", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_to_filter() {
        assert_eq!(LogLevel::Error.to_filter_string(), "error");
        assert_eq!(LogLevel::Warn.to_filter_string(), "warn");
        assert_eq!(LogLevel::Trace.to_filter_string(), "trace");
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from(["combatlog", "log.txt", "--offset", "5", "--absolute-lines"]);
        let config = cli.apply_to(ReaderConfig::default().with_strict(true));

        assert_eq!(config.offset, 5);
        assert_eq!(config.line_numbering, LineNumbering::Absolute);
        assert!(config.strict);
    }

    #[test]
    fn test_print_handler_text() {
        let mut handler = PrintHandler::new(Vec::new(), OutputFormat::Text, false);
        handler.began();
        let _ = handler.record(ParsedEvent::new(
            "SPELL_HEAL",
            vec!["Player-1".to_string(), "Flash Heal".to_string()],
            1,
            "1:00:00.000",
        ));
        handler.finished(1);

        let out = String::from_utf8(handler.into_inner().unwrap()).unwrap();
        assert_eq!(out, "1\t1:00:00.000\tSPELL_HEAL\tPlayer-1|Flash Heal\n");
    }

    #[test]
    fn test_print_handler_count_only() {
        let mut handler = PrintHandler::new(Vec::new(), OutputFormat::Json, true);
        handler.began();
        let _ = handler.record(ParsedEvent::new("A", Vec::new(), 1, ""));
        let _ = handler.record(ParsedEvent::new("B", Vec::new(), 2, ""));
        handler.finished(2);

        let out = String::from_utf8(handler.into_inner().unwrap()).unwrap();
        assert_eq!(out, "2\n");
    }
}
