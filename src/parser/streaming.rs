//! Streaming combat-log reader for large files.
//!
//! Lines are read one at a time from a buffered reader; only the current
//! line is held in memory. Lines end at `\n`, `\r\n` or a lone `\r`. Lines
//! before the configured offset are consumed byte-wise and never decoded.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;

use tracing::{debug, instrument};

use super::{decode_line, LineScanner, ParseStats, StreamCore};
use crate::config::ReaderConfig;
use crate::error::{LogError, Result};
use crate::model::ParsedEvent;

/// Pull-based stream of events over a buffered reader.
///
/// Single pass: once it has returned `None` or an error it yields nothing
/// more. Dropping it releases the reader.
pub struct EventStream<R> {
    reader: R,
    core: StreamCore,
    scanner: LineScanner,
    buffer: Vec<u8>,
}

impl<R: BufRead> EventStream<R> {
    /// Create a stream over `reader`.
    pub fn new(reader: R, config: &ReaderConfig) -> Result<Self> {
        Ok(Self {
            reader,
            core: StreamCore::new(config)?,
            scanner: LineScanner::default(),
            buffer: Vec::with_capacity(4096),
        })
    }

    /// Get statistics for the lines consumed so far.
    #[must_use]
    pub const fn stats(&self) -> ParseStats {
        self.core.stats()
    }

    /// Read the next event.
    pub fn next_event(&mut self) -> Option<Result<ParsedEvent>> {
        if self.core.is_done() {
            return None;
        }

        while self.core.needs_skip() {
            let position = self.core.next_position();
            match read_line(&mut self.reader, &mut self.scanner, None) {
                Ok(true) => self.core.record_skip(),
                Ok(false) => {
                    self.core.finish();
                    return None;
                }
                Err(e) => return Some(Err(self.core.fail(LogError::read(position, e)))),
            }
        }

        self.buffer.clear();
        let position = self.core.next_position();
        match read_line(&mut self.reader, &mut self.scanner, Some(&mut self.buffer)) {
            Ok(false) => {
                self.core.finish();
                None
            }
            Ok(true) => match decode_line(&self.buffer) {
                Ok(line) => Some(self.core.emit(line)),
                Err(e) => Some(Err(self.core.fail(LogError::read(position, e)))),
            },
            Err(e) => Some(Err(self.core.fail(LogError::read(position, e)))),
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<ParsedEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

impl<R: BufRead> FusedIterator for EventStream<R> {}

/// Read one raw line into `line`, or just consume it when `line` is `None`.
/// Returns `false` at end of input.
fn read_line<R: BufRead>(
    reader: &mut R,
    scanner: &mut LineScanner,
    mut line: Option<&mut Vec<u8>>,
) -> io::Result<bool> {
    let mut read_any = false;
    loop {
        let scanned = {
            let available = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(read_any);
            }
            scanner.scan(available, line.as_deref_mut())
        };

        reader.consume(scanned.consumed);
        read_any |= scanned.content;
        if scanned.complete {
            return Ok(true);
        }
    }
}

/// Create a stream over in-memory text.
pub fn stream_str<'a>(content: &'a str, config: &ReaderConfig) -> Result<EventStream<&'a [u8]>> {
    EventStream::new(content.as_bytes(), config)
}

/// Open a log file for streaming.
#[instrument(skip_all, fields(path = %path.as_ref().display(), offset = config.offset))]
pub fn open_stream(
    path: impl AsRef<Path>,
    config: &ReaderConfig,
) -> Result<EventStream<BufReader<File>>> {
    let path = path.as_ref();
    config.validate()?;

    let file = File::open(path).map_err(|e| LogError::open(path, e))?;
    debug!("Opened log file");

    EventStream::new(BufReader::with_capacity(config.buffer_capacity, file), config)
}
