//! Async combat-log streaming.
//!
//! The async reader mirrors [`crate::parser::EventStream`] on top of tokio:
//! it suspends only while waiting for the underlying reader to produce more
//! bytes, and it yields the same events in the same order.

use std::io;
use std::path::Path;

use futures::Stream;
use tokio::fs;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, instrument};

use crate::config::ReaderConfig;
use crate::error::{LogError, Result};
use crate::model::ParsedEvent;
use crate::parser::{decode_line, LineScanner, ParseStats, StreamCore};

/// Async pull-based stream of events.
pub struct AsyncEventStream<R> {
    reader: R,
    core: StreamCore,
    scanner: LineScanner,
    buffer: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> AsyncEventStream<R> {
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
    pub async fn next_event(&mut self) -> Option<Result<ParsedEvent>> {
        if self.core.is_done() {
            return None;
        }

        while self.core.needs_skip() {
            let position = self.core.next_position();
            match read_line(&mut self.reader, &mut self.scanner, None).await {
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
        match read_line(&mut self.reader, &mut self.scanner, Some(&mut self.buffer)).await {
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

    /// Convert into a [`futures::Stream`] of events.
    pub fn into_stream(self) -> impl Stream<Item = Result<ParsedEvent>> {
        futures::stream::unfold(self, |mut stream| async move {
            stream.next_event().await.map(|item| (item, stream))
        })
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    scanner: &mut LineScanner,
    mut line: Option<&mut Vec<u8>>,
) -> io::Result<bool> {
    let mut read_any = false;
    loop {
        let scanned = {
            let available = reader.fill_buf().await?;
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

/// Open a log file for async streaming.
#[instrument(skip_all, fields(path = %path.as_ref().display(), offset = config.offset))]
pub async fn open_async_stream(
    path: impl AsRef<Path>,
    config: &ReaderConfig,
) -> Result<AsyncEventStream<BufReader<fs::File>>> {
    let path = path.as_ref();
    config.validate()?;

    let file = fs::File::open(path)
        .await
        .map_err(|e| LogError::open(path, e))?;
    debug!("Opened log file");

    AsyncEventStream::new(BufReader::with_capacity(config.buffer_capacity, file), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_async_events_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("WoWCombatLog.txt");
        tokio::fs::write(
            &path,
            "1:00:00.000  ENCOUNTER_START,2902,\"Ulgrax the Devourer\",16,20\n\
             1:00:05.000  UNIT_DIED,0000000000000000,nil,0x80000000,\"Creature-0-1\"\n",
        )
        .await
        .unwrap();

        let stream = open_async_stream(&path, &ReaderConfig::default()).await.unwrap();
        let events: Vec<_> = stream.into_stream().collect().await;

        assert_eq!(events.len(), 2);
        let first = events[0].as_ref().unwrap();
        assert_eq!(first.event_name(), "ENCOUNTER_START");
        assert_eq!(first.parameter(1), Some("Ulgrax the Devourer"));
        assert_eq!(events[1].as_ref().unwrap().line_number(), 2);
    }

    #[tokio::test]
    async fn test_async_offset() {
        let content: &[u8] = b"t  A,1\nt  B,2\nt  C,3\n";
        let mut stream =
            AsyncEventStream::new(content, &ReaderConfig::default().with_offset(2)).unwrap();

        let event = stream.next_event().await.unwrap().unwrap();
        assert_eq!(event.event_name(), "C");
        assert_eq!(event.line_number(), 1);
        assert!(stream.next_event().await.is_none());
        assert_eq!(stream.stats().lines_skipped, 2);
    }

    #[tokio::test]
    async fn test_async_carriage_return_terminators() {
        let content: &[u8] = b"t  A,1\rt  B,2\r";
        let events: Vec<_> = AsyncEventStream::new(content, &ReaderConfig::default())
            .unwrap()
            .into_stream()
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap().parameters(), ["1"]);
        assert_eq!(events[1].as_ref().unwrap().event_name(), "B");
    }

    #[tokio::test]
    async fn test_async_empty_input() {
        let content: &[u8] = b"";
        let mut stream = AsyncEventStream::new(content, &ReaderConfig::default()).unwrap();
        assert!(stream.next_event().await.is_none());
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_async_open_missing_file() {
        let dir = tempdir().unwrap();
        let result = open_async_stream(dir.path().join("nope.txt"), &ReaderConfig::default()).await;
        assert!(matches!(result, Err(LogError::FileNotFound { .. })));
    }
}
