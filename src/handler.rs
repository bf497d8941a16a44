//! Push-based delivery of stream lifecycle signals.
//!
//! A consumer implements [`EventHandler`] and hands it to [`drive`] (or
//! [`drive_async`]). The signals arrive in this order:
//!
//! 1. `began` once
//! 2. `record` once per event, in line order
//! 3. either `finished` or `error`, at most once, and nothing after it
//!
//! If `record` breaks, the stream is dropped and no terminal signal follows.

use std::ops::ControlFlow;
use std::path::Path;

use futures::{Stream, StreamExt};

use crate::async_io::open_async_stream;
use crate::config::ReaderConfig;
use crate::error::{LogError, Result};
use crate::model::ParsedEvent;
use crate::parser::open_stream;

/// Receiver of stream lifecycle signals.
pub trait EventHandler {
    /// Called once before the first line is read.
    fn began(&mut self) {}

    /// Called for each event. Return `ControlFlow::Break` to stop early.
    fn record(&mut self, event: ParsedEvent) -> ControlFlow<()>;

    /// Called once after the last event.
    fn finished(&mut self, _total: usize) {}

    /// Called once when the stream fails.
    fn error(&mut self, _error: &LogError) {}
}

/// How a driven stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The source was exhausted.
    Finished {
        /// Events delivered.
        emitted: usize,
    },
    /// The handler stopped the stream.
    Stopped {
        /// Events delivered before stopping.
        emitted: usize,
    },
}

impl DriveOutcome {
    /// Number of events delivered.
    pub const fn emitted(&self) -> usize {
        match self {
            Self::Finished { emitted } | Self::Stopped { emitted } => *emitted,
        }
    }
}

/// Deliver every event of `events` to `handler`.
///
/// The error passed to `handler.error` is also returned.
pub fn drive<I, H>(events: I, handler: &mut H) -> Result<DriveOutcome>
where
    I: IntoIterator<Item = Result<ParsedEvent>>,
    H: EventHandler + ?Sized,
{
    handler.began();
    deliver(events, handler)
}

/// Open `path` and deliver its events to `handler`.
///
/// A file that cannot be opened is reported through `handler.error`.
pub fn drive_file<H>(path: impl AsRef<Path>, config: &ReaderConfig, handler: &mut H) -> Result<DriveOutcome>
where
    H: EventHandler + ?Sized,
{
    handler.began();
    match open_stream(path, config) {
        Ok(stream) => deliver(stream, handler),
        Err(e) => {
            handler.error(&e);
            Err(e)
        }
    }
}

fn deliver<I, H>(events: I, handler: &mut H) -> Result<DriveOutcome>
where
    I: IntoIterator<Item = Result<ParsedEvent>>,
    H: EventHandler + ?Sized,
{
    let mut emitted = 0;
    for item in events {
        match item {
            Ok(event) => {
                emitted += 1;
                if handler.record(event).is_break() {
                    return Ok(DriveOutcome::Stopped { emitted });
                }
            }
            Err(e) => {
                handler.error(&e);
                return Err(e);
            }
        }
    }

    handler.finished(emitted);
    Ok(DriveOutcome::Finished { emitted })
}

/// Deliver every event of an async stream to `handler`.
pub async fn drive_async<S, H>(events: S, handler: &mut H) -> Result<DriveOutcome>
where
    S: Stream<Item = Result<ParsedEvent>>,
    H: EventHandler + ?Sized,
{
    handler.began();
    deliver_async(events, handler).await
}

/// Open `path` with tokio and deliver its events to `handler`.
pub async fn drive_file_async<H>(
    path: impl AsRef<Path>,
    config: &ReaderConfig,
    handler: &mut H,
) -> Result<DriveOutcome>
where
    H: EventHandler + ?Sized,
{
    handler.began();
    match open_async_stream(path, config).await {
        Ok(stream) => deliver_async(stream.into_stream(), handler).await,
        Err(e) => {
            handler.error(&e);
            Err(e)
        }
    }
}

async fn deliver_async<S, H>(events: S, handler: &mut H) -> Result<DriveOutcome>
where
    S: Stream<Item = Result<ParsedEvent>>,
    H: EventHandler + ?Sized,
{
    futures::pin_mut!(events);

    let mut emitted = 0;
    while let Some(item) = events.next().await {
        match item {
            Ok(event) => {
                emitted += 1;
                if handler.record(event).is_break() {
                    return Ok(DriveOutcome::Stopped { emitted });
                }
            }
            Err(e) => {
                handler.error(&e);
                return Err(e);
            }
        }
    }

    handler.finished(emitted);
    Ok(DriveOutcome::Finished { emitted })
}
