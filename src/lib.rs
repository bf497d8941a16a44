//! combatlog-stream: streaming parser for line-oriented combat logs.
//!
//! Each raw line of a combat log looks like
//!
//! ```text
//! 12:34:56.789  SPELL_DAMAGE,"Player-1-0001",0,"Target-1-0002",Fireball,1200
//! ```
//!
//! and becomes a [`ParsedEvent`] with the timestamp text, the event name and
//! the quote-aware list of parameters. Files are read one line at a time, so
//! memory use does not grow with file size.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use combatlog_stream::{config::ReaderConfig, parser::open_stream};
//!
//! fn main() -> combatlog_stream::Result<()> {
//!     let config = ReaderConfig::default().with_offset(1);
//!
//!     for event in open_stream("WoWCombatLog.txt", &config)? {
//!         let event = event?;
//!         println!("{} {:?}", event.event_name(), event.parameters());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`parser`]: line decomposition, tokenizing and the blocking stream
//! - [`async_io`]: the same stream on tokio
//! - [`handler`]: push-based `began`/`record`/`finished`/`error` delivery
//! - [`model`]: the [`ParsedEvent`] record
//! - [`config`]: stream configuration and TOML loading
//! - [`cli`]: command-line front end
//! - [`error`]: error types and handling

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod async_io;
pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod parser;

// Re-export commonly used types at the crate root
pub use error::{LogError, Result};
pub use model::ParsedEvent;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::async_io::{open_async_stream, AsyncEventStream};
    pub use crate::config::{LineNumbering, ReaderConfig};
    pub use crate::error::{LogError, Result};
    pub use crate::handler::{drive, drive_async, DriveOutcome, EventHandler};
    pub use crate::model::ParsedEvent;
    pub use crate::parser::{open_stream, EventStream, LineFormat, LineParser, LineSplitter};
}
