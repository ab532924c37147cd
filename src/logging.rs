// src/logging.rs
//! The "external log sink" contract from spec.md §6: an append-only stream of
//! `"<iso8601>, <pid>, <level>, <message>"` records.
//!
//! This is deliberately separate from the `log` facade the rest of the crate uses for
//! developer-facing diagnostics (`log::debug!`/`log::warn!`/...): spec.md's five levels
//! (`Info`/`Warning`/`Error`/`Event`/`Debug`) don't line up with `log::Level`'s five
//! (`Error`/`Warn`/`Info`/`Debug`/`Trace`), and spec.md frames the sink as a distinct external
//! collaborator the core only needs to hold a contract with, not a specific backend.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::clock;

/// One of the five record levels the external log sink accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    /// Informational records, e.g. successful registration.
    Info,
    /// Recoverable problems, e.g. a rule moved to `bad`.
    Warning,
    /// Unrecoverable-for-this-operation problems, e.g. a spawn failure.
    Error,
    /// A dispatched filesystem event.
    Event,
    /// Verbose diagnostics.
    Debug,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "Info",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Event => "Event",
            Level::Debug => "Debug",
        }
    }
}

/// An append-only sink for `"<iso8601>, <pid>, <level>, <message>"` records.
///
/// Rotation and level filtering are the sink's responsibility, per spec.md §6; this crate writes
/// records and otherwise leaves the sink alone.
pub trait Sink {
    /// Append one record to the sink.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from the underlying write.
    fn write_record(&mut self, level: Level, message: &str) -> io::Result<()>;
}

/// A [`Sink`] that appends records to a file.
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Open (creating if necessary) a log file at `path` for appending.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from opening the file.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl Sink for FileSink {
    fn write_record(&mut self, level: Level, message: &str) -> io::Result<()> {
        writeln!(
            self.file,
            "{}, {}, {}, {}",
            clock::now_iso8601(),
            clock::pid(),
            level.as_str(),
            message
        )
    }
}
