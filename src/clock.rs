// src/clock.rs
//! Timestamps and host/process identity, kept separate from the dispatch loop so that tests can
//! reason about the rest of the system without caring what time it is.

use std::io;

use chrono::{SecondsFormat, Utc};

/// Produce the current time as an ISO-8601 string with an explicit UTC offset.
///
/// The zone suffix is always `+00:00`, per spec.md §4.4, regardless of the host's local
/// timezone: events are always timestamped in UTC.
#[must_use]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// The current process id, for use in log records and spawned-command environments.
#[must_use]
pub fn pid() -> u32 {
    std::process::id()
}

/// The local host's name.
///
/// # Errors
///
/// Propagates any `io::Error` from the underlying `gethostname` call. Per spec.md §4.8, failure
/// to determine the hostname is fatal at daemon startup.
pub fn hostname() -> io::Result<String> {
    Ok(hostname::get()?.to_string_lossy().into_owned())
}
