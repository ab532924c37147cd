// src/watch/raw.rs
//! Parsing of the raw `inotify` event buffer: spec.md §4.3/§8.
//!
//! A high-level `inotify` wrapper crate would hide this parsing inside its own `Events` iterator.
//! This crate owns it directly instead, because spec.md calls out the variable-length record
//! parser as a directly testable unit (the parse-then-reconstruct round trip in §8), and the
//! dispatch loop needs the parsed records one at a time rather than as an opaque iterator tied to
//! the buffer's lifetime.

use std::mem;

use super::WatchDescriptor;

/// Size of the fixed `struct inotify_event` header: `wd: i32, mask: u32, cookie: u32, len: u32`.
pub const EVENT_HEADER: usize = mem::size_of::<i32>() + 3 * mem::size_of::<u32>();

/// `NAME_MAX` on Linux: the largest a single path component can be.
pub const NAME_MAX: usize = 255;

/// The largest number of events this crate will read in a single `wait()` call.
pub const MAX_EVENTS: usize = 1024;

/// One parsed `inotify` event record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawEvent {
    /// The watch descriptor this event is for.
    pub wd: WatchDescriptor,
    /// The raw kernel event mask.
    pub mask: u32,
    /// An opaque cookie correlating related rename events; unused by this crate, but part of
    /// the wire format and round-tripped for completeness.
    pub cookie: u32,
    /// The raw, possibly NUL-padded, name bytes following the header.
    name_bytes: Vec<u8>,
}

impl RawEvent {
    /// The event's object name, with any trailing NUL padding stripped.
    ///
    /// Returns an empty string if this event carries no name (i.e. the event is for the watched
    /// path itself, rather than an entry inside it).
    #[must_use]
    pub fn name(&self) -> &str {
        let end = self
            .name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.name_bytes.len());
        std::str::from_utf8(&self.name_bytes[..end]).unwrap_or("")
    }

    /// Whether this event carries a name, i.e. it describes something inside a watched
    /// directory rather than the watched path itself.
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.name_bytes.is_empty()
    }

    /// Re-encode this event as the header+name bytes it was parsed from.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(EVENT_HEADER + self.name_bytes.len());
        out.extend_from_slice(&self.wd.raw().to_ne_bytes());
        out.extend_from_slice(&self.mask.to_ne_bytes());
        out.extend_from_slice(&self.cookie.to_ne_bytes());
        #[allow(clippy::cast_possible_truncation)]
        out.extend_from_slice(&(self.name_bytes.len() as u32).to_ne_bytes());
        out.extend_from_slice(&self.name_bytes);
        out
    }

    /// Build a `RawEvent` for tests, padding `name` to a 4-byte boundary with NULs the way the
    /// kernel does.
    #[cfg(test)]
    pub fn for_test(wd: i32, mask: u32, cookie: u32, name: &str) -> Self {
        let mut name_bytes = name.as_bytes().to_vec();
        if !name_bytes.is_empty() {
            name_bytes.push(0);
            while name_bytes.len() % 4 != 0 {
                name_bytes.push(0);
            }
        }
        Self {
            wd: WatchDescriptor::new(wd),
            mask,
            cookie,
            name_bytes,
        }
    }
}

/// Parse a concatenated buffer of variable-length `inotify` event records, as produced by
/// [`super::inotify::Inotify::wait`].
///
/// Parsing advances by `EVENT_HEADER + name_len` for each record, per spec.md §4.3. Malformed
/// trailing bytes (fewer than `EVENT_HEADER` remaining) are ignored; the kernel never produces
/// them, but a defensive stop avoids a panic if it ever did.
#[must_use]
pub fn parse_buffer(buf: &[u8]) -> Vec<RawEvent> {
    let mut events = Vec::new();
    let mut offset = 0;

    while offset + EVENT_HEADER <= buf.len() {
        let wd = i32::from_ne_bytes(buf[offset..offset + 4].try_into().unwrap());
        let mask = u32::from_ne_bytes(buf[offset + 4..offset + 8].try_into().unwrap());
        let cookie = u32::from_ne_bytes(buf[offset + 8..offset + 12].try_into().unwrap());
        let name_len = u32::from_ne_bytes(buf[offset + 12..offset + 16].try_into().unwrap())
            as usize;

        let name_start = offset + EVENT_HEADER;
        let name_end = name_start + name_len;
        if name_end > buf.len() {
            break;
        }

        events.push(RawEvent {
            wd: WatchDescriptor::new(wd),
            mask,
            cookie,
            name_bytes: buf[name_start..name_end].to_vec(),
        });

        offset = name_end;
    }

    events
}

/// Re-concatenate parsed events back into a buffer, for the round-trip property in spec.md §8.
#[must_use]
pub fn encode_buffer(events: &[RawEvent]) -> Vec<u8> {
    events.iter().flat_map(RawEvent::to_bytes).collect()
}
