// src/watch/mod.rs
//! The kernel watch adapter: spec.md §4.3.
//!
//! [`KernelWatch`] is a thin, platform-specific trait wrapping `inotify`. The [`inotify`] module
//! holds the real Linux implementation (backed directly by `libc`, see its module docs for why);
//! [`mock`] holds an in-memory implementation used by the rest of the crate's tests, following
//! a `Rc<RefCell<..>>`-backed mock-watcher pattern.

pub mod inotify;
#[cfg(test)]
pub mod mock;
pub mod raw;

use std::io;
use std::path::Path;

use crate::taxonomy::WatchMask;

pub use inotify::Inotify;
pub use raw::RawEvent;

/// An opaque kernel-assigned watch descriptor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct WatchDescriptor(i32);

impl WatchDescriptor {
    /// Wrap a raw descriptor value.
    #[must_use]
    pub(crate) fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw descriptor value, as returned by `inotify_add_watch`.
    #[must_use]
    pub fn raw(self) -> i32 {
        self.0
    }
}

/// A platform watch adapter: initialize, register, unregister, and block for raw event bytes.
///
/// This is deliberately low-level: callers (the [`dispatch`](crate::dispatch) loop) own parsing
/// the bytes returned by [`wait`](Self::wait) into [`RawEvent`]s via [`raw::parse_buffer`].
pub trait KernelWatch {
    /// Register a watch on `path` for the kernel event classes in `mask`.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from the underlying `inotify_add_watch` call.
    fn register(&mut self, path: &Path, mask: WatchMask) -> io::Result<WatchDescriptor>;

    /// Remove a previously registered watch.
    ///
    /// This is a no-op if `wd` is already unregistered (e.g. because the kernel already
    /// invalidated it).
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from the underlying `inotify_rm_watch` call.
    fn unregister(&mut self, wd: WatchDescriptor) -> io::Result<()>;

    /// Block until at least one event is available, and return the raw event buffer.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from the underlying `read` call.
    fn wait(&mut self) -> io::Result<Vec<u8>>;
}
