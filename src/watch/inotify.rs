// src/watch/inotify.rs
//! The real Linux `inotify` implementation of [`KernelWatch`](super::KernelWatch).
//!
//! This talks to the kernel directly through `libc`'s `inotify_init1`/`inotify_add_watch`/
//! `inotify_rm_watch`/`read`, in the style of `inotify-sys` (see
//! `examples/hannobraun-inotify-rs`) and the safe-wrapper conventions of `examples/cptpcrd-slibc`
//! (owning the fd in a `File` so it's closed on drop, converting `errno` to `io::Error` at each
//! FFI boundary). A high-level `inotify` wrapper crate would parse event buffers internally and
//! hide them; this module exists so the parsing in [`super::raw`] is a directly testable,
//! crate-owned unit, per spec.md §4.3/§8.

use std::ffi::CString;
use std::fs::File;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{AsRawFd, FromRawFd};
use std::path::Path;

use super::raw::{EVENT_HEADER, MAX_EVENTS, NAME_MAX};
use super::{KernelWatch, WatchDescriptor};
use crate::taxonomy::WatchMask;

/// A live `inotify` instance.
pub struct Inotify {
    fd: File,
}

impl Inotify {
    /// Initialize a new `inotify` instance.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from `inotify_init1`.
    pub fn new() -> io::Result<Self> {
        // SAFETY: `inotify_init1` has no preconditions; a negative return is the documented
        // error signal and is handled below.
        let raw_fd = unsafe { libc::inotify_init1(libc::IN_CLOEXEC) };
        if raw_fd < 0 {
            return Err(io::Error::last_os_error());
        }

        // SAFETY: `raw_fd` was just returned by `inotify_init1` and is owned here.
        let fd = unsafe { File::from_raw_fd(raw_fd) };
        Ok(Self { fd })
    }

    fn path_to_cstring(path: &Path) -> io::Result<CString> {
        CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }
}

impl KernelWatch for Inotify {
    fn register(&mut self, path: &Path, mask: WatchMask) -> io::Result<WatchDescriptor> {
        let cpath = Self::path_to_cstring(path)?;

        // SAFETY: `self.fd` is a valid inotify fd and `cpath` is a valid, NUL-terminated path.
        let wd = unsafe { libc::inotify_add_watch(self.fd.as_raw_fd(), cpath.as_ptr(), mask.bits()) };
        if wd < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(WatchDescriptor::new(wd))
    }

    fn unregister(&mut self, wd: WatchDescriptor) -> io::Result<()> {
        // SAFETY: `self.fd` is a valid inotify fd; `wd.raw()` was previously returned by
        // `inotify_add_watch` on this same instance.
        let result = unsafe { libc::inotify_rm_watch(self.fd.as_raw_fd(), wd.raw()) };
        if result < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn wait(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = vec![0_u8; MAX_EVENTS * (EVENT_HEADER + NAME_MAX)];

        // SAFETY: `buf` is a valid, appropriately-sized buffer for the duration of the call.
        let n = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr().cast(),
                buf.len(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }

        #[allow(clippy::cast_sign_loss)]
        buf.truncate(n as usize);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use super::{Inotify, KernelWatch};
    use crate::taxonomy::WatchMask;
    use crate::watch::raw::parse_buffer;

    #[test]
    fn watch_directory_then_create_yields_an_event() {
        let tempdir = tempfile::tempdir().expect("unable to create tempdir");

        let mut inotify = Inotify::new().expect("unable to initialize inotify");
        let wd = inotify
            .register(tempdir.path(), WatchMask::CREATE)
            .expect("unable to register watch");

        File::create(tempdir.path().join("test.log")).expect("failed to create temp file");

        let buf = inotify.wait().expect("failed to read events");
        let events = parse_buffer(&buf);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].wd, wd);
        assert_eq!(events[0].name(), "test.log");
    }

    #[test]
    fn watch_file_then_write_yields_an_event() {
        let tempdir = tempfile::tempdir().expect("unable to create tempdir");
        let file_path = tempdir.path().join("test.log");
        let mut file = File::create(&file_path).expect("failed to create temp file");

        let mut inotify = Inotify::new().expect("unable to initialize inotify");
        let wd = inotify
            .register(&file_path, WatchMask::MODIFY)
            .expect("unable to register watch");

        file.write_all(b"hello?").expect("unable to write to file");

        let buf = inotify.wait().expect("failed to read events");
        let events = parse_buffer(&buf);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].wd, wd);
        assert!(!events[0].has_name());
    }

    #[test]
    fn unregister_then_ignored_event_is_delivered() {
        let tempdir = tempfile::tempdir().expect("unable to create tempdir");

        let mut inotify = Inotify::new().expect("unable to initialize inotify");
        let wd = inotify
            .register(tempdir.path(), WatchMask::CREATE)
            .expect("unable to register watch");

        inotify.unregister(wd).expect("unable to unregister watch");

        let buf = inotify.wait().expect("failed to read events");
        let events = parse_buffer(&buf);

        assert_eq!(events.len(), 1);
        assert!(events[0].mask & (libc::IN_IGNORED as u32) != 0);
    }
}
