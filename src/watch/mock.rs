// src/watch/mock.rs
//! An in-memory [`KernelWatch`] implementation used by the rest of the crate's tests.
//!
//! A `Rc<RefCell<..>>`-backed mock that can be cloned (so a test can hold a handle to simulate
//! events while the dispatcher owns its own clone), plus `simulate_*` methods that both perform
//! the real filesystem operation (so dispatch-loop code that reads files back still works in
//! tests) and queue the matching raw event for the next `wait()`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::raw::{encode_buffer, RawEvent};
use super::{KernelWatch, WatchDescriptor};
use crate::taxonomy::WatchMask;

struct Inner {
    next_wd: i32,
    watched: HashMap<PathBuf, WatchDescriptor>,
    pending: Vec<RawEvent>,
}

/// A mock [`KernelWatch`] for deterministic, filesystem-free-of-a-real-`inotify` tests.
pub struct Watcher {
    inner: Rc<RefCell<Inner>>,
}

impl Watcher {
    /// Create a new, empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_wd: 1,
                watched: HashMap::new(),
                pending: Vec::new(),
            })),
        }
    }

    fn wd_for(&self, path: &Path) -> WatchDescriptor {
        self.inner.borrow().watched[path]
    }

    /// Simulate a new file appearing in an already-watched directory.
    ///
    /// # Panics
    ///
    /// Panics if `dir_path` is not currently watched.
    pub fn simulate_new_file(&self, dir_path: &Path, name: &str) -> io::Result<PathBuf> {
        let wd = self.wd_for(dir_path);
        let path = dir_path.join(name);
        File::create(&path)?;

        self.inner
            .borrow_mut()
            .pending
            .push(RawEvent::for_test(wd.raw(), WatchMask::CREATE.bits(), 0, name));
        Ok(path)
    }

    /// Simulate a write to an already-watched file.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not currently watched.
    pub fn simulate_write(&self, path: &Path, text: &str) -> io::Result<()> {
        let wd = self.wd_for(path);
        write!(OpenOptions::new().append(true).open(path)?, "{}", text)?;

        self.inner.borrow_mut().pending.push(RawEvent::for_test(
            wd.raw(),
            WatchMask::MODIFY.bits(),
            0,
            "",
        ));
        Ok(())
    }

    /// Simulate deletion of an already-watched file: one `delete_self` event followed by the
    /// kernel's automatic `ignored` event, matching real `inotify` behaviour.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not currently watched.
    pub fn simulate_delete(&self, path: &Path) -> io::Result<()> {
        let wd = self.wd_for(path);
        fs::remove_file(path)?;

        let mut inner = self.inner.borrow_mut();
        inner.pending.push(RawEvent::for_test(
            wd.raw(),
            WatchMask::DELETE_SELF.bits(),
            0,
            "",
        ));
        inner.pending.push(RawEvent::for_test(
            wd.raw(),
            libc::IN_IGNORED as u32,
            0,
            "",
        ));
        inner.watched.retain(|_, &mut v| v != wd);
        Ok(())
    }
}

impl Default for Watcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Watcher {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl KernelWatch for Watcher {
    fn register(&mut self, path: &Path, _mask: WatchMask) -> io::Result<WatchDescriptor> {
        let mut inner = self.inner.borrow_mut();

        if !path.exists() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such file or directory"));
        }

        let wd = WatchDescriptor::new(inner.next_wd);
        inner.next_wd += 1;
        inner.watched.insert(path.to_path_buf(), wd);
        Ok(wd)
    }

    fn unregister(&mut self, wd: WatchDescriptor) -> io::Result<()> {
        self.inner.borrow_mut().watched.retain(|_, &mut v| v != wd);
        Ok(())
    }

    fn wait(&mut self) -> io::Result<Vec<u8>> {
        let mut inner = self.inner.borrow_mut();
        if inner.pending.is_empty() {
            panic!("called wait() on a mock Watcher with no events prepared");
        }
        let events = std::mem::take(&mut inner.pending);
        Ok(encode_buffer(&events))
    }
}
