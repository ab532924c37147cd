// src/spawn/mod.rs
//! The process spawner: spec.md §4.7.
//!
//! [`Spawner`] is the seam the dispatch loop spawns through; [`exec`] holds the real
//! fork/drop-privileges/exec implementation, and [`mock`] (test-only) records invocations
//! without ever forking, following the same trait-plus-mock shape as
//! [`watch`](crate::watch)/[`KernelWatch`](crate::watch::KernelWatch).

pub mod exec;
#[cfg(test)]
pub mod mock;

use std::io;

use crate::event::Event;
use crate::rule::Rule;

pub use exec::ForkExecSpawner;

/// Something that can run a rule's command in response to a dispatched event.
pub trait Spawner {
    /// Expand `rule`'s templates against `event` and run the resulting command.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` encountered on the parent side (e.g. `fork` failing). Failures
    /// on the child side, after `fork` succeeds, are unobservable to the parent by design (see
    /// spec.md §5: children are detached and not `wait`ed on) and are instead reported to the
    /// system log.
    fn spawn(&mut self, rule: &Rule, event: &Event, hostname: &str) -> io::Result<()>;
}
