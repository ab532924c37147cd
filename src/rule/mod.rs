// src/rule/mod.rs
//! The canonical registry of watch rules: [`Rule`] is the persistent per-watch record, and
//! [`table`] holds the `all`/`good`/`bad` views described in spec.md §3.

pub mod table;

use std::path::PathBuf;

use glob::Pattern;

use crate::taxonomy::WatchMask;
use crate::watch::WatchDescriptor;

pub use table::{RuleId, RuleTable};

/// Whether a [`Rule`] was declared against a directory or a file.
///
/// This tags intent, not kernel truth: a `Directory` rule additionally carries `IN_ONLYDIR` in
/// its mask, but both kinds are otherwise watched the same way.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// The rule watches a directory.
    Directory,
    /// The rule watches a single file.
    File,
}

/// What happens when a rule's watch fires and passes its pattern filter.
///
/// This replaces the "optional callback" described informally in spec.md with a plain-data
/// tagged variant (per the Design Notes in spec.md §9): a rule either spawns its command, or is
/// a synthetic re-registration trigger for another rule, referenced by its stable [`RuleId`]
/// rather than by pointer or closure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Handler {
    /// A normal rule: matching events spawn `cmd` under `user`.
    Spawn,
    /// A synthetic directory rule created by the loader to catch the creation of `target`, a
    /// file rule that didn't exist at registration time. Synthetic rules never spawn directly.
    ReRegister {
        /// The file rule this synthetic rule exists to re-register once its target appears.
        target: RuleId,
    },
}

/// A single watch rule: spec.md's "Entry".
#[derive(Debug)]
pub struct Rule {
    /// Whether this rule was declared against a file or a directory.
    pub kind: Kind,
    /// The absolute path being watched.
    pub uri: PathBuf,
    /// The kernel event classes this rule is watching for.
    pub mask: WatchMask,
    /// The active watch descriptor, if the rule is currently registered.
    pub wd: Option<WatchDescriptor>,
    /// The OS user under which `cmd` is run.
    pub user: String,
    /// The shell command template run when this rule's watch fires.
    pub cmd: String,
    /// The message template available to `cmd` via `${CASPER_INOTIFY_MSG}`.
    pub msg: String,
    /// An optional glob pattern filtering which object names trigger this rule.
    pub pattern: Option<Pattern>,
    /// The most recent registration error, cleared on successful (re-)registration.
    pub error: Option<String>,
    /// The most recent kernel-invalidation warning, cleared on successful (re-)registration.
    pub warning: Option<String>,
    /// Whether this rule spawns directly, or exists only to re-register another rule.
    pub handler: Handler,
}

impl Rule {
    /// Whether this rule currently holds a live watch descriptor.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.wd.is_some()
    }

    /// Whether this rule is synthetic (i.e. exists only to observe a parent directory on behalf
    /// of another rule, and should not be exposed in the user-facing URI sets).
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        matches!(self.handler, Handler::ReRegister { .. })
    }

    /// Record a successful (re-)registration, clearing any prior error/warning.
    pub fn mark_registered(&mut self, wd: WatchDescriptor) {
        self.wd = Some(wd);
        self.error = None;
        self.warning = None;
    }

    /// Record a registration failure.
    pub fn mark_registration_failed(&mut self, error: String) {
        self.wd = None;
        self.error = Some(error);
    }

    /// Record a kernel invalidation (the watch's `IN_IGNORED` flag was set).
    pub fn mark_invalidated(&mut self, warning: String) {
        self.wd = None;
        self.warning = Some(warning);
    }
}
