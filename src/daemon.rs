// src/daemon.rs
//! Ties the rest of the crate together into the init/run/teardown sequence from spec.md §4.8.

use std::fmt;
use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::clock;
use crate::config::Document;
use crate::dispatch::Dispatcher;
use crate::loader;
use crate::logging::{Level, Sink};
use crate::rule::{RuleId, RuleTable};
use crate::spawn::{ForkExecSpawner, Spawner};
use crate::watch::{Inotify, KernelWatch};

/// A failure during one of the fatal steps of daemon startup (spec.md §4.8, §7).
#[derive(Debug)]
pub enum DaemonError {
    /// The configuration document failed to parse.
    Config(serde_json::Error),
    /// `gethostname` failed.
    Hostname(io::Error),
    /// The inotify instance failed to initialize.
    Watch(io::Error),
    /// The syslog connection for the spawner failed to open.
    Spawner(io::Error),
}

impl fmt::Display for DaemonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaemonError::Config(err) => write!(f, "failed to parse configuration: {}", err),
            DaemonError::Hostname(err) => write!(f, "failed to determine hostname: {}", err),
            DaemonError::Watch(err) => write!(f, "failed to initialize inotify: {}", err),
            DaemonError::Spawner(err) => write!(f, "failed to open syslog connection: {}", err),
        }
    }
}

impl std::error::Error for DaemonError {}

/// The running daemon: a rule table, a kernel watch adapter, and a process spawner, wired into a
/// [`Dispatcher`].
pub struct Daemon<W: KernelWatch, S: Spawner> {
    dispatcher: Dispatcher<W, S>,
}

impl<W: KernelWatch, S: Spawner> Daemon<W, S> {
    /// Wrap an already-populated, already-registered rule table and its collaborators.
    pub fn new(table: RuleTable, watch: W, spawner: S, hostname: String) -> Self {
        Self {
            dispatcher: Dispatcher::new(table, watch, spawner, hostname),
        }
    }

    /// Run the dispatch loop until `shutdown` is set.
    pub fn run(&mut self, shutdown: &Arc<AtomicBool>, sink: &mut dyn Sink) {
        self.dispatcher.run(shutdown, sink);
    }

    /// The teardown sequence from spec.md §4.8: best-effort unregister every active watch, then
    /// drop every rule and clear all tables.
    pub fn shutdown(&mut self) {
        teardown(self.dispatcher.table_mut(), self.dispatcher.watch_mut());
    }

    /// Borrow the rule table, mainly for diagnostics and tests.
    pub fn table(&self) -> &RuleTable {
        self.dispatcher.table()
    }
}

impl Daemon<Inotify, ForkExecSpawner> {
    /// Run the full startup sequence from spec.md §4.8: parse `config_text`, determine the
    /// hostname, initialize inotify, attempt registration of every loaded rule (logging
    /// successes and failures to `sink`), and open the syslog connection the spawner reports
    /// outcomes to.
    ///
    /// # Errors
    ///
    /// Returns the first fatal step to fail: configuration parsing, hostname resolution, or
    /// inotify/syslog initialization. Per-rule registration failures are not fatal; they move
    /// the affected rule to `bad` and are logged instead.
    pub fn start(config_text: &str, sink: &mut dyn Sink) -> Result<Self, DaemonError> {
        let doc = Document::parse(config_text).map_err(DaemonError::Config)?;
        let hostname = clock::hostname().map_err(DaemonError::Hostname)?;

        let mut table = loader::load(&doc, |err| log::warn!("{}", err));

        let mut watch = Inotify::new().map_err(DaemonError::Watch)?;
        register_all(&mut table, &mut watch, sink);

        let spawner = ForkExecSpawner::new().map_err(DaemonError::Spawner)?;

        Ok(Self::new(table, watch, spawner, hostname))
    }
}

/// Attempt registration of every rule in `table`, partitioning into `good`/`bad` and logging
/// each outcome. Shared between [`Daemon::start`] and tests that build a rule table directly.
pub fn register_all<W: KernelWatch>(table: &mut RuleTable, watch: &mut W, sink: &mut dyn Sink) {
    let ids: Vec<RuleId> = table.iter().map(|(id, _)| id).collect();
    for id in ids {
        let rule = table.get(id);
        let (uri, mask) = (rule.uri.clone(), rule.mask);

        match watch.register(&uri, mask) {
            Ok(wd) => {
                table.mark_good(id, wd);
                let _ = sink.write_record(Level::Info, &format!("registered {:?}", uri));
            }
            Err(err) => {
                table.mark_bad(id, err.to_string(), false);
                let _ = sink.write_record(
                    Level::Warning,
                    &format!("failed to register {:?}: {}", uri, err),
                );
            }
        }
    }
}

fn teardown<W: KernelWatch>(table: &mut RuleTable, watch: &mut W) {
    let registered: Vec<_> = table
        .iter()
        .filter_map(|(_, rule)| rule.wd)
        .collect();
    for wd in registered {
        let _ = watch.unregister(wd);
    }
    table.clear();
}
