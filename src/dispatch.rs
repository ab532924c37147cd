// src/dispatch.rs
//! The dispatch loop: spec.md §4.4, the heart of the core.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::clock;
use crate::event::{self, Event};
use crate::logging::{Level, Sink};
use crate::reregister;
use crate::rule::{Handler, RuleTable};
use crate::spawn::Spawner;
use crate::taxonomy::WatchMask;
use crate::watch::{raw, KernelWatch, RawEvent};

/// Drives the dispatch loop over a kernel watch adapter and a process spawner.
///
/// Generic over both collaborators so tests can substitute
/// [`watch::mock::Watcher`](crate::watch::mock::Watcher) and
/// [`spawn::mock::RecordingSpawner`](crate::spawn::mock::RecordingSpawner) for the real
/// kernel/process boundary, mirroring a generic-over-collaborator collector pattern.
pub struct Dispatcher<W: KernelWatch, S: Spawner> {
    table: RuleTable,
    watch: W,
    spawner: S,
    hostname: String,
}

impl<W: KernelWatch, S: Spawner> Dispatcher<W, S> {
    /// Build a dispatcher over an already-populated rule table, a registered kernel watch, a
    /// spawner, and the local hostname.
    pub fn new(table: RuleTable, watch: W, spawner: S, hostname: String) -> Self {
        Self {
            table,
            watch,
            spawner,
            hostname,
        }
    }

    /// Borrow the rule table, e.g. for loader/registration code or tests.
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Mutably borrow the rule table.
    pub fn table_mut(&mut self) -> &mut RuleTable {
        &mut self.table
    }

    /// Mutably borrow the kernel watch adapter.
    pub fn watch_mut(&mut self) -> &mut W {
        &mut self.watch
    }

    /// Run the loop until `shutdown` is set, logging to `sink`.
    ///
    /// Per spec.md §5/§7: an exception during a single `wait` iteration is caught, logged, and
    /// the loop continues; if logging itself fails, the loop breaks.
    pub fn run(&mut self, shutdown: &Arc<AtomicBool>, sink: &mut dyn Sink) {
        while !shutdown.load(Ordering::Relaxed) {
            let buf = match self.watch.wait() {
                Ok(buf) => buf,
                Err(err) => {
                    if sink
                        .write_record(Level::Error, &format!("wait() failed: {}", err))
                        .is_err()
                    {
                        break;
                    }
                    continue;
                }
            };

            for raw_event in raw::parse_buffer(&buf) {
                if sink
                    .write_record(Level::Debug, &format!("received {:?}", raw_event))
                    .is_err()
                {
                    return;
                }
                self.dispatch_one(&raw_event, sink);
            }
        }
    }

    /// Run steps 1-7 of spec.md §4.4 for one raw kernel record.
    fn dispatch_one(&mut self, raw_event: &RawEvent, sink: &mut dyn Sink) {
        let Some(id) = self.table.lookup(raw_event.wd) else {
            let _ = sink.write_record(
                Level::Debug,
                &format!("no rule registered for wd {:?}", raw_event.wd),
            );
            return;
        };

        let rule_mask = WatchMask::from_bits_truncate(raw_event.mask);
        let rule = self.table.get(id);

        let inside_a_watched_directory = raw_event.has_name();
        let (object_name, parent_object_name) = if inside_a_watched_directory {
            (raw_event.name().to_string(), Some(path_to_string(&rule.uri)))
        } else {
            (path_to_string(&rule.uri), None)
        };

        let event = Event {
            raw_mask: raw_event.mask,
            object_kind: if rule_mask.contains(WatchMask::ISDIR) { 'd' } else { 'f' },
            object_name,
            parent_object_name,
            inside_a_watched_directory,
            name: event::action_name(rule_mask),
            timestamp: clock::now_iso8601(),
        };

        if let Some(pattern) = &rule.pattern {
            if !pattern.matches(&event.object_name) {
                return;
            }
        }

        if let Handler::ReRegister { .. } = rule.handler {
            reregister::handle(&mut self.table, id, &event, &mut self.watch);
            if rule_mask.contains(WatchMask::IGNORED) {
                self.table.mark_bad(id, "watch invalidated by the kernel".to_string(), true);
                let _ = sink.write_record(Level::Warning, &format!("rule on {:?} invalidated", self.table.get(id).uri));
            }
            return;
        }

        if event.name == "???" {
            let _ = sink.write_record(Level::Event, "ignored");
        } else if !rule_mask.contains(WatchMask::IGNORED) {
            self.spawn(id, &event, sink);
        }

        if rule_mask.contains(WatchMask::IGNORED) {
            let uri = self.table.get(id).uri.clone();
            self.table.mark_bad(id, "watch invalidated by the kernel".to_string(), true);
            let _ = sink.write_record(Level::Warning, &format!("rule on {:?} invalidated", uri));
        }
    }

    fn spawn(&mut self, id: crate::rule::RuleId, event: &Event, sink: &mut dyn Sink) {
        let rule = self.table.get(id);
        match self.spawner.spawn(rule, event, &self.hostname) {
            Ok(()) => {
                let _ = sink.write_record(Level::Event, &event.name);
            }
            Err(err) => {
                let _ = sink.write_record(Level::Error, &format!("spawn failed: {}", err));
            }
        }
    }
}

fn path_to_string(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}
