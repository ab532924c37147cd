// src/spawn/mock.rs
//! A [`Spawner`] test double that records invocations instead of forking, mirroring
//! [`watch::mock`](crate::watch::mock)'s approach to making the dispatch loop testable without a
//! real kernel/process boundary.

use std::io;

use super::Spawner;
use crate::event::Event;
use crate::rule::Rule;
use crate::template::TemplateValues;

/// One recorded call to [`Spawner::spawn`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    /// The rule's URI, so tests can tell which rule fired without holding a `Rule` reference.
    pub uri: std::path::PathBuf,
    /// The fully-expanded command that would have been run.
    pub cmd: String,
    /// The user the command would have been run as.
    pub user: String,
}

/// A [`Spawner`] that records every call instead of forking a child.
#[derive(Default)]
pub struct RecordingSpawner {
    invocations: Vec<Invocation>,
    fail_next: bool,
}

impl RecordingSpawner {
    /// Build an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrange for the next call to [`Spawner::spawn`] to return an error, as if `fork` had
    /// failed, instead of recording an invocation.
    pub fn fail_next_spawn(&mut self) {
        self.fail_next = true;
    }

    /// The invocations recorded so far, in call order.
    #[must_use]
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }
}

impl Spawner for RecordingSpawner {
    fn spawn(&mut self, rule: &Rule, event: &Event, hostname: &str) -> io::Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(io::Error::new(io::ErrorKind::Other, "simulated fork failure"));
        }

        let msg = crate::template::expand(
            &rule.msg,
            &TemplateValues::new(rule, event, hostname, String::new()),
        );
        let values = TemplateValues::new(rule, event, hostname, msg);
        let cmd = crate::template::expand(&rule.cmd, &values);

        self.invocations.push(Invocation {
            uri: rule.uri.clone(),
            cmd,
            user: rule.user.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RecordingSpawner;
    use crate::event::Event;
    use crate::rule::{Handler, Kind, Rule};
    use crate::spawn::Spawner;
    use crate::taxonomy::WatchMask;
    use std::path::PathBuf;

    fn rule() -> Rule {
        Rule {
            kind: Kind::File,
            uri: PathBuf::from("/tmp/d/x"),
            mask: WatchMask::MODIFY,
            wd: None,
            user: "nobody".to_string(),
            cmd: "echo ${CASPER_INOTIFY_OBJECT}".to_string(),
            msg: String::new(),
            pattern: None,
            error: None,
            warning: None,
            handler: Handler::Spawn,
        }
    }

    fn event() -> Event {
        Event {
            raw_mask: WatchMask::MODIFY.bits(),
            object_kind: 'f',
            object_name: "x".to_string(),
            parent_object_name: None,
            inside_a_watched_directory: false,
            name: "modified".to_string(),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn records_expanded_command_and_user() {
        let mut spawner = RecordingSpawner::new();
        spawner.spawn(&rule(), &event(), "myhost").unwrap();

        let invocations = spawner.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].cmd, "echo file");
        assert_eq!(invocations[0].user, "nobody");
    }

    #[test]
    fn fail_next_spawn_errors_once() {
        let mut spawner = RecordingSpawner::new();
        spawner.fail_next_spawn();

        assert!(spawner.spawn(&rule(), &event(), "myhost").is_err());
        assert!(spawner.spawn(&rule(), &event(), "myhost").is_ok());
        assert_eq!(spawner.invocations().len(), 1);
    }
}
