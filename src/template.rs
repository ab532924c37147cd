// src/template.rs
//! Literal substring substitution for the `${CASPER_INOTIFY_*}` placeholders described in
//! spec.md §4.6.

use crate::event::Event;
use crate::rule::Rule;

/// One `${NAME}` placeholder and the value it should be replaced with.
struct Substitution<'a> {
    placeholder: &'static str,
    value: &'a str,
}

/// The values available for template expansion, one per dispatched event.
pub struct TemplateValues {
    event: String,
    object: String,
    name: String,
    datetime: String,
    hostname: String,
    msg: String,
    cmd: String,
}

impl TemplateValues {
    /// Build the placeholder map for a dispatched `event` matching `rule`, with `hostname` the
    /// local host's name.
    ///
    /// `msg` is bound to the already-expanded message (so `${CASPER_INOTIFY_MSG}` inside `cmd`
    /// doesn't need a second expansion pass), and `cmd` is bound to the *unexpanded* command
    /// template, per spec.md §4.7, so a child can see its own raw template if it wants to.
    #[must_use]
    pub fn new(rule: &Rule, event: &Event, hostname: &str, expanded_msg: String) -> Self {
        Self {
            event: event.name.clone(),
            object: match event.object_kind {
                'd' => "directory".to_string(),
                _ => "file".to_string(),
            },
            name: event.object_name.clone(),
            datetime: event.timestamp.clone(),
            hostname: hostname.to_string(),
            msg: expanded_msg,
            cmd: rule.cmd.clone(),
        }
    }

    fn substitutions(&self) -> [Substitution<'_>; 7] {
        [
            Substitution {
                placeholder: "${CASPER_INOTIFY_EVENT}",
                value: &self.event,
            },
            Substitution {
                placeholder: "${CASPER_INOTIFY_OBJECT}",
                value: &self.object,
            },
            Substitution {
                placeholder: "${CASPER_INOTIFY_NAME}",
                value: &self.name,
            },
            Substitution {
                placeholder: "${CASPER_INOTIFY_DATETIME}",
                value: &self.datetime,
            },
            Substitution {
                placeholder: "${CASPER_INOTIFY_HOSTNAME}",
                value: &self.hostname,
            },
            Substitution {
                placeholder: "${CASPER_INOTIFY_MSG}",
                value: &self.msg,
            },
            Substitution {
                placeholder: "${CASPER_INOTIFY_CMD}",
                value: &self.cmd,
            },
        ]
    }

    /// Expose the placeholder map as `(name, value)` pairs suitable for building the spawned
    /// child's environment, e.g. `("CASPER_INOTIFY_EVENT", "created")`.
    #[must_use]
    pub fn env_pairs(&self) -> Vec<(&'static str, String)> {
        self.substitutions()
            .into_iter()
            .map(|sub| {
                let name = sub
                    .placeholder
                    .trim_start_matches("${")
                    .trim_end_matches('}');
                (name, sub.value.to_string())
            })
            .collect()
    }
}

/// Perform left-to-right, non-overlapping substring replacement of `from` with `to` in `value`.
///
/// The scan advances past each replacement by `to.len()` bytes rather than restarting from the
/// replacement's start, so a `to` that happens to contain `from` is never re-expanded. This is
/// the single-placeholder primitive described in spec.md §4.6.
#[must_use]
pub fn replace(value: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(index) = rest.find(from) {
        out.push_str(&rest[..index]);
        out.push_str(to);
        rest = &rest[index + from.len()..];
    }
    out.push_str(rest);

    out
}

/// Expand every `${CASPER_INOTIFY_*}` placeholder in `template` against `values`, in the
/// canonical enumeration order from spec.md §4.6.
#[must_use]
pub fn expand(template: &str, values: &TemplateValues) -> String {
    let mut out = template.to_string();
    for sub in values.substitutions() {
        out = replace(&out, sub.placeholder, sub.value);
    }
    out
}
