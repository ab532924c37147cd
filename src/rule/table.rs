// src/rule/table.rs
//! The `all`/`good`/`bad` rule registry described in spec.md §3.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::Rule;
use crate::watch::WatchDescriptor;

/// A stable index into a [`RuleTable`]'s authoritative rule vector.
///
/// Per the Design Notes in spec.md §9, rules refer to each other (e.g. a synthetic
/// re-registration rule referring to the file rule it exists to re-register) by this index
/// rather than by pointer, so the table can remain a plain `Vec` of owned [`Rule`]s.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct RuleId(usize);

/// The registry of watch rules.
///
/// - `all` is authoritative: every rule is inserted here exactly once and never removed except
///   by [`RuleTable::clear`].
/// - `good` maps the watch descriptor of every currently-registered rule to its id.
/// - `bad` is the set of ids of rules that failed to register, or were invalidated by the
///   kernel.
/// - `directory_uris`/`file_uris` are the literal paths the user asked to watch, excluding
///   synthetic rules, per spec.md §3.
#[derive(Default)]
pub struct RuleTable {
    all: Vec<Rule>,
    good: HashMap<WatchDescriptor, RuleId>,
    bad: HashSet<RuleId>,
    directory_uris: HashSet<PathBuf>,
    file_uris: HashSet<PathBuf>,
}

impl RuleTable {
    /// Construct an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new, as-yet-unregistered rule, returning its stable id.
    ///
    /// If the rule is not synthetic, its URI is recorded in the appropriate user-facing URI set.
    pub fn insert(&mut self, rule: Rule) -> RuleId {
        let id = RuleId(self.all.len());

        if !rule.is_synthetic() {
            match rule.kind {
                super::Kind::Directory => {
                    self.directory_uris.insert(rule.uri.clone());
                }
                super::Kind::File => {
                    self.file_uris.insert(rule.uri.clone());
                }
            }
        }

        self.bad.insert(id);
        self.all.push(rule);
        id
    }

    /// Borrow a rule by id.
    #[must_use]
    pub fn get(&self, id: RuleId) -> &Rule {
        &self.all[id.0]
    }

    /// Mutably borrow a rule by id.
    pub fn get_mut(&mut self, id: RuleId) -> &mut Rule {
        &mut self.all[id.0]
    }

    /// Resolve the rule id currently registered under a watch descriptor, if any.
    #[must_use]
    pub fn lookup(&self, wd: WatchDescriptor) -> Option<RuleId> {
        self.good.get(&wd).copied()
    }

    /// Record that a rule successfully registered under `wd`, moving it from `bad` to `good`.
    pub fn mark_good(&mut self, id: RuleId, wd: WatchDescriptor) {
        self.get_mut(id).mark_registered(wd);
        self.bad.remove(&id);
        self.good.insert(wd, id);
    }

    /// Record that a rule failed to register, or was invalidated, moving it from `good` to
    /// `bad`.
    pub fn mark_bad(&mut self, id: RuleId, reason: String, invalidated: bool) {
        if let Some(wd) = self.get(id).wd {
            self.good.remove(&wd);
        }
        if invalidated {
            self.get_mut(id).mark_invalidated(reason);
        } else {
            self.get_mut(id).mark_registration_failed(reason);
        }
        self.bad.insert(id);
    }

    /// Find a `bad` rule with the given literal URI.
    ///
    /// Used as a fallback by the re-registration handler; the common path instead uses the
    /// target [`RuleId`] stored directly on the synthetic rule's [`Handler`](super::Handler).
    #[must_use]
    pub fn find_bad_by_uri(&self, uri: &Path) -> Option<RuleId> {
        self.bad
            .iter()
            .copied()
            .find(|&id| self.get(id).uri == uri)
    }

    /// The literal directory URIs the user asked to watch (excludes synthetic rules).
    #[must_use]
    pub fn directory_uris(&self) -> &HashSet<PathBuf> {
        &self.directory_uris
    }

    /// The literal file URIs the user asked to watch (excludes synthetic rules).
    #[must_use]
    pub fn file_uris(&self) -> &HashSet<PathBuf> {
        &self.file_uris
    }

    /// Iterate over every rule and its id, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.all
            .iter()
            .enumerate()
            .map(|(index, rule)| (RuleId(index), rule))
    }

    /// Iterate over every rule and its id, mutably, in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RuleId, &mut Rule)> {
        self.all
            .iter_mut()
            .enumerate()
            .map(|(index, rule)| (RuleId(index), rule))
    }

    /// The number of rules in `all`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Whether the table holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Drop every rule and clear all tables and URI sets, per spec.md §4.8's teardown sequence.
    ///
    /// Callers are responsible for unregistering any still-active watch descriptors with the
    /// kernel watch adapter *before* calling this, since this has no access to the adapter.
    pub fn clear(&mut self) {
        self.all.clear();
        self.good.clear();
        self.bad.clear();
        self.directory_uris.clear();
        self.file_uris.clear();
    }

    /// Check the invariants from spec.md §3/§8.
    ///
    /// # Panics
    ///
    /// Panics with a description of the violated invariant. Intended for use in tests and debug
    /// assertions, not on any hot path.
    pub fn check_invariants(&self) {
        assert_eq!(
            self.good.len() + self.bad.len(),
            self.all.len(),
            "good ∪ bad must partition all"
        );

        for (id, rule) in self.iter() {
            let in_good = rule.wd.is_some();
            let in_bad = self.bad.contains(&id);
            assert_ne!(
                in_good, in_bad,
                "rule {:?} must be in exactly one of good/bad",
                id
            );
            if let Some(wd) = rule.wd {
                assert_eq!(
                    self.good.get(&wd),
                    Some(&id),
                    "rule {:?}'s wd must resolve back to itself in good",
                    id
                );
            }
        }

        let mut seen_wds = HashSet::new();
        for wd in self.good.keys() {
            assert!(seen_wds.insert(wd), "wd {:?} must be unique in good", wd);
        }
    }
}
