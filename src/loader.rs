// src/loader.rs
//! The Loader/Unloader: spec.md §4.2/§4.8.
//!
//! Translates a parsed [`config::Document`](crate::config::Document) into a populated
//! [`RuleTable`], including the auxiliary synthetic directory rules that let a not-yet-existing
//! file become watched the moment its parent directory sees its creation.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{Document, WatchSpec};
use crate::rule::{Handler, Kind, Rule, RuleId, RuleTable};
use crate::taxonomy::{self, WatchMask};

/// The default message template used when an entry and the document both omit one.
pub const DEFAULT_MESSAGE: &str =
    "CASPER-INOTIFY :: WARNING :: ${CASPER_INOTIFY_NAME} ${CASPER_INOTIFY_OBJECT} was \
     ${CASPER_INOTIFY_EVENT} @ ${CASPER_INOTIFY_HOSTNAME} [ ${CASPER_INOTIFY_DATETIME} ]";

/// A configuration problem surfaced while loading a single entry.
///
/// Unlike a document parse failure (fatal, surfaced by
/// [`Document::parse`](crate::config::Document::parse)), these are per-entry and only cause that
/// one entry to be skipped; the loader logs them and continues with the rest of the document.
#[derive(Debug)]
pub enum LoadError {
    /// The entry's `pattern` is not a valid glob.
    InvalidPattern {
        /// The entry's URI, for diagnostics.
        uri: String,
        /// The underlying glob parse error.
        source: glob::PatternError,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::InvalidPattern { uri, source } => {
                write!(f, "invalid pattern for {}: {}", uri, source)
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Load every `directories[]`/`files[]` entry in `doc` into a new [`RuleTable`].
///
/// Unknown `events` keywords and per-entry errors are reported via `diagnostics` and otherwise
/// skip just that entry; they do not abort the load.
pub fn load(doc: &Document, mut diagnostics: impl FnMut(LoadError)) -> RuleTable {
    let mut table = RuleTable::new();

    for spec in &doc.directories {
        load_directory(&mut table, doc, spec, &mut diagnostics);
    }
    for spec in &doc.files {
        load_file(&mut table, doc, spec, &mut diagnostics);
    }

    table
}

fn load_directory(
    table: &mut RuleTable,
    doc: &Document,
    spec: &WatchSpec,
    diagnostics: &mut impl FnMut(LoadError),
) {
    let mask = keyword_mask(spec);
    if mask.is_empty() {
        return;
    }

    let pattern = match compile_pattern(spec) {
        Ok(pattern) => pattern,
        Err(err) => {
            diagnostics(err);
            return;
        }
    };

    table.insert(Rule {
        kind: Kind::Directory,
        uri: PathBuf::from(&spec.uri),
        mask: taxonomy::directory_mask(mask),
        wd: None,
        user: resolve(&spec.user, &doc.user, "root"),
        cmd: resolve(&spec.command, &doc.command, ""),
        msg: resolve(&spec.message, &doc.message, DEFAULT_MESSAGE),
        pattern,
        error: None,
        warning: None,
        handler: Handler::Spawn,
    });
}

fn load_file(
    table: &mut RuleTable,
    doc: &Document,
    spec: &WatchSpec,
    diagnostics: &mut impl FnMut(LoadError),
) {
    let mut mask = keyword_mask(spec);
    if mask.is_empty() {
        return;
    }

    let pattern = match compile_pattern(spec) {
        Ok(pattern) => pattern,
        Err(err) => {
            diagnostics(err);
            return;
        }
    };

    let wants_modify = mask.contains(WatchMask::MODIFY);
    if mask.contains(WatchMask::DELETE) {
        mask |= WatchMask::DELETE_SELF;
    }

    let target = table.insert(Rule {
        kind: Kind::File,
        uri: PathBuf::from(&spec.uri),
        mask,
        wd: None,
        user: resolve(&spec.user, &doc.user, "root"),
        cmd: resolve(&spec.command, &doc.command, ""),
        msg: resolve(&spec.message, &doc.message, DEFAULT_MESSAGE),
        pattern,
        error: None,
        warning: None,
        handler: Handler::Spawn,
    });

    if wants_modify {
        if let Some(parent) = Path::new(&spec.uri).parent().filter(|p| !p.as_os_str().is_empty()) {
            insert_synthetic(table, parent, target);
        }
    }
}

fn insert_synthetic(table: &mut RuleTable, parent: &Path, target: RuleId) {
    table.insert(Rule {
        kind: Kind::Directory,
        uri: parent.to_path_buf(),
        mask: taxonomy::directory_mask(WatchMask::CREATE),
        wd: None,
        user: String::new(),
        cmd: String::new(),
        msg: String::new(),
        pattern: None,
        error: None,
        warning: None,
        handler: Handler::ReRegister { target },
    });
}

fn keyword_mask(spec: &WatchSpec) -> WatchMask {
    let uri = spec.uri.clone();
    taxonomy::mask_for_keywords(spec.events.iter().map(String::as_str), |keyword| {
        log::warn!("unrecognized events keyword {:?} for {}", keyword, uri);
    })
}

fn compile_pattern(spec: &WatchSpec) -> Result<Option<glob::Pattern>, LoadError> {
    match &spec.pattern {
        None => Ok(None),
        Some(pattern) => glob::Pattern::new(pattern).map(Some).map_err(|source| {
            LoadError::InvalidPattern {
                uri: spec.uri.clone(),
                source,
            }
        }),
    }
}

fn resolve(entry: &Option<String>, document_default: &Option<String>, fallback: &str) -> String {
    entry
        .clone()
        .or_else(|| document_default.clone())
        .unwrap_or_else(|| fallback.to_string())
}
