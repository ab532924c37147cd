// src/reregister.rs
//! The built-in re-registration handler: spec.md §4.5.
//!
//! Invoked by the dispatch loop when a synthetic directory rule's watch fires. Its only job is
//! to notice the creation of the file the synthetic rule exists to watch for, and attempt to
//! register that file's own rule now that it exists.

use std::path::PathBuf;

use crate::event::Event;
use crate::rule::{Handler, RuleId, RuleTable};
use crate::taxonomy::WatchMask;
use crate::watch::KernelWatch;

/// Handle a dispatched event on a synthetic directory rule.
///
/// Returns `false` in every path: synthetic rules never spawn directly, so the dispatch loop's
/// "fall through to spawn" branch is never taken for them.
pub fn handle<W: KernelWatch>(
    table: &mut RuleTable,
    synthetic_id: RuleId,
    event: &Event,
    watch: &mut W,
) -> bool {
    if event.object_kind == 'd' {
        return false;
    }
    if !WatchMask::from_bits_truncate(event.raw_mask).contains(WatchMask::CREATE) {
        return false;
    }
    let Some(parent) = &event.parent_object_name else {
        return false;
    };
    let candidate = PathBuf::from(parent).join(&event.object_name);
    if !table.file_uris().contains(&candidate) {
        return false;
    }

    let target = match table.get(synthetic_id).handler {
        Handler::ReRegister { target } => target,
        Handler::Spawn => return false,
    };

    let target = if table.get(target).uri == candidate {
        Some(target)
    } else {
        // The common case above should always line up; this is the literal-URI fallback the
        // Design Notes in spec.md §9 describe as the "search bad by URI" path.
        table.find_bad_by_uri(&candidate)
    };
    let Some(target) = target else {
        return false;
    };

    let rule = table.get(target);
    let (uri, mask) = (rule.uri.clone(), rule.mask);
    match watch.register(&uri, mask) {
        Ok(wd) => table.mark_good(target, wd),
        Err(err) => table.mark_bad(target, err.to_string(), false),
    }

    false
}
