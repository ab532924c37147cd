// src/taxonomy.rs
//! The static mapping between configuration keywords and kernel event classes.

use bitflags::bitflags;

bitflags! {
    /// The set of kernel event classes a rule can be watching for.
    ///
    /// Bit values follow the Linux `inotify(7)` event mask, so a [`WatchMask`] can be passed
    /// directly to `inotify_add_watch` by the [`watch`](crate::watch) module.
    #[derive(Default)]
    pub struct WatchMask: u32 {
        /// File was accessed (`IN_ACCESS`).
        const ACCESS = libc::IN_ACCESS as u32;
        /// Metadata changed (`IN_ATTRIB`).
        const ATTRIB = libc::IN_ATTRIB as u32;
        /// File opened for writing was closed (`IN_CLOSE_WRITE`).
        const CLOSE_WRITE = libc::IN_CLOSE_WRITE as u32;
        /// File not opened for writing was closed (`IN_CLOSE_NOWRITE`).
        const CLOSE_NOWRITE = libc::IN_CLOSE_NOWRITE as u32;
        /// File/directory created in watched directory (`IN_CREATE`).
        const CREATE = libc::IN_CREATE as u32;
        /// File/directory deleted from watched directory (`IN_DELETE`).
        const DELETE = libc::IN_DELETE as u32;
        /// Watched file/directory itself was deleted (`IN_DELETE_SELF`).
        const DELETE_SELF = libc::IN_DELETE_SELF as u32;
        /// File was modified (`IN_MODIFY`).
        const MODIFY = libc::IN_MODIFY as u32;
        /// Watched file/directory was moved (`IN_MOVE_SELF`).
        const MOVE_SELF = libc::IN_MOVE_SELF as u32;
        /// File moved out of watched directory (`IN_MOVED_FROM`).
        const MOVED_FROM = libc::IN_MOVED_FROM as u32;
        /// File moved into watched directory (`IN_MOVED_TO`).
        const MOVED_TO = libc::IN_MOVED_TO as u32;
        /// File was opened (`IN_OPEN`).
        const OPEN = libc::IN_OPEN as u32;

        /// Only watch the path if it is a directory (`IN_ONLYDIR`).
        const ONLYDIR = libc::IN_ONLYDIR as u32;
        /// Subject of this event is a directory (`IN_ISDIR`), set by the kernel on events, never
        /// requested by a rule.
        const ISDIR = libc::IN_ISDIR as u32;
        /// The watch was removed, explicitly or because its subject was deleted/unmounted
        /// (`IN_IGNORED`), set by the kernel on events, never requested by a rule.
        const IGNORED = libc::IN_IGNORED as u32;

        /// Either half of a close event (`close_write | close_nowrite`).
        const CLOSE = Self::CLOSE_WRITE.bits | Self::CLOSE_NOWRITE.bits;
        /// Either half of a move event (`moved_from | moved_to`).
        const MOVE = Self::MOVED_FROM.bits | Self::MOVED_TO.bits;
    }
}

/// One entry in the keyword table: a configuration keyword, the mask bit(s) it contributes, and
/// a short human description.
struct Keyword {
    name: &'static str,
    mask: WatchMask,
    description: &'static str,
}

/// The closed table of recognized `events` keywords.
///
/// `delete_self` is the canonical spelling; unlike the system this is modeled on, there is no
/// `delete_sef` typo kept around for compatibility (spec.md's Design Notes call this out
/// explicitly as a bug, not a feature, to preserve).
const KEYWORDS: &[Keyword] = &[
    Keyword {
        name: "access",
        mask: WatchMask::ACCESS,
        description: "file was accessed (read, execve, ...)",
    },
    Keyword {
        name: "attrib",
        mask: WatchMask::ATTRIB,
        description: "metadata changed (permissions, timestamps, xattrs, ...)",
    },
    Keyword {
        name: "close",
        mask: WatchMask::CLOSE,
        description: "file was closed, regardless of how it was opened",
    },
    Keyword {
        name: "close_write",
        mask: WatchMask::CLOSE_WRITE,
        description: "file opened for writing was closed",
    },
    Keyword {
        name: "close_nowrite",
        mask: WatchMask::CLOSE_NOWRITE,
        description: "file not opened for writing was closed",
    },
    Keyword {
        name: "create",
        mask: WatchMask::CREATE,
        description: "file/directory was created in a watched directory",
    },
    Keyword {
        name: "delete",
        mask: WatchMask::DELETE,
        description: "file/directory was deleted from a watched directory",
    },
    Keyword {
        name: "delete_self",
        mask: WatchMask::DELETE_SELF,
        description: "the watched file/directory itself was deleted",
    },
    Keyword {
        name: "modify",
        mask: WatchMask::MODIFY,
        description: "file was modified",
    },
    Keyword {
        name: "move",
        mask: WatchMask::MOVE,
        description: "file was moved, either into or out of a watched directory",
    },
    Keyword {
        name: "move_self",
        mask: WatchMask::MOVE_SELF,
        description: "the watched file/directory itself was moved",
    },
    Keyword {
        name: "move_from",
        mask: WatchMask::MOVED_FROM,
        description: "file was moved out of a watched directory",
    },
    Keyword {
        name: "move_to",
        mask: WatchMask::MOVED_TO,
        description: "file was moved into a watched directory",
    },
    Keyword {
        name: "open",
        mask: WatchMask::OPEN,
        description: "file was opened",
    },
];

/// Look up the human description for a configuration keyword, if recognized.
#[must_use]
pub fn describe(keyword: &str) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|k| k.name == keyword)
        .map(|k| k.description)
}

/// Convert a list of configuration `events` keywords into a [`WatchMask`].
///
/// Every recognized keyword ORs its mask bit(s) into the result. Unrecognized keywords are
/// reported via `unknown` (the diagnostic stream) and otherwise ignored.
pub fn mask_for_keywords<'a>(
    keywords: impl IntoIterator<Item = &'a str>,
    mut unknown: impl FnMut(&str),
) -> WatchMask {
    let mut mask = WatchMask::empty();
    for keyword in keywords {
        match KEYWORDS.iter().find(|k| k.name == keyword) {
            Some(k) => mask |= k.mask,
            None => unknown(keyword),
        }
    }
    mask
}

/// OR in `IN_ONLYDIR` for a directory rule's final mask.
#[must_use]
pub fn directory_mask(mask: WatchMask) -> WatchMask {
    mask | WatchMask::ONLYDIR
}

#[cfg(test)]
mod tests {
    use super::{describe, directory_mask, mask_for_keywords, WatchMask};

    #[test]
    fn recognized_keywords_or_together() {
        let mut unknown = Vec::new();
        let mask = mask_for_keywords(["create", "delete"], |k| unknown.push(k.to_string()));

        assert!(unknown.is_empty());
        assert_eq!(mask, WatchMask::CREATE | WatchMask::DELETE);
    }

    #[test]
    fn unknown_keywords_are_reported_and_ignored() {
        let mut unknown = Vec::new();
        let mask = mask_for_keywords(["create", "bogus"], |k| unknown.push(k.to_string()));

        assert_eq!(unknown, vec!["bogus".to_string()]);
        assert_eq!(mask, WatchMask::CREATE);
    }

    #[test]
    fn delete_self_is_the_canonical_keyword() {
        assert!(describe("delete_self").is_some());
        assert!(describe("delete_sef").is_none());
    }

    #[test]
    fn directory_mask_adds_onlydir() {
        let mask = directory_mask(WatchMask::CREATE);
        assert!(mask.contains(WatchMask::ONLYDIR));
        assert!(mask.contains(WatchMask::CREATE));
    }

    #[test]
    fn close_and_move_are_composite() {
        assert_eq!(
            WatchMask::CLOSE,
            WatchMask::CLOSE_WRITE | WatchMask::CLOSE_NOWRITE
        );
        assert_eq!(WatchMask::MOVE, WatchMask::MOVED_FROM | WatchMask::MOVED_TO);
    }
}
