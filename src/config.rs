// src/config.rs
//! The configuration document model: spec.md §6.
//!
//! Parsing the document itself is `serde_json`'s job; this module only describes its shape and
//! carries the per-entry defaulting logic the [`loader`](crate::loader) needs, following the
//! convention of a plain `serde`-derived struct per on-disk shape.

use serde::Deserialize;

/// The top-level configuration document.
#[derive(Debug, Deserialize)]
pub struct Document {
    /// The default OS user for entries that don't override it.
    pub user: Option<String>,
    /// The default command template for entries that don't override it.
    pub command: Option<String>,
    /// The default message template for entries that don't override it.
    pub message: Option<String>,
    /// Directories to watch.
    #[serde(default)]
    pub directories: Vec<WatchSpec>,
    /// Files to watch.
    #[serde(default)]
    pub files: Vec<WatchSpec>,
}

/// One `directories[]`/`files[]` entry.
#[derive(Debug, Deserialize)]
pub struct WatchSpec {
    /// The absolute path to watch.
    pub uri: String,
    /// The `events` keywords requested for this entry (see [`taxonomy`](crate::taxonomy)).
    pub events: Vec<String>,
    /// Overrides the document-level `user`.
    pub user: Option<String>,
    /// Overrides the document-level `command`.
    pub command: Option<String>,
    /// Overrides the document-level `message`.
    pub message: Option<String>,
    /// An optional glob pattern filtering which object names trigger this entry.
    pub pattern: Option<String>,
}

impl Document {
    /// Parse a configuration document from JSON text.
    ///
    /// # Errors
    ///
    /// Propagates any `serde_json::Error` encountered while parsing.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::Document;

    #[test]
    fn parses_a_minimal_document() {
        let doc = Document::parse(
            r#"{
                "user": "nobody",
                "directories": [
                    {"uri": "/tmp/d", "events": ["create"]}
                ],
                "files": []
            }"#,
        )
        .expect("parse");

        assert_eq!(doc.user.as_deref(), Some("nobody"));
        assert_eq!(doc.directories.len(), 1);
        assert_eq!(doc.directories[0].uri, "/tmp/d");
        assert_eq!(doc.directories[0].events, vec!["create"]);
    }

    #[test]
    fn directories_and_files_default_to_empty() {
        let doc = Document::parse(r#"{}"#).expect("parse");
        assert!(doc.directories.is_empty());
        assert!(doc.files.is_empty());
    }

    #[test]
    fn entry_overrides_are_optional() {
        let doc = Document::parse(
            r#"{
                "files": [
                    {"uri": "/tmp/d/x", "events": ["modify"], "user": "alice", "pattern": "*.log"}
                ]
            }"#,
        )
        .expect("parse");

        assert_eq!(doc.files[0].user.as_deref(), Some("alice"));
        assert_eq!(doc.files[0].pattern.as_deref(), Some("*.log"));
    }
}
