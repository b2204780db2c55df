//! Property-name aliases.
//!
//! Requests and stored documents name the same property differently
//! (`title` in front matter, `name` in Micropub, `mp-slug` in forms). Every
//! incoming key goes through [`canonical_key`]; every header key written to
//! disk goes through [`storage_key`].

/// Source key → canonical key. Consulted after `[]` and `mp-` are stripped.
const ALIASES: &[(&str, &str)] = &[
    ("title", "name"),
    ("tags", "category"),
    ("published", "date"),
    ("post-status", "status"),
    ("client-id", "client_id"),
    ("u-like-of", "like-of"),
    ("u-bookmark-of", "bookmark-of"),
    ("u-in-reply-to", "in-reply-to"),
    ("p-rsvp", "rsvp"),
    ("u-watch-of", "watch-of"),
    ("u-read-of", "read-of"),
    ("u-listen-of", "listen-of"),
    ("u-play-of", "play-of"),
];

/// Canonical key → key written to the persisted header.
const STORAGE_NAMES: &[(&str, &str)] = &[("name", "title"), ("category", "tags")];

/// Header keys the document reader interprets itself. They never travel as
/// extension properties.
const RESERVED_HEADER_KEYS: &[&str] = &["type", "draft", "content"];

pub(crate) fn is_reserved_header_key(key: &str) -> bool {
    RESERVED_HEADER_KEYS.contains(&key)
}

/// Normalize a raw property key to its canonical name.
pub fn canonical_key(raw: &str) -> String {
    let key = raw.strip_suffix("[]").unwrap_or(raw);
    let key = key.strip_prefix("mp-").unwrap_or(key);
    ALIASES
        .iter()
        .find(|(source, _)| *source == key)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| key.to_string())
}

/// Header key for a canonical property name.
pub fn storage_key(canonical: &str) -> &str {
    STORAGE_NAMES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, stored)| *stored)
        .unwrap_or(canonical)
}
