use serde::{Deserialize, Serialize};

/// Post category derived from an entry's populated properties.
///
/// The category doubles as the storage directory under the content root,
/// so `as_str` values are part of the on-disk layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Likes,
    Bookmarks,
    Rsvp,
    Articles,
    Watched,
    Read,
    Listens,
    Plays,
    Notes,
}

impl PostKind {
    /// Directory name used for posts of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Bookmarks => "bookmarks",
            Self::Rsvp => "rsvp",
            Self::Articles => "articles",
            Self::Watched => "watched",
            Self::Read => "read",
            Self::Listens => "listens",
            Self::Plays => "plays",
            Self::Notes => "notes",
        }
    }
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do with properties that have no dedicated `Entry` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownProperties {
    /// Keep them in `Entry::extra` and persist them in the header.
    #[default]
    Passthrough,
    /// Drop them on create and ignore them in `add`/`replace` patches.
    Strict,
}

impl UnknownProperties {
    pub fn keeps_unknown(&self) -> bool {
        matches!(self, Self::Passthrough)
    }
}

/// Successful outcome of a publishing operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Published {
    /// For creates, the public slug (`{kind}/{slug}`); otherwise the storage path.
    pub filename: String,
}
