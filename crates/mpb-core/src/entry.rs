use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Entry type assumed when a stored document does not declare one.
pub const DEFAULT_ENTRY_TYPE: &str = "h-entry";

/// Properties with a dedicated `Entry` field, keyed by canonical name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Content,
    Category,
    Date,
    Updated,
    Slug,
    Status,
    Visibility,
    Deleted,
    LikeOf,
    BookmarkOf,
    InReplyTo,
    Rsvp,
    WatchOf,
    ReadOf,
    ListenOf,
    PlayOf,
    Photo,
    ClientId,
}

impl Field {
    /// Header order. Also the order `Entry::populated_keys` reports.
    pub const ALL: [Field; 19] = [
        Field::Date,
        Field::Updated,
        Field::Name,
        Field::Category,
        Field::Slug,
        Field::Status,
        Field::Visibility,
        Field::LikeOf,
        Field::BookmarkOf,
        Field::InReplyTo,
        Field::Rsvp,
        Field::WatchOf,
        Field::ReadOf,
        Field::ListenOf,
        Field::PlayOf,
        Field::ClientId,
        Field::Deleted,
        Field::Content,
        Field::Photo,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Content => "content",
            Self::Category => "category",
            Self::Date => "date",
            Self::Updated => "updated",
            Self::Slug => "slug",
            Self::Status => "status",
            Self::Visibility => "visibility",
            Self::Deleted => "deleted",
            Self::LikeOf => "like-of",
            Self::BookmarkOf => "bookmark-of",
            Self::InReplyTo => "in-reply-to",
            Self::Rsvp => "rsvp",
            Self::WatchOf => "watch-of",
            Self::ReadOf => "read-of",
            Self::ListenOf => "listen-of",
            Self::PlayOf => "play-of",
            Self::Photo => "photo",
            Self::ClientId => "client_id",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Plural properties keep every value; the rest keep only the first.
    pub fn is_plural(&self) -> bool {
        matches!(self, Self::Category | Self::Photo)
    }

    /// Response-type markers: the post reacts to another resource.
    pub fn is_response_marker(&self) -> bool {
        matches!(
            self,
            Self::LikeOf
                | Self::BookmarkOf
                | Self::InReplyTo
                | Self::Rsvp
                | Self::WatchOf
                | Self::ReadOf
                | Self::ListenOf
                | Self::PlayOf
        )
    }
}

/// An uploaded attachment, as delivered by a multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub filename: String,
    #[serde(default)]
    pub content: Vec<u8>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// One `photo` value: either a reference to existing media or a file
/// that still has to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Photo {
    Link { value: String, alt: Option<String> },
    Upload { file: MediaFile, alt: Option<String> },
}

impl Photo {
    pub fn link(value: impl Into<String>) -> Self {
        Self::Link {
            value: value.into(),
            alt: None,
        }
    }

    pub fn alt(&self) -> Option<&str> {
        match self {
            Self::Link { alt, .. } | Self::Upload { alt, .. } => alt.as_deref(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Link { value, alt: None } => Value::String(value.clone()),
            Self::Link {
                value,
                alt: Some(alt),
            } => json!({ "value": value, "alt": alt }),
            Self::Upload { file, alt } => json!({ "filename": file.filename, "alt": alt }),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Self::Link { value, .. } => value.clone(),
            Self::Upload { file, .. } => file.filename.clone(),
        }
    }
}

/// Dynamically typed view of one property, used where the key is only known
/// at runtime (patches, header rendering, the extension map).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    Photos(Vec<Photo>),
    Json(Value),
}

impl PropertyValue {
    /// Singular view: lists collapse to their first element.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(items) => items.into_iter().next(),
            Self::Flag(flag) => Some(flag.to_string()),
            Self::Photos(photos) => photos.first().map(Photo::to_text),
            Self::Json(value) => match value {
                Value::Null => None,
                Value::String(text) => Some(text),
                other => Some(other.to_string()),
            },
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Photos(photos) => photos.iter().map(Photo::to_text).collect(),
            Self::Json(Value::Array(items)) => items.into_iter().filter_map(scalar_text).collect(),
            other => other.into_text().into_iter().collect(),
        }
    }

    pub fn into_flag(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::Json(Value::Bool(flag)) => flag,
            other => other
                .into_text()
                .is_some_and(|text| text.trim().eq_ignore_ascii_case("true")),
        }
    }

    pub fn into_photos(self) -> Vec<Photo> {
        match self {
            Self::Photos(photos) => photos,
            other => other.into_list().into_iter().map(Photo::link).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Flag(flag) => !flag,
            Self::Photos(photos) => photos.is_empty(),
            Self::Json(value) => json_is_empty(value),
        }
    }

    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Bool(flag) => Self::Flag(flag),
            Value::Number(number) => Self::Text(number.to_string()),
            Value::Array(items) if items.iter().all(|item| scalar_text(item.clone()).is_some()) => {
                Self::List(items.into_iter().filter_map(scalar_text).collect())
            }
            other => Self::Json(other),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Self::Flag(flag) => Value::Bool(*flag),
            Self::Photos(photos) => Value::Array(photos.iter().map(Photo::to_json).collect()),
            Self::Json(value) => value.clone(),
        }
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn json_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Canonical record of one post.
///
/// Empty strings and empty lists are never stored: setters normalize them to
/// "absent", so `Some` and non-empty `Vec` always mean "populated".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    /// Microformats type tag, e.g. `h-entry`.
    pub entry_type: String,
    pub content: Option<String>,
    pub name: Option<String>,
    pub category: Vec<String>,
    pub date: Option<String>,
    pub updated: Option<String>,
    pub slug: Option<String>,
    pub status: Option<String>,
    pub visibility: Option<String>,
    pub deleted: bool,
    pub like_of: Option<String>,
    pub bookmark_of: Option<String>,
    pub in_reply_to: Option<String>,
    pub rsvp: Option<String>,
    pub watch_of: Option<String>,
    pub read_of: Option<String>,
    pub listen_of: Option<String>,
    pub play_of: Option<String>,
    pub photo: Vec<Photo>,
    pub client_id: Option<String>,
    /// Unrecognized properties, keyed by canonical name.
    pub extra: BTreeMap<String, Value>,
}

impl Entry {
    pub fn new(entry_type: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            ..Self::default()
        }
    }

    fn text_slot(&self, field: Field) -> Option<&Option<String>> {
        Some(match field {
            Field::Name => &self.name,
            Field::Content => &self.content,
            Field::Date => &self.date,
            Field::Updated => &self.updated,
            Field::Slug => &self.slug,
            Field::Status => &self.status,
            Field::Visibility => &self.visibility,
            Field::LikeOf => &self.like_of,
            Field::BookmarkOf => &self.bookmark_of,
            Field::InReplyTo => &self.in_reply_to,
            Field::Rsvp => &self.rsvp,
            Field::WatchOf => &self.watch_of,
            Field::ReadOf => &self.read_of,
            Field::ListenOf => &self.listen_of,
            Field::PlayOf => &self.play_of,
            Field::ClientId => &self.client_id,
            Field::Category | Field::Photo | Field::Deleted => return None,
        })
    }

    fn text_slot_mut(&mut self, field: Field) -> Option<&mut Option<String>> {
        Some(match field {
            Field::Name => &mut self.name,
            Field::Content => &mut self.content,
            Field::Date => &mut self.date,
            Field::Updated => &mut self.updated,
            Field::Slug => &mut self.slug,
            Field::Status => &mut self.status,
            Field::Visibility => &mut self.visibility,
            Field::LikeOf => &mut self.like_of,
            Field::BookmarkOf => &mut self.bookmark_of,
            Field::InReplyTo => &mut self.in_reply_to,
            Field::Rsvp => &mut self.rsvp,
            Field::WatchOf => &mut self.watch_of,
            Field::ReadOf => &mut self.read_of,
            Field::ListenOf => &mut self.listen_of,
            Field::PlayOf => &mut self.play_of,
            Field::ClientId => &mut self.client_id,
            Field::Category | Field::Photo | Field::Deleted => return None,
        })
    }

    /// Value of a singular text field, `None` for plural or flag fields.
    pub fn text(&self, field: Field) -> Option<&str> {
        self.text_slot(field).and_then(|slot| slot.as_deref())
    }

    /// Read a property by canonical key. `None` when absent.
    pub fn get(&self, key: &str) -> Option<PropertyValue> {
        let Some(field) = Field::from_key(key) else {
            return self.extra.get(key).cloned().map(PropertyValue::from_json);
        };
        match field {
            Field::Category => {
                (!self.category.is_empty()).then(|| PropertyValue::List(self.category.clone()))
            }
            Field::Photo => (!self.photo.is_empty()).then(|| PropertyValue::Photos(self.photo.clone())),
            Field::Deleted => self.deleted.then_some(PropertyValue::Flag(true)),
            text_field => self
                .text(text_field)
                .map(|text| PropertyValue::Text(text.to_string())),
        }
    }

    /// Write a property by canonical key. Empty values clear the property.
    pub fn set(&mut self, key: &str, value: PropertyValue) {
        if value.is_empty() {
            self.remove(key);
            return;
        }
        let Some(field) = Field::from_key(key) else {
            self.extra.insert(key.to_string(), value.to_json());
            return;
        };
        match field {
            Field::Category => self.category = value.into_list(),
            Field::Photo => self.photo = value.into_photos(),
            Field::Deleted => self.deleted = value.into_flag(),
            text_field => {
                if let Some(slot) = self.text_slot_mut(text_field) {
                    *slot = value.into_text().filter(|text| !text.is_empty());
                }
            }
        }
    }

    /// Remove a property. Returns whether anything was actually removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(field) = Field::from_key(key) else {
            return self.extra.remove(key).is_some();
        };
        match field {
            Field::Category => !std::mem::take(&mut self.category).is_empty(),
            Field::Photo => !std::mem::take(&mut self.photo).is_empty(),
            Field::Deleted => std::mem::replace(&mut self.deleted, false),
            text_field => self
                .text_slot_mut(text_field)
                .and_then(Option::take)
                .is_some(),
        }
    }

    /// Canonical keys of every populated property, known fields first.
    pub fn populated_keys(&self) -> Vec<String> {
        Field::ALL
            .iter()
            .map(Field::key)
            .filter(|key| self.get(key).is_some())
            .map(str::to_string)
            .chain(self.extra.keys().cloned())
            .collect()
    }

    pub fn has_response_marker(&self) -> bool {
        Field::ALL
            .iter()
            .filter(|field| field.is_response_marker())
            .any(|field| self.text(*field).is_some())
    }

    /// A post worth persisting has a body, a title, or reacts to something.
    pub fn is_meaningful(&self) -> bool {
        self.content.as_deref().is_some_and(|text| !text.trim().is_empty())
            || self.name.is_some()
            || self.has_response_marker()
    }

    /// Nothing beyond bookkeeping timestamps is populated.
    pub fn is_blank(&self) -> bool {
        self.populated_keys()
            .iter()
            .all(|key| key == Field::Date.key() || key == Field::Updated.key())
    }

    /// Drop every property without a dedicated field.
    pub fn strip_unknown(&mut self) {
        self.extra.clear();
    }

    /// The entry as a flat JSON object (canonical keys, singular values).
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::String(self.entry_type.clone()));
        for key in self.populated_keys() {
            if let Some(value) = self.get(&key) {
                map.insert(key, value.to_json());
            }
        }
        Value::Object(map)
    }
}
