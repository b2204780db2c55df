//! Normalization of incoming requests and stored documents into [`Entry`].
//!
//! Three shapes reach the bridge:
//! - structured JSON: `{"type": ["h-entry"], "properties": {"name": ["..."]}}`
//! - flat form fields: `h=entry&name=...&category[]=a&category[]=b`
//! - persisted text: YAML-style front matter followed by the post body
//!
//! All three funnel through [`canonical_key`] and the same per-property
//! rules, so a property means the same thing whichever way it arrived.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use mpb_core::{DEFAULT_ENTRY_TYPE, Entry, Field, MediaFile, Photo, PropertyValue, PublishError};
use serde_json::Value;

use crate::fields::{canonical_key, is_reserved_header_key};

/// Keys in a form body that steer the request rather than describe the post.
const FORM_CONTROL_KEYS: &[&str] = &["h", "type", "action", "url", "access_token"];

/// Form keys that carry attachments, concatenated in this order.
const FORM_PHOTO_KEYS: &[&str] = &["photo", "file", "photo[]", "file[]"];

/// First element of a list, the value itself otherwise, `None` if falsy.
pub fn first_value(value: &Value) -> Option<Value> {
    let value = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        other => Some(other.clone()),
    }
}

/// Scalar, list, or absent → list (`[]` when absent).
pub fn as_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

/// Text of a scalar, or of a Micropub `{html}` / `{value}` object.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(map) => map
            .get("html")
            .or_else(|| map.get("value"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn photo_from_json(value: &Value) -> Option<Photo> {
    match value {
        Value::String(url) if !url.is_empty() => Some(Photo::link(url.clone())),
        Value::Object(map) => {
            let alt = map.get("alt").and_then(Value::as_str).map(str::to_string);
            if let Some(filename) = map.get("filename").and_then(Value::as_str) {
                let content = map
                    .get("content")
                    .and_then(Value::as_str)
                    .map(|text| text.as_bytes().to_vec())
                    .unwrap_or_default();
                let content_type = map
                    .get("contentType")
                    .or_else(|| map.get("content_type"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                return Some(Photo::Upload {
                    file: MediaFile {
                        filename: filename.to_string(),
                        content,
                        content_type,
                    },
                    alt,
                });
            }
            map.get("value")
                .and_then(Value::as_str)
                .map(|value| Photo::Link {
                    value: value.to_string(),
                    alt,
                })
        }
        _ => None,
    }
}

/// Store one raw property under its canonical key.
fn apply_property(entry: &mut Entry, key: &str, raw: &Value) {
    match Field::from_key(key) {
        Some(Field::Photo) => {
            let photos = as_list(Some(raw)).iter().filter_map(photo_from_json).collect();
            entry.set(key, PropertyValue::Photos(photos));
        }
        Some(Field::Category) => {
            let items = as_list(Some(raw)).iter().filter_map(value_text).collect();
            entry.set(key, PropertyValue::List(items));
        }
        Some(_) => {
            if let Some(text) = first_value(raw).as_ref().and_then(value_text) {
                entry.set(key, PropertyValue::Text(text));
            }
        }
        None if key == "draft" => {
            if PropertyValue::from_json(raw.clone()).into_flag() {
                entry.status = Some("draft".to_string());
            }
        }
        None if is_reserved_header_key(key) => {
            tracing::debug!(key, "ignoring reserved property");
        }
        None => entry.set(key, PropertyValue::from_json(raw.clone())),
    }
}

/// Normalize a structured-properties document. `None` without `type` or `properties`.
pub fn from_structured_properties(doc: &Value) -> Option<Entry> {
    let doc = doc.as_object()?;
    let entry_type = doc
        .get("type")
        .and_then(first_value)
        .as_ref()
        .and_then(value_text)?;
    let properties = doc.get("properties")?.as_object()?;

    let mut entry = Entry::new(entry_type);
    for (raw_key, raw_value) in properties {
        let key = canonical_key(raw_key);
        if key == "type" {
            continue;
        }
        apply_property(&mut entry, &key, raw_value);
    }
    Some(entry)
}

/// One value of a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(MediaFile),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }
}

/// A flat form body. Repeated keys accumulate values in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: BTreeMap<String, Vec<FormValue>>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = Self::new();
        for (key, value) in pairs {
            fields.push_text(key, value);
        }
        fields
    }

    pub fn push(&mut self, key: impl Into<String>, value: FormValue) {
        self.fields.entry(key.into()).or_default().push(value);
    }

    pub fn push_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.push(key, FormValue::Text(value.into()));
    }

    pub fn push_file(&mut self, key: impl Into<String>, file: MediaFile) {
        self.push(key, FormValue::File(file));
    }

    pub fn get(&self, key: &str) -> &[FormValue] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First text value of a field, ignoring empty strings.
    pub fn first_text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .iter()
            .filter_map(FormValue::as_text)
            .find(|text| !text.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FormValue])> {
        self.fields
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}

fn photo_from_form(value: &FormValue) -> Option<Photo> {
    match value {
        FormValue::Text(url) if !url.is_empty() => Some(Photo::link(url.clone())),
        FormValue::Text(_) => None,
        FormValue::File(file) => Some(Photo::Upload {
            file: file.clone(),
            alt: None,
        }),
    }
}

/// Normalize a flat form body. `None` without an `h` field.
pub fn from_flat_form(fields: &FormFields) -> Option<Entry> {
    let h = fields.first_text("h")?;
    let mut entry = Entry::new(format!("h-{h}"));

    for (raw_key, values) in fields.iter() {
        if FORM_CONTROL_KEYS.contains(&raw_key) || FORM_PHOTO_KEYS.contains(&raw_key) {
            continue;
        }
        let key = canonical_key(raw_key);
        let texts: Vec<Value> = values
            .iter()
            .filter_map(FormValue::as_text)
            .map(|text| Value::String(text.to_string()))
            .collect();
        let raw = match (Field::from_key(&key), texts.len()) {
            (None, 1) => texts.into_iter().next().unwrap_or(Value::Null),
            _ => Value::Array(texts),
        };
        apply_property(&mut entry, &key, &raw);
    }

    entry.photo = FORM_PHOTO_KEYS
        .iter()
        .flat_map(|key| fields.get(key))
        .filter_map(photo_from_form)
        .collect();
    Some(entry)
}

/// ISO-8601 UTC with millisecond precision, the format written to headers.
pub fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Convert a stored date to ISO-8601. Unrecognized text is kept verbatim.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return iso_timestamp(parsed.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%.f %z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(parsed) = DateTime::parse_from_str(raw, pattern) {
            return iso_timestamp(parsed.with_timezone(&Utc));
        }
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return iso_timestamp(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return iso_timestamp(midnight.and_utc());
    }
    raw.to_string()
}

/// Split a document into its front-matter header and body.
fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    let after_open = trimmed.strip_prefix("---")?;
    let after_open = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))?;

    if let Some(body) = after_open.strip_prefix("---") {
        return Some(("", body));
    }
    let close = after_open.find("\n---")?;
    let header = &after_open[..close];
    let rest = &after_open[close + 4..];
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => "",
    };
    Some((header, body))
}

fn header_photos(value: &Value) -> Vec<Photo> {
    as_list(Some(value)).iter().filter_map(photo_from_json).collect()
}

/// Parse a persisted document back into an entry.
pub fn from_persisted_text(text: &str) -> Result<Entry, PublishError> {
    let (header, body) = split_front_matter(text).ok_or_else(PublishError::unparsable_file)?;

    let attributes: serde_yaml::Value = if header.trim().is_empty() {
        serde_yaml::Value::Null
    } else {
        serde_yaml::from_str(header).map_err(|error| {
            tracing::warn!(%error, "front matter is not valid YAML");
            PublishError::unparsable_file()
        })?
    };
    let attributes: Value = serde_json::to_value(&attributes).map_err(|error| {
        tracing::warn!(%error, "front matter cannot be represented as properties");
        PublishError::unparsable_file()
    })?;
    let attributes = match attributes {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        _ => return Err(PublishError::unparsable_file()),
    };

    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    for (raw_key, raw_value) in &attributes {
        let key = canonical_key(raw_key);
        match key.as_str() {
            "type" => {
                if let Some(entry_type) = first_value(raw_value).as_ref().and_then(value_text) {
                    entry.entry_type = entry_type;
                }
            }
            "draft" => {
                if PropertyValue::from_json(raw_value.clone()).into_flag() {
                    entry.status = Some("draft".to_string());
                }
            }
            "content" => {}
            "date" | "updated" => {
                if let Some(text) = first_value(raw_value).as_ref().and_then(value_text) {
                    entry.set(&key, PropertyValue::Text(normalize_date(&text)));
                }
            }
            "photo" => entry.photo = header_photos(raw_value),
            _ => apply_property(&mut entry, &key, raw_value),
        }
    }

    let body = body.trim();
    entry.content = (!body.is_empty()).then(|| body.to_string());
    Ok(entry)
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
