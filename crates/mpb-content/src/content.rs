//! Classification and serialization of entries.
//!
//! [`classify`] picks the post kind, [`format`] stamps dates and computes the
//! storage path, [`output`] renders the persisted document:
//!
//! ```text
//! ---
//! date: 2021-09-09T12:23:34.120Z
//! title: "Title"
//! tags:
//!  - one
//!  - two
//! ---
//!
//! Body text
//! ```

use chrono::{DateTime, Utc};
use mpb_config::SiteConfig;
use mpb_core::{DEFAULT_ENTRY_TYPE, Entry, Field, MediaFile, PostKind, PropertyValue, PublishError};
use serde_json::Value;

use crate::fields::{is_reserved_header_key, storage_key};
use crate::parse::iso_timestamp;

type Rule = (fn(&Entry) -> bool, PostKind);

fn is_like(entry: &Entry) -> bool {
    entry.like_of.is_some()
}

fn is_bookmark(entry: &Entry) -> bool {
    entry.bookmark_of.is_some()
}

fn is_rsvp(entry: &Entry) -> bool {
    entry.rsvp.is_some() && entry.in_reply_to.is_some()
}

fn is_article(entry: &Entry) -> bool {
    entry.name.is_some()
}

fn is_watch(entry: &Entry) -> bool {
    entry.watch_of.is_some()
}

fn is_read(entry: &Entry) -> bool {
    entry.read_of.is_some()
}

fn is_listen(entry: &Entry) -> bool {
    entry.listen_of.is_some()
}

fn is_play(entry: &Entry) -> bool {
    entry.play_of.is_some()
}

fn always(_: &Entry) -> bool {
    true
}

/// Evaluated top to bottom; the first matching predicate wins.
const RULES: &[Rule] = &[
    (is_like, PostKind::Likes),
    (is_bookmark, PostKind::Bookmarks),
    (is_rsvp, PostKind::Rsvp),
    (is_article, PostKind::Articles),
    (is_watch, PostKind::Watched),
    (is_read, PostKind::Read),
    (is_listen, PostKind::Listens),
    (is_play, PostKind::Plays),
    (always, PostKind::Notes),
];

/// Post kind of an entry, `None` if nothing is populated.
pub fn classify(entry: &Entry) -> Option<PostKind> {
    if entry.is_blank() {
        return None;
    }
    RULES
        .iter()
        .find(|(matches, _)| matches(entry))
        .map(|(_, kind)| *kind)
}

/// Lowercase, keep `[A-Za-z0-9_-]` and spaces, trim, spaces → hyphens.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .trim()
        .replace(' ', "-")
}

/// Result of formatting an entry for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Formatted {
    pub kind: PostKind,
    /// `{content_dir}/{kind}/{slug}.md`
    pub filename: String,
    /// `{kind}/{slug}`, the public path of the post.
    pub slug: String,
    /// The rendered document.
    pub formatted: String,
    /// The entry with its dates stamped.
    pub data: Entry,
}

/// Stamp dates, classify, and compute the storage path.
pub fn format(entry: &Entry, site: &SiteConfig) -> Result<Formatted, PublishError> {
    format_at(entry, site, Utc::now())
}

/// [`format`] against a fixed clock.
pub fn format_at(
    entry: &Entry,
    site: &SiteConfig,
    now: DateTime<Utc>,
) -> Result<Formatted, PublishError> {
    let mut data = entry.clone();
    let stamp = iso_timestamp(now);
    if data.date.is_none() {
        data.date = Some(stamp);
    } else {
        data.updated = Some(stamp);
    }

    let kind = classify(&data).ok_or_else(PublishError::unparsable_data)?;
    let slug = format!("{kind}/{}", path_slug(&data, site, now));
    Ok(Formatted {
        kind,
        filename: format!("{}/{slug}.md", site.content_dir),
        slug,
        formatted: output(&data),
        data,
    })
}

fn path_slug(entry: &Entry, site: &SiteConfig, now: DateTime<Utc>) -> String {
    let slug = [entry.slug.as_deref(), entry.name.as_deref()]
        .into_iter()
        .flatten()
        .map(slugify)
        .find(|slug| !slug.is_empty())
        .unwrap_or_else(|| now.timestamp().to_string());
    if site.full_date_filenames {
        format!("{}-{slug}", now.format("%Y-%m-%d"))
    } else {
        slug
    }
}

/// Storage path for an uploaded file, `None` without a filename.
pub fn media_filename(file: &MediaFile, site: &SiteConfig) -> Option<String> {
    media_filename_at(file, site, Utc::now())
}

pub fn media_filename_at(file: &MediaFile, site: &SiteConfig, now: DateTime<Utc>) -> Option<String> {
    let name = file.filename.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(format!("{}/{}_{name}", site.media_dir, now.timestamp()))
}

/// Plain YAML scalar when it reads back as the same string, quoted otherwise.
fn yaml_scalar(text: &str) -> String {
    let plain = !text.is_empty()
        && text.trim() == text
        && !text.contains('\n')
        && matches!(
            serde_yaml::from_str::<serde_yaml::Value>(text),
            Ok(serde_yaml::Value::String(ref parsed)) if parsed == text
        );
    if plain { text.to_string() } else { quoted(text) }
}

/// YAML double-quoted scalar. JSON string escapes are valid YAML escapes.
fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text.replace('"', "\\\"")))
}

fn push_list(out: &mut String, key: &str, items: &[String]) {
    out.push_str(key);
    out.push_str(":\n");
    for item in items {
        out.push_str(" - ");
        out.push_str(&yaml_scalar(item));
        out.push('\n');
    }
}

fn push_line(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

/// Extension keys come from requests, so they get the same quoting as values.
fn push_extra(out: &mut String, key: &str, value: &Value) {
    if is_reserved_header_key(key) {
        return;
    }
    let key = yaml_scalar(key);
    match PropertyValue::from_json(value.clone()) {
        PropertyValue::Text(text) => push_line(out, &key, &yaml_scalar(&text)),
        PropertyValue::List(items) if !items.is_empty() => push_list(out, &key, &items),
        PropertyValue::Flag(true) => push_line(out, &key, "true"),
        PropertyValue::Json(other) if !other.is_null() => push_line(out, &key, &other.to_string()),
        _ => {}
    }
}

/// Render the persisted document: header, blank line, body.
pub fn output(entry: &Entry) -> String {
    let mut out = String::from("---\n");
    if !entry.entry_type.is_empty() && entry.entry_type != DEFAULT_ENTRY_TYPE {
        push_line(&mut out, "type", &yaml_scalar(&entry.entry_type));
    }

    for field in Field::ALL {
        let key = storage_key(field.key());
        match field {
            Field::Content | Field::Photo => {}
            Field::Name => {
                if let Some(name) = &entry.name {
                    push_line(&mut out, key, &quoted(name));
                }
            }
            Field::Category => {
                if !entry.category.is_empty() {
                    push_list(&mut out, key, &entry.category);
                }
            }
            Field::Deleted => {
                if entry.deleted {
                    push_line(&mut out, key, "true");
                }
            }
            Field::Status if entry.status.as_deref() == Some("draft") => {
                push_line(&mut out, "draft", "true");
            }
            text_field => {
                if let Some(text) = entry.text(text_field) {
                    push_line(&mut out, key, &yaml_scalar(text));
                }
            }
        }
    }

    for (key, value) in &entry.extra {
        push_extra(&mut out, key, value);
    }

    out.push_str("---\n\n");
    if let Some(content) = &entry.content {
        out.push_str(content);
    }
    out
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
