//! `q=source` projection: an entry back in Micropub structured form.

use mpb_core::{Entry, PropertyValue};
use serde_json::{Map, Value, json};

/// Canonical key → name used in the Micropub vocabulary.
const EXTERNAL_NAMES: &[(&str, &str)] = &[
    ("date", "published"),
    ("slug", "mp-slug"),
    ("status", "post-status"),
];

fn external_name(canonical: &str) -> &str {
    EXTERNAL_NAMES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, external)| *external)
        .unwrap_or(canonical)
}

/// Every value as a list: singular values become one-element lists.
fn as_property_list(value: PropertyValue) -> Value {
    match value.to_json() {
        Value::Array(items) => Value::Array(items),
        single => Value::Array(vec![single]),
    }
}

/// Project `entry` to `{type, properties}`.
///
/// With an allow-list, `type` is omitted and only the listed (external)
/// property names are returned.
pub fn to_external_properties(entry: &Entry, allow: Option<&[String]>) -> Value {
    let mut properties = Map::new();
    for key in entry.populated_keys() {
        let name = external_name(&key);
        if allow.is_some_and(|allow| !allow.iter().any(|allowed| allowed == name)) {
            continue;
        }
        if let Some(value) = entry.get(&key) {
            properties.insert(name.to_string(), as_property_list(value));
        }
    }

    match allow {
        Some(_) => json!({ "properties": properties }),
        None => json!({ "type": [entry.entry_type], "properties": properties }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpb_core::{DEFAULT_ENTRY_TYPE, Photo};

    fn sample() -> Entry {
        let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
        entry.name = Some("Title".into());
        entry.content = Some("Content goes here".into());
        entry.category = vec!["one".into(), "two".into()];
        entry.date = Some("2021-09-09T12:23:34.120Z".into());
        entry.slug = Some("a-slug".into());
        entry
    }

    #[test]
    fn test_full_projection() {
        let source = to_external_properties(&sample(), None);
        assert_eq!(source["type"], json!(["h-entry"]));
        let properties = &source["properties"];
        assert_eq!(properties["name"], json!(["Title"]));
        assert_eq!(properties["content"], json!(["Content goes here"]));
        assert_eq!(properties["category"], json!(["one", "two"]));
        assert_eq!(properties["published"], json!(["2021-09-09T12:23:34.120Z"]));
        assert_eq!(properties["mp-slug"], json!(["a-slug"]));
        assert!(properties.get("date").is_none());
    }

    #[test]
    fn test_allow_list_filters_and_drops_type() {
        let allow = vec!["content".to_string(), "name".to_string(), "mp-slug".to_string()];
        let source = to_external_properties(&sample(), Some(&allow));
        assert!(source.get("type").is_none());
        let properties = source["properties"].as_object().unwrap();
        assert!(properties.contains_key("content"));
        assert!(properties.contains_key("name"));
        assert!(properties.contains_key("mp-slug"));
        assert!(!properties.contains_key("category"));
    }

    #[test]
    fn test_flags_and_photos() {
        let mut entry = sample();
        entry.deleted = true;
        entry.photo = vec![Photo::Link {
            value: "https://photos.example/1.jpg".into(),
            alt: Some("a cat".into()),
        }];
        let source = to_external_properties(&entry, None);
        assert_eq!(source["properties"]["deleted"], json!([true]));
        assert_eq!(
            source["properties"]["photo"],
            json!([{"value": "https://photos.example/1.jpg", "alt": "a cat"}])
        );
    }
}
