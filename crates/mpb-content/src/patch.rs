//! Partial updates: the `replace` / `add` / `delete` verbs.

use mpb_core::{DEFAULT_ENTRY_TYPE, Entry, Field, PropertyValue, PublishError, UnknownProperties};
use serde_json::{Map, Value, json};

use crate::fields::canonical_key;
use crate::parse::from_structured_properties;

const VERBS: [&str; 3] = ["replace", "add", "delete"];

/// One patch verb with its payload. Keys are raw request keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Overwrite every listed property.
    Replace(Map<String, Value>),
    /// Append to list properties, set the rest.
    Add(Map<String, Value>),
    /// Remove individual values from list properties.
    DeleteValues(Map<String, Value>),
    /// Remove whole properties by name.
    DeleteProperties(Vec<String>),
}

impl Patch {
    /// Parse the verb object of an update request.
    ///
    /// `Ok(None)` when no verb is present; an error when several are, or when
    /// a verb carries the wrong shape.
    pub fn from_request(request: &Value) -> Result<Option<Self>, PublishError> {
        let invalid = PublishError::invalid_patch;
        let Some(body) = request.as_object() else {
            return Err(invalid());
        };
        let mut present = VERBS.iter().filter(|verb| body.contains_key(**verb));
        let Some(verb) = present.next() else {
            return Ok(None);
        };
        if present.next().is_some() {
            return Err(invalid());
        }

        let patch = match (*verb, &body[*verb]) {
            ("replace", Value::Object(map)) => Self::Replace(map.clone()),
            ("add", Value::Object(map)) => Self::Add(map.clone()),
            ("delete", Value::Object(map)) => Self::DeleteValues(map.clone()),
            ("delete", Value::Array(names)) => Self::DeleteProperties(
                names
                    .iter()
                    .map(|name| name.as_str().map(str::to_string).ok_or_else(invalid))
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Err(invalid()),
        };
        Ok(Some(patch))
    }

    /// Soft delete: set the tombstone flag.
    pub fn add_tombstone() -> Self {
        let mut map = Map::new();
        map.insert(Field::Deleted.key().to_string(), json!(["true"]));
        Self::Add(map)
    }

    /// Undelete: drop the tombstone flag.
    pub fn remove_tombstone() -> Self {
        Self::DeleteProperties(vec![Field::Deleted.key().to_string()])
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Replace(_) => "replace",
            Self::Add(_) => "add",
            Self::DeleteValues(_) | Self::DeleteProperties(_) => "delete",
        }
    }
}

/// Apply `patch` to a copy of `entry`.
///
/// Returns the patched entry, or `None` when the patch changed nothing.
pub fn apply_patch(patch: &Patch, entry: &Entry, policy: UnknownProperties) -> Option<Entry> {
    let mut patched = entry.clone();
    let changed = match patch {
        Patch::DeleteProperties(names) => names
            .iter()
            .map(|name| patched.remove(&canonical_key(name)))
            .fold(false, |changed, removed| changed | removed),
        Patch::Replace(map) => {
            let updates = normalize_updates(entry, map, policy)?;
            for key in updates.populated_keys() {
                if let Some(value) = updates.get(&key) {
                    patched.set(&key, value);
                }
            }
            true
        }
        Patch::Add(map) => {
            let updates = normalize_updates(entry, map, policy)?;
            add_values(&mut patched, &updates)
        }
        Patch::DeleteValues(map) => {
            let updates = normalize_updates(entry, map, UnknownProperties::Passthrough)?;
            delete_values(&mut patched, &updates)
        }
    };
    changed.then_some(patched)
}

/// Run a verb payload through the structured normalizer.
/// `None` if it contributes no property.
fn normalize_updates(
    entry: &Entry,
    properties: &Map<String, Value>,
    policy: UnknownProperties,
) -> Option<Entry> {
    let entry_type = if entry.entry_type.is_empty() {
        DEFAULT_ENTRY_TYPE
    } else {
        entry.entry_type.as_str()
    };
    let mut updates = from_structured_properties(&json!({
        "type": [entry_type],
        "properties": properties,
    }))?;
    if !policy.keeps_unknown() {
        updates.strip_unknown();
    }
    (!updates.populated_keys().is_empty()).then_some(updates)
}

fn merge_keys(updates: &Entry) -> impl Iterator<Item = String> + '_ {
    updates
        .populated_keys()
        .into_iter()
        .filter(|key| key != Field::Photo.key())
}

fn add_values(entry: &mut Entry, updates: &Entry) -> bool {
    let mut changed = false;
    for key in merge_keys(updates) {
        let Some(incoming) = updates.get(&key) else {
            continue;
        };
        let merged = match entry.get(&key) {
            Some(PropertyValue::List(mut items)) => {
                items.extend(incoming.into_list());
                PropertyValue::List(items)
            }
            _ => incoming,
        };
        entry.set(&key, merged);
        changed = true;
    }
    changed
}

fn delete_values(entry: &mut Entry, updates: &Entry) -> bool {
    let mut changed = false;
    for key in merge_keys(updates) {
        let Some(PropertyValue::List(items)) = entry.get(&key) else {
            continue;
        };
        let doomed = updates.get(&key).map(PropertyValue::into_list).unwrap_or_default();
        let survivors: Vec<String> = items
            .iter()
            .filter(|item| !doomed.contains(item))
            .cloned()
            .collect();
        if survivors.len() != items.len() {
            entry.set(&key, PropertyValue::List(survivors));
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
