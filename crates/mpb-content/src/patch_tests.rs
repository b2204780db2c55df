use super::*;

const PASS: UnknownProperties = UnknownProperties::Passthrough;

fn entry_with_categories(categories: &[&str]) -> Entry {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.content = Some("hello".into());
    entry.category = categories.iter().map(|c| c.to_string()).collect();
    entry
}

fn patch(request: Value) -> Patch {
    Patch::from_request(&request).unwrap().unwrap()
}

// --- from_request ---

#[test]
fn test_from_request_shapes() {
    assert!(matches!(patch(json!({"replace": {"content": ["x"]}})), Patch::Replace(_)));
    assert!(matches!(patch(json!({"add": {"category": ["x"]}})), Patch::Add(_)));
    assert!(matches!(
        patch(json!({"delete": {"category": ["x"]}})),
        Patch::DeleteValues(_)
    ));
    assert_eq!(
        patch(json!({"delete": ["category"]})),
        Patch::DeleteProperties(vec!["category".into()])
    );
}

#[test]
fn test_from_request_without_verb_is_none() {
    assert_eq!(Patch::from_request(&json!({"url": "https://x"})).unwrap(), None);
    assert_eq!(Patch::from_request(&json!({})).unwrap(), None);
}

#[test]
fn test_from_request_rejects_multiple_verbs() {
    let err = Patch::from_request(&json!({"add": {}, "delete": []})).unwrap_err();
    assert_eq!(err, PublishError::invalid_patch());
}

#[test]
fn test_from_request_rejects_wrong_shapes() {
    assert!(Patch::from_request(&json!({"replace": ["content"]})).is_err());
    assert!(Patch::from_request(&json!({"add": "x"})).is_err());
    assert!(Patch::from_request(&json!({"delete": [1, 2]})).is_err());
    assert!(Patch::from_request(&json!("delete")).is_err());
}

#[test]
fn test_verb_names() {
    assert_eq!(Patch::add_tombstone().verb(), "add");
    assert_eq!(Patch::remove_tombstone().verb(), "delete");
    assert_eq!(patch(json!({"replace": {"a": ["b"]}})).verb(), "replace");
}

// --- delete by name ---

#[test]
fn test_delete_missing_property_is_noop() {
    let mut entry = entry_with_categories(&["one"]);
    entry.like_of = Some("https://liked.example".into());
    let before = entry.clone();

    let result = apply_patch(&patch(json!({"delete": ["in-reply-to"]})), &entry, PASS);
    assert_eq!(result, None);
    assert_eq!(entry, before);
}

#[test]
fn test_delete_property_by_name() {
    let mut entry = entry_with_categories(&["one"]);
    entry.like_of = Some("https://liked.example".into());

    let patched = apply_patch(&patch(json!({"delete": ["like-of", "nope"]})), &entry, PASS).unwrap();
    assert_eq!(patched.like_of, None);
    assert_eq!(entry.like_of.as_deref(), Some("https://liked.example"));
}

#[test]
fn test_delete_property_uses_aliases() {
    let entry = entry_with_categories(&["one"]);
    let patched = apply_patch(&patch(json!({"delete": ["tags"]})), &entry, PASS).unwrap();
    assert!(patched.category.is_empty());
}

// --- add ---

#[test]
fn test_add_appends_to_list() {
    let entry = entry_with_categories(&["one", "two", "three"]);
    let patched =
        apply_patch(&patch(json!({"add": {"category": ["four", "five"]}})), &entry, PASS).unwrap();
    assert_eq!(patched.category, vec!["one", "two", "three", "four", "five"]);
}

#[test]
fn test_add_sets_missing_property() {
    let entry = entry_with_categories(&[]);
    let patched = apply_patch(&patch(json!({"add": {"category": ["new"]}})), &entry, PASS).unwrap();
    assert_eq!(patched.category, vec!["new"]);

    let patched =
        apply_patch(&patch(json!({"add": {"in-reply-to": ["https://r.example"]}})), &entry, PASS)
            .unwrap();
    assert_eq!(patched.in_reply_to.as_deref(), Some("https://r.example"));
}

#[test]
fn test_add_ignores_photo() {
    let entry = entry_with_categories(&["one"]);
    let result = apply_patch(
        &patch(json!({"add": {"photo": ["https://photos.example/1.jpg"]}})),
        &entry,
        PASS,
    );
    assert_eq!(result, None);
}

#[test]
fn test_add_tombstone() {
    let entry = entry_with_categories(&["one"]);
    let patched = apply_patch(&Patch::add_tombstone(), &entry, PASS).unwrap();
    assert!(patched.deleted);

    let restored = apply_patch(&Patch::remove_tombstone(), &patched, PASS).unwrap();
    assert!(!restored.deleted);
    assert_eq!(apply_patch(&Patch::remove_tombstone(), &restored, PASS), None);
}

#[test]
fn test_add_unknown_property_follows_policy() {
    let entry = entry_with_categories(&["one"]);
    let request = patch(json!({"add": {"syndication": ["https://a.example"]}}));

    let patched = apply_patch(&request, &entry, PASS).unwrap();
    assert_eq!(patched.extra["syndication"], json!(["https://a.example"]));

    assert_eq!(apply_patch(&request, &entry, UnknownProperties::Strict), None);
}

#[test]
fn test_add_extends_unknown_list() {
    let mut entry = entry_with_categories(&[]);
    entry.extra.insert("syndication".into(), json!(["https://a.example"]));
    let patched = apply_patch(
        &patch(json!({"add": {"syndication": ["https://b.example"]}})),
        &entry,
        PASS,
    )
    .unwrap();
    assert_eq!(
        patched.extra["syndication"],
        json!(["https://a.example", "https://b.example"])
    );
}

#[test]
fn test_empty_add_is_noop() {
    let entry = entry_with_categories(&["one"]);
    assert_eq!(apply_patch(&patch(json!({"add": {}})), &entry, PASS), None);
    assert_eq!(apply_patch(&patch(json!({"add": {"category": []}})), &entry, PASS), None);
}

// --- delete by value ---

#[test]
fn test_delete_values_removes_only_present() {
    let entry = entry_with_categories(&["one", "two", "3"]);
    let patched =
        apply_patch(&patch(json!({"delete": {"category": ["3", "four"]}})), &entry, PASS).unwrap();
    assert_eq!(patched.category, vec!["one", "two"]);
}

#[test]
fn test_delete_values_without_match_is_noop() {
    let entry = entry_with_categories(&["one", "two"]);
    let result = apply_patch(&patch(json!({"delete": {"category": ["nine"]}})), &entry, PASS);
    assert_eq!(result, None);
}

#[test]
fn test_delete_values_skips_non_list_property() {
    let mut entry = entry_with_categories(&["one"]);
    entry.name = Some("Title".into());
    let result = apply_patch(&patch(json!({"delete": {"name": ["Title"]}})), &entry, PASS);
    assert_eq!(result, None);
}

#[test]
fn test_delete_last_value_removes_property() {
    let entry = entry_with_categories(&["one"]);
    let patched =
        apply_patch(&patch(json!({"delete": {"category": ["one"]}})), &entry, PASS).unwrap();
    assert!(patched.category.is_empty());
    assert_eq!(patched.get("category"), None);
}

// --- replace ---

#[test]
fn test_replace_overwrites() {
    let entry = entry_with_categories(&["one", "two"]);
    let patched = apply_patch(
        &patch(json!({"replace": {"content": ["new body"], "category": ["solo"]}})),
        &entry,
        PASS,
    )
    .unwrap();
    assert_eq!(patched.content.as_deref(), Some("new body"));
    assert_eq!(patched.category, vec!["solo"]);
}

#[test]
fn test_replace_with_same_value_still_counts() {
    let entry = entry_with_categories(&["one"]);
    let patched =
        apply_patch(&patch(json!({"replace": {"content": ["hello"]}})), &entry, PASS).unwrap();
    assert_eq!(patched, entry);
}

#[test]
fn test_replace_html_content() {
    let entry = entry_with_categories(&[]);
    let patched = apply_patch(
        &patch(json!({"replace": {"content": [{"html": "<b>hi</b>"}]}})),
        &entry,
        PASS,
    )
    .unwrap();
    assert_eq!(patched.content.as_deref(), Some("<b>hi</b>"));
}

#[test]
fn test_replace_strict_ignores_unknown() {
    let entry = entry_with_categories(&[]);
    let request = patch(json!({"replace": {"content": ["x"], "location": ["geo:1,2"]}}));
    let patched = apply_patch(&request, &entry, UnknownProperties::Strict).unwrap();
    assert_eq!(patched.content.as_deref(), Some("x"));
    assert!(patched.extra.is_empty());
}

#[test]
fn test_patch_keeps_entry_type() {
    let mut entry = Entry::new("h-event");
    entry.content = Some("x".into());
    let patched =
        apply_patch(&patch(json!({"replace": {"content": ["y"]}})), &entry, PASS).unwrap();
    assert_eq!(patched.entry_type, "h-event");
}

#[test]
fn test_patch_on_untyped_entry() {
    let entry = Entry::default();
    let patched =
        apply_patch(&patch(json!({"add": {"content": ["hello"]}})), &entry, PASS).unwrap();
    assert_eq!(patched.content.as_deref(), Some("hello"));
}
