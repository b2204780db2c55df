use super::*;
use crate::parse::{FormFields, from_flat_form, from_persisted_text, from_structured_properties};
use mpb_core::Photo;
use chrono::TimeZone;
use serde_json::json;

fn site() -> SiteConfig {
    SiteConfig {
        me: "https://example.com/".into(),
        ..SiteConfig::default()
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 10, 9, 12, 0, 0).unwrap()
}

fn article() -> Entry {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.name = Some("Title".into());
    entry.content = Some("hello".into());
    entry.category = vec!["one".into(), "two".into()];
    entry
}

// --- classify ---

#[test]
fn test_classify_blank_is_none() {
    assert_eq!(classify(&Entry::new(DEFAULT_ENTRY_TYPE)), None);
    let mut dated = Entry::new(DEFAULT_ENTRY_TYPE);
    dated.date = Some("2021-09-09T12:23:34.120Z".into());
    assert_eq!(classify(&dated), None);
}

#[test]
fn test_classify_like_beats_article() {
    let mut entry = article();
    entry.like_of = Some("https://liked.example".into());
    assert_eq!(classify(&entry), Some(PostKind::Likes));
}

#[test]
fn test_classify_priority_order() {
    let cases: [(fn(&mut Entry), PostKind); 8] = [
        (|e: &mut Entry| e.bookmark_of = Some("https://b.example".into()), PostKind::Bookmarks),
        (
            |e: &mut Entry| {
                e.rsvp = Some("yes".into());
                e.in_reply_to = Some("https://event.example".into());
            },
            PostKind::Rsvp,
        ),
        (|e: &mut Entry| e.name = Some("Title".into()), PostKind::Articles),
        (|e: &mut Entry| e.watch_of = Some("https://film.example".into()), PostKind::Watched),
        (|e: &mut Entry| e.read_of = Some("https://book.example".into()), PostKind::Read),
        (|e: &mut Entry| e.listen_of = Some("https://song.example".into()), PostKind::Listens),
        (|e: &mut Entry| e.play_of = Some("https://game.example".into()), PostKind::Plays),
        (|e: &mut Entry| e.content = Some("just words".into()), PostKind::Notes),
    ];
    for (populate, expected) in cases {
        let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
        populate(&mut entry);
        assert_eq!(classify(&entry), Some(expected), "{entry:?}");
    }
}

#[test]
fn test_classify_rsvp_needs_reply_target() {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.rsvp = Some("yes".into());
    entry.content = Some("see you".into());
    assert_eq!(classify(&entry), Some(PostKind::Notes));
}

#[test]
fn test_classify_article_beats_citation() {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.name = Some("Review".into());
    entry.watch_of = Some("https://film.example".into());
    assert_eq!(classify(&entry), Some(PostKind::Articles));
}

// --- slugify ---

#[test]
fn test_slugify() {
    assert_eq!(slugify("Hello World"), "hello-world");
    assert_eq!(slugify("  What's up?  "), "whats-up");
    assert_eq!(slugify("snake_case-and-kebab"), "snake_case-and-kebab");
    assert_eq!(slugify("¿¡!"), "");
}

proptest::proptest! {
    #[test]
    fn slugify_output_is_path_safe(text in ".*") {
        let slug = slugify(&text);
        proptest::prop_assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'));
    }

    #[test]
    fn slugify_is_idempotent(text in ".*") {
        let once = slugify(&text);
        proptest::prop_assert_eq!(slugify(&once), once);
    }
}

// --- format ---

#[test]
fn test_format_note_uses_unix_seconds() {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.content = Some("hello".into());

    let formatted = format_at(&entry, &site(), now()).unwrap();
    let secs = now().timestamp();
    assert_eq!(formatted.kind, PostKind::Notes);
    assert_eq!(formatted.filename, format!("src/notes/{secs}.md"));
    assert_eq!(formatted.slug, format!("notes/{secs}"));
}

#[test]
fn test_format_article_slug_from_title() {
    let formatted = format_at(&article(), &site(), now()).unwrap();
    assert_eq!(formatted.kind, PostKind::Articles);
    assert_eq!(formatted.filename, "src/articles/title.md");
    assert_eq!(formatted.slug, "articles/title");
}

#[test]
fn test_format_explicit_slug_wins() {
    let mut entry = article();
    entry.slug = Some("This is a Slug".into());
    let formatted = format_at(&entry, &site(), now()).unwrap();
    assert_eq!(formatted.slug, "articles/this-is-a-slug");
}

#[test]
fn test_format_unsluggable_title_falls_back_to_timestamp() {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.name = Some("???".into());
    let formatted = format_at(&entry, &site(), now()).unwrap();
    assert_eq!(formatted.slug, format!("articles/{}", now().timestamp()));
}

#[test]
fn test_format_full_date_prefix() {
    let mut site = site();
    site.full_date_filenames = true;
    let formatted = format_at(&article(), &site, now()).unwrap();
    assert_eq!(formatted.filename, "src/articles/2021-10-09-title.md");
}

#[test]
fn test_format_sets_date_once_then_updated() {
    let first = format_at(&article(), &site(), now()).unwrap();
    assert_eq!(first.data.date.as_deref(), Some("2021-10-09T12:00:00.000Z"));
    assert_eq!(first.data.updated, None);

    let later = now() + chrono::Duration::days(1);
    let second = format_at(&first.data, &site(), later).unwrap();
    assert_eq!(second.data.date, first.data.date);
    assert_eq!(second.data.updated.as_deref(), Some("2021-10-10T12:00:00.000Z"));
}

#[test]
fn test_format_does_not_touch_input() {
    let entry = article();
    let _ = format_at(&entry, &site(), now()).unwrap();
    assert_eq!(entry.date, None);
}

#[test]
fn test_format_blank_entry_fails() {
    let err = format_at(&Entry::new(DEFAULT_ENTRY_TYPE), &site(), now()).unwrap_err();
    assert_eq!(err, PublishError::unparsable_data());
}

// --- output ---

#[test]
fn test_output_layout() {
    let mut entry = article();
    entry.date = Some("2021-09-09T12:23:34.120Z".into());
    assert_eq!(
        output(&entry),
        "---\n\
         date: 2021-09-09T12:23:34.120Z\n\
         title: \"Title\"\n\
         tags:\n - one\n - two\n\
         ---\n\
         \n\
         hello"
    );
}

#[test]
fn test_output_flags_only_when_true() {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.content = Some("x".into());
    assert!(!output(&entry).contains("deleted"));
    assert!(!output(&entry).contains("draft"));

    entry.deleted = true;
    entry.status = Some("draft".into());
    let text = output(&entry);
    assert!(text.contains("deleted: true\n"));
    assert!(text.contains("draft: true\n"));
    assert!(!text.contains("status"));
}

#[test]
fn test_output_non_draft_status_is_plain() {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.status = Some("published".into());
    assert!(output(&entry).contains("status: published\n"));
}

#[test]
fn test_output_type_only_when_not_default() {
    let mut entry = Entry::new("h-event");
    entry.content = Some("x".into());
    assert!(output(&entry).starts_with("---\ntype: h-event\n"));
    assert!(!output(&article()).contains("type:"));
}

#[test]
fn test_output_excludes_content_and_photo_from_header() {
    let mut entry = article();
    entry.photo = vec![Photo::link("https://photos.example/1.jpg")];
    let text = output(&entry);
    let header = text.split("---\n\n").next().unwrap();
    assert!(!header.contains("content"));
    assert!(!header.contains("photo"));
}

#[test]
fn test_output_quotes_ambiguous_scalars() {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.content = Some("x".into());
    entry.slug = Some("true".into());
    entry.visibility = Some("key: value".into());
    entry.extra.insert("count".into(), json!("42"));
    let text = output(&entry);
    assert!(text.contains("slug: \"true\"\n"));
    assert!(text.contains("visibility: \"key: value\"\n"));
    assert!(text.contains("count: \"42\"\n"));
}

#[test]
fn test_output_title_with_quotes_is_escaped() {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.name = Some("Say \"hi\"".into());
    let parsed = from_persisted_text(&output(&entry)).unwrap();
    assert_eq!(parsed.name.as_deref(), Some("Say \"hi\""));
}

#[test]
fn test_output_extra_list_and_object() {
    let mut entry = Entry::new(DEFAULT_ENTRY_TYPE);
    entry.content = Some("x".into());
    entry.extra.insert("syndication".into(), json!(["https://a.example"]));
    entry.extra.insert("location".into(), json!({"lat": 1}));
    let text = output(&entry);
    assert!(text.contains("syndication:\n - https://a.example\n"));
    assert!(text.contains("location: {\"lat\":1}\n"));
}

#[test]
fn test_output_client_id() {
    let mut entry = article();
    entry.client_id = Some("https://app.example/".into());
    assert!(output(&entry).contains("client_id: https://app.example/\n"));
}

// --- round trip ---

#[test]
fn test_round_trip_preserves_content_name_category() {
    let formatted = format_at(&article(), &site(), now()).unwrap();
    let parsed = from_persisted_text(&formatted.formatted).unwrap();
    assert_eq!(parsed.content, formatted.data.content);
    assert_eq!(parsed.name, formatted.data.name);
    assert_eq!(parsed.category, formatted.data.category);
    assert_eq!(parsed.date, formatted.data.date);
}

#[test]
fn test_round_trip_keeps_flags_and_extras() {
    let mut entry = article();
    entry.deleted = true;
    entry.status = Some("draft".into());
    entry.like_of = Some("https://liked.example/".into());
    entry.client_id = Some("https://app.example/".into());
    entry.extra.insert("syndication".into(), json!(["https://a.example"]));
    entry.category = vec!["3".into(), "yes".into()];

    let parsed = from_persisted_text(&output(&entry)).unwrap();
    assert!(parsed.deleted);
    assert_eq!(parsed.status.as_deref(), Some("draft"));
    assert_eq!(parsed.like_of, entry.like_of);
    assert_eq!(parsed.client_id, entry.client_id);
    assert_eq!(parsed.category, entry.category);
    assert_eq!(parsed.extra["syndication"], json!(["https://a.example"]));
}

#[test]
fn test_round_trip_quotes_awkward_extension_keys() {
    for key in ["geo: lat", "note #1", "- odd", "line\nbreak", "123", "[tag"] {
        let entry = from_structured_properties(&json!({
            "type": ["h-entry"],
            "properties": {"content": ["hi"], key: ["x"]}
        }))
        .unwrap();
        let text = output(&entry);
        let parsed = from_persisted_text(&text)
            .unwrap_or_else(|error| panic!("{key:?} broke the header: {error}\n{text}"));
        assert_eq!(parsed.extra.get(key), entry.extra.get(key), "key {key:?}");
        assert_eq!(parsed.content.as_deref(), Some("hi"));
    }
}

#[test]
fn test_output_skips_reserved_extension_keys() {
    let mut entry = Entry::new("h-card");
    entry.content = Some("x".into());
    entry.extra.insert("type".into(), json!("bogus"));
    entry.extra.insert("draft".into(), json!(["yes"]));
    let text = output(&entry);
    assert_eq!(text.matches("type:").count(), 1);
    assert!(!text.contains("draft"));

    let parsed = from_persisted_text(&text).unwrap();
    assert_eq!(parsed.entry_type, "h-card");
    assert_eq!(parsed.status, None);
}

#[test]
fn test_round_trip_form_type_field_cannot_replace_type() {
    let form = FormFields::from_pairs([("h", "entry"), ("content", "hi"), ("type", "bogus")]);
    let entry = from_flat_form(&form).unwrap();
    assert!(!entry.extra.contains_key("type"));

    let parsed = from_persisted_text(&output(&entry)).unwrap();
    assert_eq!(parsed.entry_type, DEFAULT_ENTRY_TYPE);
}

// --- media ---

#[test]
fn test_media_filename() {
    let file = MediaFile {
        filename: "photo.jpg".into(),
        content: vec![1],
        content_type: Some("image/jpeg".into()),
    };
    assert_eq!(
        media_filename_at(&file, &site(), now()),
        Some(format!("uploads/{}_photo.jpg", now().timestamp()))
    );
}

#[test]
fn test_media_filename_requires_name() {
    let file = MediaFile {
        filename: String::new(),
        content: vec![1],
        content_type: None,
    };
    assert_eq!(media_filename(&file, &site()), None);
}

#[test]
fn test_media_filename_drops_client_directories() {
    let file = MediaFile {
        filename: "C:\\Users\\me\\cat.png".into(),
        content: vec![],
        content_type: None,
    };
    assert_eq!(
        media_filename_at(&file, &site(), now()),
        Some(format!("uploads/{}_cat.png", now().timestamp()))
    );
}
