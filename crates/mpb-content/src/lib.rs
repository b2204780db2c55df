//! Entry normalization, classification, serialization and patching.
//!
//! - [`parse`]: structured JSON, flat forms and persisted documents → [`Entry`]
//! - [`content`]: post kind, storage path, persisted document rendering
//! - [`patch`]: the `replace` / `add` / `delete` update verbs
//! - [`source`]: the `q=source` projection
//! - [`resolve`]: public URL → storage path
//! - [`title`]: best-effort title lookup for likes
//!
//! [`Entry`]: mpb_core::Entry

pub mod content;
pub mod fields;
pub mod parse;
pub mod patch;
pub mod resolve;
pub mod source;
pub mod title;

pub use content::{Formatted, classify, format, format_at, media_filename, output, slugify};
pub use fields::canonical_key;
pub use parse::{
    FormFields, FormValue, as_list, first_value, from_flat_form, from_persisted_text,
    from_structured_properties,
};
pub use patch::{Patch, apply_patch};
pub use resolve::url_to_filename;
pub use source::to_external_properties;
pub use title::{HttpTitleFetcher, NoopTitleFetcher, TitleFetcher, fetch_linked_title};
