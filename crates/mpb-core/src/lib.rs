//! Core types shared by every micropub-bridge crate: the canonical `Entry`
//! record, post kinds, and the publishing error taxonomy.

pub mod entry;
pub mod error;
pub mod types;

pub use entry::{DEFAULT_ENTRY_TYPE, Entry, Field, MediaFile, Photo, PropertyValue};
pub use error::{ErrorKind, PublishError};
pub use types::{PostKind, Published, UnknownProperties};
