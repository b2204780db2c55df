//! Publish orchestration over a [`FileStore`](mpb_store::FileStore).
//!
//! [`Publisher`] sequences normalization, enrichment, classification and
//! storage for create, update, delete and undelete, plus the `q=source`,
//! `q=config` and media queries.

mod media;
mod publisher;
mod request;

pub use media::{MediaItem, MediaList, MediaQuery};
pub use publisher::Publisher;
pub use request::CreateRequest;
