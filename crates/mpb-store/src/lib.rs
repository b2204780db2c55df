mod local;
mod memory;
mod store;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use store::{DirEntry, FileStore, StoredFile};
