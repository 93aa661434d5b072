pub mod config_io;
pub mod file_store;
pub mod kv;
pub mod recovery;

pub use file_store::FileStore;
pub use kv::{KeyValueStore, MemoryStore, StorageError};
