//! Storage module
//!
//! Backends for device-local persistence, the fail-silent key-value store
//! layered on them, and the background writer the domain store uses.

pub mod backend;
pub mod kv;
pub mod persister;

pub use backend::{FileBackend, MemoryBackend, SqliteBackend, StorageBackend};
pub use kv::KeyValueStore;
pub use persister::Persister;
