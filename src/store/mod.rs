//! The durable key-value store the ledger persists into.
//!
//! `KeyValueStore` is the seam between the ledger and whatever actually holds the bytes. The
//! crate ships a file-backed implementation and an in-memory one.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A durable mapping of string keys to string payloads.
///
/// Reads and writes are async because file and browser storage are. Each call is complete when
/// its future resolves; a `set` that returned `Ok` is visible to the next `get`.
#[async_trait::async_trait]
pub trait KeyValueStore {
    /// Returns the payload stored under `key`, or `None` if nothing is stored there.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Replaces the payload stored under `key`.
    async fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}
