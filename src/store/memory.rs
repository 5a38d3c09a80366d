//! Implements the `KeyValueStore` trait using in-memory data.
//!
//! Note: this is compiled in the library proper, not only for tests, so that an embedding
//! presentation layer can run the whole tracker without touching the filesystem.

use crate::error::Res;
use crate::store::KeyValueStore;
use std::collections::HashMap;

/// An implementation of `KeyValueStore` that holds every payload in a map.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct MemoryStore {
    data: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `value` under `key`.
    pub fn with(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut data = HashMap::new();
        data.insert(key.into(), value.into());
        Self { data }
    }

    /// The payload under `key`, without going through the async trait.
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Res<Option<String>> {
        Ok(self.data.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Res<()> {
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn memory_store_round_trip() {
    let mut store = MemoryStore::new();
    assert_eq!(store.get("k").await.unwrap(), None);
    store.set("k", "v1").await.unwrap();
    store.set("k", "v2").await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    assert_eq!(MemoryStore::with("k", "v").peek("k"), Some("v"));
}
