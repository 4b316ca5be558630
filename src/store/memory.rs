use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Store;
use crate::error::StoreError;

/// In-process store. Clones share the same contents, so a test can keep
/// one handle while the reporter owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    values: BTreeMap<String, String>,
    writes: Vec<(String, String)>,
    failing: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future write to `key` fail.
    pub fn fail_on(&self, key: impl Into<String>) {
        self.inner.lock().failing.insert(key.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().values.get(key).cloned()
    }

    /// Current contents, last write wins.
    pub fn values(&self) -> BTreeMap<String, String> {
        self.inner.lock().values.clone()
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.inner.lock().writes.clone()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.values.clear();
        inner.writes.clear();
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.failing.contains(key) {
            return Err(StoreError::Unavailable(format!("write to {key} refused")));
        }

        inner.values.insert(key.to_owned(), value.to_owned());
        inner.writes.push((key.to_owned(), value.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_contents() {
        let observer = MemoryStore::new();
        let mut store = observer.clone();

        store.set("a:count", "1").await.unwrap();
        store.set("a:count", "2").await.unwrap();

        assert_eq!(observer.get("a:count").as_deref(), Some("2"));
        assert_eq!(observer.writes().len(), 2);
    }

    #[tokio::test]
    async fn injected_failures() {
        let mut store = MemoryStore::new();
        store.fail_on("bad:count");

        assert!(matches!(
            store.set("bad:count", "1").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.set("good:count", "1").await.is_ok());
        assert_eq!(store.values().len(), 1);
    }
}
