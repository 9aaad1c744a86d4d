use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::{OptionStore, TrustedIp, TrustedIpStore, sort_entries};
use crate::error::StoreError;

/// In-process option store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryOptionStore {
    values: Arc<DashMap<String, String>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        for (k, v) in values {
            store.values.insert(k.into(), v.into());
        }
        store
    }

    /// Synchronous read, handy for assertions.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.value().clone())
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.snapshot(key))
    }

    async fn update(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        Ok(previous.as_deref() != Some(value))
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryTrustedIpStore {
    entries: Arc<DashMap<String, TrustedIp>>,
}

impl MemoryTrustedIpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TrustedIpStore for MemoryTrustedIpStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.contains_key(key))
    }

    async fn add(&self, key: &str, entry: &TrustedIp) -> Result<bool, StoreError> {
        self.entries.insert(key.to_string(), entry.clone());
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<(String, TrustedIp)>, StoreError> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        sort_entries(&mut entries);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_reports_whether_value_changed() {
        let store = MemoryOptionStore::new();
        assert!(store.update("k", "a").await.unwrap());
        assert!(!store.update("k", "a").await.unwrap());
        assert!(store.update("k", "b").await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("b"));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryOptionStore::new();
        let other = store.clone();
        store.update("k", "v").await.unwrap();
        assert_eq!(other.snapshot("k").as_deref(), Some("v"));
    }
}
