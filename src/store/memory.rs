use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use super::KvStore;
use crate::errors::{KurzError, Result};

/// 内存中的值：字符串或哈希
#[derive(Debug, Clone)]
enum MemoryValue {
    Str(String),
    Hash(HashMap<String, String>),
}

fn wrong_type(key: &str) -> KurzError {
    KurzError::store_operation(format!(
        "WRONGTYPE operation against key '{}' holding the wrong kind of value",
        key
    ))
}

/// 基于 DashMap 的进程内存储
///
/// 单键操作持有分片锁，因此单个字段的写入/自增是原子的，语义与 Redis 一致。
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, MemoryValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// 对哈希键执行一次原子操作，键不存在时先创建空哈希
    fn with_hash_mut<T>(
        &self,
        key: &str,
        op: impl FnOnce(&mut HashMap<String, String>) -> Result<T>,
    ) -> Result<T> {
        let mut entry = self
            .inner
            .entry(key.to_string())
            .or_insert_with(|| MemoryValue::Hash(HashMap::new()));
        match entry.value_mut() {
            MemoryValue::Hash(hash) => op(hash),
            MemoryValue::Str(_) => Err(wrong_type(key)),
        }
    }

    fn with_hash<T>(&self, key: &str, op: impl FnOnce(Option<&HashMap<String, String>>) -> T) -> Result<T> {
        match self.inner.get(key) {
            Some(entry) => match entry.value() {
                MemoryValue::Hash(hash) => Ok(op(Some(hash))),
                MemoryValue::Str(_) => Err(wrong_type(key)),
            },
            None => Ok(op(None)),
        }
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> Result<()> {
        self.with_hash_mut(key, |hash| {
            for (field, value) in fields {
                hash.insert((*field).to_string(), value.clone());
            }
            Ok(())
        })
    }

    async fn hset_nx(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        self.with_hash_mut(key, |hash| {
            if hash.contains_key(field) {
                Ok(false)
            } else {
                hash.insert(field.to_string(), value.to_string());
                Ok(true)
            }
        })
    }

    async fn hmget(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>> {
        self.with_hash(key, |hash| {
            fields
                .iter()
                .map(|f| hash.and_then(|h| h.get(*f).cloned()))
                .collect()
        })
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        self.with_hash(key, |hash| hash.cloned().unwrap_or_default())
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        self.with_hash(key, |hash| hash.is_some_and(|h| h.contains_key(field)))
    }

    async fn hincr(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        self.with_hash_mut(key, |hash| {
            let current = match hash.get(field) {
                Some(raw) => raw.parse::<i64>().map_err(|_| {
                    KurzError::store_operation(format!(
                        "hash value is not an integer: {}/{}",
                        key, field
                    ))
                })?,
                None => 0,
            };
            let next = current.checked_add(delta).ok_or_else(|| {
                KurzError::store_operation(format!(
                    "increment would overflow: {}/{}",
                    key, field
                ))
            })?;
            hash.insert(field.to_string(), next.to_string());
            trace!("MemoryStore: {}/{} -> {}", key, field, next);
            Ok(next)
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.inner.get(key) {
            Some(entry) => match entry.value() {
                MemoryValue::Str(s) => Ok(Some(s.clone())),
                MemoryValue::Hash(_) => Err(wrong_type(key)),
            },
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .insert(key.to_string(), MemoryValue::Str(value.to_string()));
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str) -> Result<bool> {
        match self.inner.entry(key.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(MemoryValue::Str(value.to_string()));
                Ok(true)
            }
        }
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .inner
            .iter()
            .filter(|r| r.key().starts_with(prefix))
            .map(|r| r.key().clone())
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_fields() {
        let store = MemoryStore::new();
        store
            .hset_multiple("h", &[("a", "1".to_string()), ("b", "2".to_string())])
            .await
            .unwrap();

        assert!(store.hexists("h", "a").await.unwrap());
        assert!(!store.hexists("h", "c").await.unwrap());
        assert!(!store.hexists("missing", "a").await.unwrap());

        let values = store.hmget("h", &["b", "c", "a"]).await.unwrap();
        assert_eq!(values, vec![Some("2".into()), None, Some("1".into())]);
        assert_eq!(store.hgetall("h").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_hset_nx_does_not_overwrite() {
        let store = MemoryStore::new();
        assert!(store.hset_nx("h", "f", "first").await.unwrap());
        assert!(!store.hset_nx("h", "f", "second").await.unwrap());
        assert_eq!(
            store.hmget("h", &["f"]).await.unwrap(),
            vec![Some("first".into())]
        );
    }

    #[tokio::test]
    async fn test_hincr_from_missing_field() {
        let store = MemoryStore::new();
        assert_eq!(store.hincr("h", "n", 1).await.unwrap(), 1);
        assert_eq!(store.hincr("h", "n", 5).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_hincr_rejects_non_integer() {
        let store = MemoryStore::new();
        store.hset_multiple("h", &[("n", "abc".into())]).await.unwrap();
        assert!(store.hincr("h", "n", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_hincr_overflow_is_an_error() {
        let store = MemoryStore::new();
        store
            .hset_multiple("h", &[("n", i64::MAX.to_string())])
            .await
            .unwrap();
        assert!(matches!(
            store.hincr("h", "n", 1).await,
            Err(KurzError::StoreOperation(_))
        ));
        assert_eq!(
            store.hmget("h", &["n"]).await.unwrap(),
            vec![Some(i64::MAX.to_string())]
        );
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let store = MemoryStore::new();
        store.set("s", "v").await.unwrap();
        assert!(store.hincr("s", "n", 1).await.is_err());
        store.hset_multiple("h", &[("a", "1".into())]).await.unwrap();
        assert!(store.get("h").await.is_err());
    }

    #[tokio::test]
    async fn test_set_nx() {
        let store = MemoryStore::new();
        assert!(store.set_nx("k", "1").await.unwrap());
        assert!(!store.set_nx("k", "2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("1".into()));
    }

    #[tokio::test]
    async fn test_scan_prefix() {
        let store = MemoryStore::new();
        store.set("link:a", "1").await.unwrap();
        store.set("link:b", "1").await.unwrap();
        store.set("user:a", "1").await.unwrap();
        let mut keys = store.scan_prefix("link:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["link:a".to_string(), "link:b".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    store.hincr("h", "n", 1).await.unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.hincr("h", "n", 0).await.unwrap(), 1600);
    }
}
