//! In-process backend. Used when no database is configured, and by tests.

use crate::error::AppError;
use crate::store::backend::{KvBackend, KvOp};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys across all namespaces.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, AppError> {
        let map = self.inner.read().await;
        Ok(map.get(&(namespace.to_string(), key.to_string())).cloned())
    }

    async fn get_many(&self, namespace: &str, keys: &[String]) -> Result<Vec<Option<Value>>, AppError> {
        let map = self.inner.read().await;
        Ok(keys
            .iter()
            .map(|k| map.get(&(namespace.to_string(), k.clone())).cloned())
            .collect())
    }

    async fn write_batch(&self, ops: Vec<KvOp>) -> Result<(), AppError> {
        let mut map = self.inner.write().await;
        // Reject the whole batch before touching anything if an index op targets a non-array value.
        for op in &ops {
            if let KvOp::IndexAppend { namespace, key, .. } | KvOp::IndexRemove { namespace, key, .. } = op {
                if let Some(current) = map.get(&(namespace.clone(), key.clone())) {
                    serde_json::from_value::<Vec<String>>(current.clone())?;
                }
            }
        }
        for op in ops {
            match op {
                KvOp::Put { namespace, key, value } => {
                    map.insert((namespace, key), value);
                }
                KvOp::Delete { namespace, key } => {
                    map.remove(&(namespace, key));
                }
                KvOp::IndexAppend { namespace, key, ids } => {
                    let slot = map
                        .entry((namespace, key))
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if let Value::Array(list) = slot {
                        for id in ids {
                            let id = Value::String(id);
                            if !list.contains(&id) {
                                list.push(id);
                            }
                        }
                    }
                }
                KvOp::IndexRemove { namespace, key, ids } => {
                    if let Some(Value::Array(list)) = map.get_mut(&(namespace, key)) {
                        list.retain(|v| !v.as_str().is_some_and(|s| ids.iter().any(|id| id == s)));
                    }
                }
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
