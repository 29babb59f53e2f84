//! Durable key-value backend behind the entity store.
//! Implementations can be in-memory, PostgreSQL-backed, or a remote KV.

use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

/// Namespace holding one index record per entity type.
pub const INDEX_NAMESPACE: &str = "_index";

/// One write inside an atomic batch.
#[derive(Clone, Debug, PartialEq)]
pub enum KvOp {
    Put {
        namespace: String,
        key: String,
        value: Value,
    },
    Delete {
        namespace: String,
        key: String,
    },
    /// Append the ids not already listed to the JSON array at this key, creating it if absent.
    IndexAppend {
        namespace: String,
        key: String,
        ids: Vec<String>,
    },
    /// Remove the ids from the JSON array at this key. An absent key stays absent.
    IndexRemove {
        namespace: String,
        key: String,
        ids: Vec<String>,
    },
}

impl KvOp {
    pub fn put(namespace: &str, key: &str, value: Value) -> Self {
        KvOp::Put {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value,
        }
    }

    pub fn delete(namespace: &str, key: &str) -> Self {
        KvOp::Delete {
            namespace: namespace.to_string(),
            key: key.to_string(),
        }
    }

    pub fn index_append(namespace: &str, key: &str, ids: Vec<String>) -> Self {
        KvOp::IndexAppend {
            namespace: namespace.to_string(),
            key: key.to_string(),
            ids,
        }
    }

    pub fn index_remove(namespace: &str, key: &str, ids: Vec<String>) -> Self {
        KvOp::IndexRemove {
            namespace: namespace.to_string(),
            key: key.to_string(),
            ids,
        }
    }
}

#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, AppError>;

    /// Values for `keys`, in the same order; absent keys yield `None`.
    async fn get_many(&self, namespace: &str, keys: &[String]) -> Result<Vec<Option<Value>>, AppError>;

    /// Apply all ops in order, all or nothing. Index ops read and rewrite their array
    /// inside the same atomic step, so concurrent batches never lose each other's ids.
    async fn write_batch(&self, ops: Vec<KvOp>) -> Result<(), AppError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
