//! Persistence: the key-value backend seam and the indexed entity store built on it.

pub mod backend;
pub mod entity;
pub mod memory;
pub mod postgres;

pub use backend::{KvBackend, KvOp, INDEX_NAMESPACE};
pub use entity::{EntityRef, IndexedEntityStore, ListResult};
pub use memory::MemoryBackend;
pub use postgres::{ensure_database_exists, ensure_kv_tables, PostgresBackend};
