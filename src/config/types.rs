//! Per-entity-type store configuration.

use serde::{de::DeserializeOwned, Serialize};

/// A record the indexed store can persist: serializable as a JSON object and identified by a string id.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// Describes one entity type: where its records and index live, the shape template, and seed records.
#[derive(Clone, Debug)]
pub struct EntityConfig<T> {
    /// Key namespace for records of this type (e.g. "seminar").
    pub entity_name: String,
    /// Name of the index record listing this type's ids (e.g. "seminars").
    pub index_name: String,
    /// Shape template. Stored records are overlaid on it when read.
    pub default_record: T,
    /// Written in order whenever the index is absent or empty.
    pub seed_records: Vec<T>,
}

impl<T: Entity> EntityConfig<T> {
    pub fn new(entity_name: impl Into<String>, index_name: impl Into<String>, default_record: T) -> Self {
        Self {
            entity_name: entity_name.into(),
            index_name: index_name.into(),
            default_record,
            seed_records: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed_records: Vec<T>) -> Self {
        self.seed_records = seed_records;
        self
    }

    /// Same config without seed records. Used when seeding is disabled.
    pub fn without_seed(mut self) -> Self {
        self.seed_records.clear();
        self
    }
}
