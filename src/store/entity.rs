//! Generic indexed entity store: CRUD over one record type plus an ordered index of its ids.
//!
//! Records live at `(entity_name, id)`. The index lives at `(_index, index_name)` as a JSON
//! array of ids in insertion order. Every write that touches both goes out as one backend batch,
//! and index changes are append/remove ops the backend applies atomically.

use crate::config::{Entity, EntityConfig};
use crate::error::AppError;
use crate::store::backend::{KvBackend, KvOp, INDEX_NAMESPACE};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Result of [`IndexedEntityStore::list`].
#[derive(Clone, Debug, Serialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
}

pub struct IndexedEntityStore<T: Entity> {
    backend: Arc<dyn KvBackend>,
    config: EntityConfig<T>,
}

impl<T: Entity> Clone for IndexedEntityStore<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
        }
    }
}

impl<T: Entity> IndexedEntityStore<T> {
    pub fn new(backend: Arc<dyn KvBackend>, config: EntityConfig<T>) -> Self {
        Self { backend, config }
    }

    /// Write seed records and their index when the index is absent or empty.
    /// Returns whether anything was written.
    pub async fn ensure_seed(&self) -> Result<bool, AppError> {
        let populated = self.read_index().await?.is_some_and(|ids| !ids.is_empty());
        if self.config.seed_records.is_empty() || populated {
            return Ok(false);
        }
        let mut ops = Vec::with_capacity(self.config.seed_records.len() + 1);
        let mut ids = Vec::with_capacity(self.config.seed_records.len());
        for rec in &self.config.seed_records {
            ops.push(self.record_op(rec)?);
            ids.push(rec.id().to_string());
        }
        let count = ids.len();
        ops.push(self.index_append(ids));
        self.backend.write_batch(ops).await?;
        tracing::info!(entity = %self.config.entity_name, count, "seeded");
        Ok(true)
    }

    /// Insert a record whose id is already assigned. Conflict if the id is taken.
    pub async fn create(&self, record: T) -> Result<T, AppError> {
        let id = record.id().to_string();
        require_id(&id)?;
        if self.get_raw(&id).await?.is_some() {
            return Err(self.conflict(&id));
        }
        let ops = vec![self.record_op(&record)?, self.index_append(vec![id.clone()])];
        self.backend.write_batch(ops).await?;
        tracing::debug!(entity = %self.config.entity_name, id = %id, "created");
        Ok(record)
    }

    /// Insert all records in order, or none: any empty, repeated or existing id rejects the batch.
    pub async fn create_many(&self, records: Vec<T>) -> Result<Vec<T>, AppError> {
        if records.is_empty() {
            return Ok(records);
        }
        let mut seen = HashSet::with_capacity(records.len());
        let mut ids = Vec::with_capacity(records.len());
        for rec in &records {
            let id = rec.id().to_string();
            require_id(&id)?;
            if !seen.insert(id.clone()) {
                return Err(AppError::Conflict(format!(
                    "{} id '{}' appears more than once in batch",
                    self.config.entity_name, id
                )));
            }
            ids.push(id);
        }
        let existing = self.backend.get_many(&self.config.entity_name, &ids).await?;
        if let Some((id, _)) = ids.iter().zip(&existing).find(|(_, v)| v.is_some()) {
            return Err(self.conflict(id));
        }

        let mut ops = Vec::with_capacity(records.len() + 1);
        for rec in &records {
            ops.push(self.record_op(rec)?);
        }
        ops.push(self.index_append(ids));
        self.backend.write_batch(ops).await?;
        tracing::debug!(entity = %self.config.entity_name, count = records.len(), "created batch");
        Ok(records)
    }

    /// Handle for one record id.
    pub fn entity(&self, id: impl Into<String>) -> EntityRef<'_, T> {
        EntityRef {
            store: self,
            id: id.into(),
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, AppError> {
        match self.get_raw(id).await? {
            Some(stored) => Ok(Some(self.hydrate(stored)?)),
            None => Ok(None),
        }
    }

    /// All records in index order. Index entries without a stored record are skipped.
    pub async fn list(&self) -> Result<ListResult<T>, AppError> {
        let ids = self.read_index().await?.unwrap_or_default();
        let values = self.backend.get_many(&self.config.entity_name, &ids).await?;
        let mut items = Vec::with_capacity(values.len());
        for stored in values.into_iter().flatten() {
            items.push(self.hydrate(stored)?);
        }
        Ok(ListResult { items })
    }

    /// Remove a record and its index entry. Returns whether the record existed.
    /// A dangling index entry for `id` is pruned either way.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let existed = self.get_raw(id).await?.is_some();
        let mut ops = Vec::with_capacity(2);
        if existed {
            ops.push(KvOp::delete(&self.config.entity_name, id));
        }
        ops.push(self.index_remove(vec![id.to_string()]));
        self.backend.write_batch(ops).await?;
        Ok(existed)
    }

    /// Remove every listed record that exists; absent ids are skipped. Returns how many were removed.
    pub async fn delete_many(&self, ids: &[String]) -> Result<usize, AppError> {
        let targets: Vec<String> = {
            let mut seen = HashSet::new();
            ids.iter().filter(|id| seen.insert(id.as_str())).cloned().collect()
        };
        if targets.is_empty() {
            return Ok(0);
        }
        let existing = self.backend.get_many(&self.config.entity_name, &targets).await?;
        let mut ops = Vec::new();
        for (id, stored) in targets.iter().zip(&existing) {
            if stored.is_some() {
                ops.push(KvOp::delete(&self.config.entity_name, id));
            }
        }
        let removed = ops.len();
        ops.push(self.index_remove(targets));
        self.backend.write_batch(ops).await?;
        Ok(removed)
    }

    async fn get_raw(&self, id: &str) -> Result<Option<Value>, AppError> {
        self.backend.get(&self.config.entity_name, id).await
    }

    async fn put(&self, record: &T) -> Result<(), AppError> {
        self.backend.write_batch(vec![self.record_op(record)?]).await
    }

    /// `None` when this type has never been written.
    async fn read_index(&self) -> Result<Option<Vec<String>>, AppError> {
        match self.backend.get(INDEX_NAMESPACE, &self.config.index_name).await? {
            Some(v) => Ok(Some(serde_json::from_value(v)?)),
            None => Ok(None),
        }
    }

    fn index_append(&self, ids: Vec<String>) -> KvOp {
        KvOp::index_append(INDEX_NAMESPACE, &self.config.index_name, ids)
    }

    fn index_remove(&self, ids: Vec<String>) -> KvOp {
        KvOp::index_remove(INDEX_NAMESPACE, &self.config.index_name, ids)
    }

    fn record_op(&self, record: &T) -> Result<KvOp, AppError> {
        Ok(KvOp::put(&self.config.entity_name, record.id(), serde_json::to_value(record)?))
    }

    /// Overlay the stored object on the default record so fields added later get their defaults.
    fn hydrate(&self, stored: Value) -> Result<T, AppError> {
        let mut base = serde_json::to_value(&self.config.default_record)?;
        match (&mut base, stored) {
            (Value::Object(base_map), Value::Object(stored_map)) => overlay(base_map, stored_map, None),
            (_, other) => return Ok(serde_json::from_value(other)?),
        }
        Ok(serde_json::from_value(base)?)
    }

    fn conflict(&self, id: &str) -> AppError {
        AppError::Conflict(format!("{} '{}' already exists", self.config.entity_name, id))
    }

    fn not_found(&self, id: &str) -> AppError {
        AppError::NotFound(format!("{} '{}' not found", self.config.entity_name, id))
    }
}

/// One record of an [`IndexedEntityStore`], addressed by id. The record may or may not exist.
pub struct EntityRef<'a, T: Entity> {
    store: &'a IndexedEntityStore<T>,
    id: String,
}

impl<'a, T: Entity> EntityRef<'a, T> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn exists(&self) -> Result<bool, AppError> {
        Ok(self.store.get_raw(&self.id).await?.is_some())
    }

    pub async fn get_state(&self) -> Result<T, AppError> {
        self.store
            .get(&self.id)
            .await?
            .ok_or_else(|| self.store.not_found(&self.id))
    }

    /// Shallow-merge a JSON object onto the stored record and persist it. The `id` key is ignored.
    pub async fn patch(&self, partial: Value) -> Result<T, AppError> {
        let Value::Object(partial) = partial else {
            return Err(AppError::BadRequest("patch must be a JSON object".into()));
        };
        let current = self.get_state().await?;
        let mut merged = serde_json::to_value(&current)?;
        if let Value::Object(map) = &mut merged {
            overlay(map, partial, Some("id"));
        }
        let next: T = serde_json::from_value(merged)
            .map_err(|e| AppError::BadRequest(format!("invalid patch: {}", e)))?;
        self.store.put(&next).await?;
        Ok(next)
    }

    /// Apply a transform to the stored record and persist the result. The transform must keep the id.
    pub async fn mutate<F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(T) -> T + Send,
    {
        let next = f(self.get_state().await?);
        if next.id() != self.id {
            return Err(AppError::BadRequest(format!(
                "mutation changed id '{}' to '{}'",
                self.id,
                next.id()
            )));
        }
        self.store.put(&next).await?;
        Ok(next)
    }
}

fn require_id(id: &str) -> Result<(), AppError> {
    if id.is_empty() {
        return Err(AppError::BadRequest("record id must be assigned before create".into()));
    }
    Ok(())
}

fn overlay(base: &mut Map<String, Value>, top: Map<String, Value>, skip: Option<&str>) {
    for (k, v) in top {
        if Some(k.as_str()) == skip {
            continue;
        }
        base.insert(k, v);
    }
}
