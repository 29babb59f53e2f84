//! Shared application state for all routes.

use crate::config::{ensure_distinct, validate_entity_config};
use crate::domain::{attendee_config, seminar_config, Attendee, Seminar};
use crate::error::{AppError, ConfigError};
use crate::store::{IndexedEntityStore, KvBackend};
use std::sync::Arc;

/// One indexed store per entity type, all on the same backend.
#[derive(Clone)]
pub struct Stores {
    pub seminars: IndexedEntityStore<Seminar>,
    pub attendees: IndexedEntityStore<Attendee>,
}

impl Stores {
    /// Validates both entity configs. With `seed_data` off the stores start empty.
    pub fn new(backend: Arc<dyn KvBackend>, seed_data: bool) -> Result<Self, ConfigError> {
        let (mut seminars, mut attendees) = (seminar_config(), attendee_config());
        if !seed_data {
            seminars = seminars.without_seed();
            attendees = attendees.without_seed();
        }
        validate_entity_config(&seminars)?;
        validate_entity_config(&attendees)?;
        ensure_distinct(&seminars, &attendees)?;
        Ok(Self {
            seminars: IndexedEntityStore::new(Arc::clone(&backend), seminars),
            attendees: IndexedEntityStore::new(backend, attendees),
        })
    }

    pub async fn ensure_seed(&self) -> Result<(), AppError> {
        self.seminars.ensure_seed().await?;
        self.attendees.ensure_seed().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub backend: Arc<dyn KvBackend>,
}

impl AppState {
    pub fn new(backend: Arc<dyn KvBackend>, seed_data: bool) -> Result<Self, ConfigError> {
        Ok(Self {
            stores: Stores::new(Arc::clone(&backend), seed_data)?,
            backend,
        })
    }
}
