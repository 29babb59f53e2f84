//! Seminar breakfast desk: seminar rosters and breakfast-service tracking over a generic indexed entity store.

pub mod config;
pub mod domain;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{Entity, EntityConfig, Settings};
pub use domain::{Attendee, BreakfastStatus, Seminar};
pub use error::{AppError, ConfigError};
pub use routes::{api_routes, app, common_routes};
pub use state::{AppState, Stores};
pub use store::{
    ensure_database_exists, ensure_kv_tables, IndexedEntityStore, KvBackend, MemoryBackend, PostgresBackend,
};
