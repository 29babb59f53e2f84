//! Entity config validation: names and seed consistency.

use crate::config::{Entity, EntityConfig};
use crate::error::ConfigError;
use crate::store::INDEX_NAMESPACE;
use std::collections::HashSet;

pub fn validate_entity_config<T: Entity>(config: &EntityConfig<T>) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEntity {
        entity: config.entity_name.clone(),
        reason,
    };

    if config.entity_name.trim().is_empty() {
        return Err(invalid("entity_name must not be empty".into()));
    }
    if config.index_name.trim().is_empty() {
        return Err(invalid("index_name must not be empty".into()));
    }
    if config.entity_name == INDEX_NAMESPACE {
        return Err(invalid(format!("entity_name '{}' is reserved", INDEX_NAMESPACE)));
    }
    if !serde_json::to_value(&config.default_record)
        .map(|v| v.is_object())
        .unwrap_or(false)
    {
        return Err(invalid("default_record must serialize to a JSON object".into()));
    }

    let mut seen = HashSet::new();
    for rec in &config.seed_records {
        let id = rec.id();
        if id.is_empty() {
            return Err(invalid("seed record with empty id".into()));
        }
        if !seen.insert(id) {
            return Err(invalid(format!("duplicate seed id '{}'", id)));
        }
    }
    Ok(())
}

/// Two entity types sharing a namespace or index would overwrite each other.
pub fn ensure_distinct<A: Entity, B: Entity>(a: &EntityConfig<A>, b: &EntityConfig<B>) -> Result<(), ConfigError> {
    if a.entity_name == b.entity_name || a.index_name == b.index_name {
        return Err(ConfigError::InvalidEntity {
            entity: b.entity_name.clone(),
            reason: format!("namespace or index collides with '{}'", a.entity_name),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{attendee_config, seminar_config, Seminar};

    #[test]
    fn domain_configs_are_valid() {
        validate_entity_config(&seminar_config()).unwrap();
        validate_entity_config(&attendee_config()).unwrap();
        ensure_distinct(&seminar_config(), &attendee_config()).unwrap();
    }

    #[test]
    fn duplicate_seed_ids_are_rejected() {
        let first = Seminar {
            id: "s".into(),
            ..Seminar::default()
        };
        let config = EntityConfig::new("seminar", "seminars", Seminar::default())
            .with_seed(vec![first.clone(), first]);
        let err = validate_entity_config(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate seed id 's'"));
    }

    #[test]
    fn reserved_namespace_is_rejected() {
        let config = EntityConfig::new(INDEX_NAMESPACE, "x", Seminar::default());
        assert!(validate_entity_config(&config).is_err());
    }

    #[test]
    fn colliding_configs_are_rejected() {
        let a = EntityConfig::new("seminar", "seminars", Seminar::default());
        let b = EntityConfig::new("other", "seminars", Seminar::default());
        assert!(ensure_distinct(&a, &b).is_err());
    }
}
