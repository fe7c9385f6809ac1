use crate::types::EntityId;

/// Why a `move_to` command was not queued.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("entity {0} is not alive")]
    EntityInvalid(EntityId),

    #[error("entity {0} has no transform record")]
    EntityNotFound(EntityId),

    #[error("command queue for {entity} is full ({capacity} pending)")]
    QueueFull { entity: EntityId, capacity: usize },

    #[error("malformed {field}: {value}")]
    Malformed { field: &'static str, value: f64 },
}

/// Configuration load/validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse world config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
