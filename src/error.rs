//! Error taxonomy for the settings engine
//!
//! Validation errors go back to the caller of a mutation. Storage errors never
//! leave the store adapter: they are logged and the in-memory state stays
//! authoritative.

use thiserror::Error;

/// Rejected settings mutation. State is untouched when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value} for setting `{field}`")]
    InvalidConfigValue { field: String, value: String },

    #[error("unknown setting `{0}`")]
    UnknownField(String),
}

/// Failure talking to the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings store unavailable: {0}")]
    PersistenceUnavailable(#[from] std::io::Error),

    #[error("stored settings are corrupt: {0}")]
    CorruptPersistedState(#[from] serde_json::Error),
}
