use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlagstormError {
    #[error("No mailbox registered for actor: {0}")]
    UnknownReceiver(String),

    #[error("Entity not found: {0:?}")]
    EntityNotFound(crate::core::types::EntityId),

    #[error("Unknown manoeuvre kind: {0}")]
    UnknownManoeuvre(String),

    #[error("Manoeuvre initiation failed: {0}")]
    ManoeuvreInitiation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FlagstormError>;
