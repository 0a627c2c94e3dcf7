use nstack_cache::StoreError;
use nstack_config::ConfigError;
use thiserror::Error;

/// The SDK cannot run a cycle with the configuration it was given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("NStack has not been started")]
    NotStarted,

    #[error("NStack is already started; restart the process to apply a new configuration")]
    AlreadyStarted,

    #[error("missing identity field '{0}'")]
    MissingIdentity(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ConfigurationError {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::MissingField(field) => ConfigurationError::MissingIdentity(field),
            other => ConfigurationError::Invalid(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// A payload, or one field of it, could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed response field '{field}': {reason}")]
pub struct MalformedResponseError {
    pub field: String,
    pub reason: String,
}

impl MalformedResponseError {
    pub fn new(field: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("localization refresh failed: {0}")]
pub struct LocalizationRefreshError(pub String);

/// Reasons an app-open cycle ended in `Failed`.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    MalformedResponse(#[from] MalformedResponseError),

    #[error("sync state storage failed: {0}")]
    Store(#[from] StoreError),
}
