use nstack_cache::StoreError;
use nstack_core::{ConfigurationError, TransportError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected response from '{endpoint}': {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from '{endpoint}' has no '{key}'")]
    MissingKey { endpoint: String, key: String },

    #[error("storage failed: {0}")]
    Store(#[from] StoreError),
}
