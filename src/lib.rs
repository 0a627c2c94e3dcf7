//! NStack - app-open synchronization for client applications
//!
//! Reports each app launch to the service, shows at most one alert per
//! launch (update, what's new, message or rate reminder) and keeps
//! translations current.

pub use nstack_cache as cache;
pub use nstack_client as client;
pub use nstack_config as config;
pub use nstack_core as core;
pub use nstack_utils as utils;

// Re-export commonly used types for convenience
pub use nstack_cache::{FileStore, KeyValueStore, MemoryStore};
pub use nstack_client::{HttpTransport, NStackClient, StoreLocalizationRefresher};
pub use nstack_config::{Configuration, Environment, Platform, UpdateTrigger};
pub use nstack_core::{
    AlertDecision, AlertInProgress, AlertPresenter, Collaborators, CycleOutcome, CycleReport,
    SyncError, UpdateCoordinator,
};

use std::sync::Arc;

/// Collaborators talking to the live service: hyper transport and
/// translations kept in `store`.
pub fn http_collaborators(
    config: &Configuration,
    store: Arc<dyn KeyValueStore>,
    presenter: Arc<dyn AlertPresenter>,
) -> Collaborators {
    let transport = Arc::new(HttpTransport::new());
    Collaborators {
        transport: transport.clone(),
        store: store.clone(),
        presenter,
        localization: Some(Arc::new(StoreLocalizationRefresher::new(
            config.clone(),
            transport,
            store,
        ))),
    }
}
