use chrono::{DateTime, Utc};
use nstack_cache::{KeyValueStore, StoreError};
use nstack_utils::time::{distant_past, format_timestamp, parse_timestamp};
use std::sync::Arc;

pub const LAST_UPDATED_KEY: &str = "LastUpdated";
pub const PREV_ACCEPT_LANGUAGE_KEY: &str = "PrevAcceptedLanguageKey";
pub const PREVIOUS_VERSION_KEY: &str = "PreviousVersionKey";
pub const GUID_KEY: &str = "Guid";

/// What the SDK remembers between app-open cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub last_sync_timestamp: DateTime<Utc>,
    pub last_accept_language_used: Option<String>,
    pub previous_app_version: String,
    pub current_app_version: String,
}

impl SyncState {
    /// State of an installation that has never synchronized.
    pub fn fresh(current_app_version: &str) -> Self {
        Self {
            last_sync_timestamp: distant_past(),
            last_accept_language_used: None,
            previous_app_version: current_app_version.to_string(),
            current_app_version: current_app_version.to_string(),
        }
    }

    pub fn has_synced(&self) -> bool {
        self.last_sync_timestamp > distant_past()
    }
}

/// Reads and writes [`SyncState`] fields through the persistence collaborator.
///
/// Only the coordinator writes through this type.
#[derive(Clone)]
pub struct SyncStateStore {
    store: Arc<dyn KeyValueStore>,
}

impl SyncStateStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A missing previous version defaults to the running version: a fresh
    /// install is not an upgrade.
    pub async fn load(&self, current_app_version: &str) -> Result<SyncState, StoreError> {
        let last_sync_timestamp = match self.store.get(LAST_UPDATED_KEY).await? {
            Some(raw) => parse_timestamp(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    value = %raw,
                    "unreadable last sync timestamp, treating as never synced"
                );
                distant_past()
            }),
            None => distant_past(),
        };
        let last_accept_language_used = self.store.get(PREV_ACCEPT_LANGUAGE_KEY).await?;
        let previous_app_version = self
            .store
            .get(PREVIOUS_VERSION_KEY)
            .await?
            .unwrap_or_else(|| current_app_version.to_string());

        Ok(SyncState {
            last_sync_timestamp,
            last_accept_language_used,
            previous_app_version,
            current_app_version: current_app_version.to_string(),
        })
    }

    pub async fn record_sync(
        &self,
        at: DateTime<Utc>,
        accept_language: Option<&str>,
    ) -> Result<(), StoreError> {
        self.store
            .set(LAST_UPDATED_KEY, &format_timestamp(&at))
            .await?;
        match accept_language {
            Some(accept_language) => {
                self.store
                    .set(PREV_ACCEPT_LANGUAGE_KEY, accept_language)
                    .await
            }
            None => self.store.remove(PREV_ACCEPT_LANGUAGE_KEY).await,
        }
    }

    pub async fn advance_previous_version(
        &self,
        current_app_version: &str,
    ) -> Result<(), StoreError> {
        self.store
            .set(PREVIOUS_VERSION_KEY, current_app_version)
            .await
    }

    /// Persist the outcome of a completed cycle: the timestamp first, then
    /// the accept-language, then (when given) the previous version. A write
    /// failure leaves `PreviousVersionKey` untouched.
    pub async fn commit_cycle(
        &self,
        at: DateTime<Utc>,
        accept_language: Option<&str>,
        previous_version: Option<&str>,
    ) -> Result<(), StoreError> {
        self.record_sync(at, accept_language).await?;
        match previous_version {
            Some(version) => self.advance_previous_version(version).await,
            None => Ok(()),
        }
    }

    pub async fn guid(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(GUID_KEY)
            .await?
            .filter(|guid| !guid.trim().is_empty()))
    }

    pub async fn set_guid(&self, guid: &str) -> Result<(), StoreError> {
        self.store.set(GUID_KEY, guid).await
    }

    /// Forget everything except the device guid.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.remove(LAST_UPDATED_KEY).await?;
        self.store.remove(PREV_ACCEPT_LANGUAGE_KEY).await?;
        self.store.remove(PREVIOUS_VERSION_KEY).await
    }
}
