use crate::error::ClientError;
use nstack_cache::KeyValueStore;
use nstack_config::Configuration;
use nstack_core::request::ACCEPT_LANGUAGE_HEADER;
use nstack_core::{
    default_headers, ConfigurationError, RateReminderAnswer, SyncStateStore, Transport,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// `{ "data": T }`, the envelope every service response comes in.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Access to the service endpoints outside the app-open cycle.
pub struct NStackClient {
    pub(crate) config: Configuration,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) store: Arc<dyn KeyValueStore>,
}

impl NStackClient {
    pub fn new(
        config: Configuration,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            config,
            transport,
            store,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub(crate) fn headers(&self) -> HashMap<String, String> {
        let mut headers = default_headers(&self.config);
        if let Some(accept_language) = self.config.accept_language() {
            headers.insert(ACCEPT_LANGUAGE_HEADER.to_string(), accept_language);
        }
        headers
    }

    /// The configured guid, else the one persisted on start.
    pub async fn guid(&self) -> Result<String, ClientError> {
        if let Some(guid) = self.config.guid.as_ref().filter(|g| !g.trim().is_empty()) {
            return Ok(guid.clone());
        }
        SyncStateStore::new(self.store.clone())
            .guid()
            .await?
            .ok_or(ClientError::Configuration(ConfigurationError::MissingIdentity("guid")))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<T, ClientError> {
        let body = self.transport.get(url, headers).await?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
            endpoint: url.to_string(),
            source,
        })
    }

    /// GET `path` below the base URL and unwrap its `data`.
    pub(crate) async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.config.endpoint(path);
        let envelope: DataEnvelope<T> = self.get_json(&url, &self.headers()).await?;
        Ok(envelope.data)
    }

    async fn post_view(
        &self,
        path: &str,
        params: BTreeMap<String, String>,
    ) -> Result<(), ClientError> {
        let url = self.config.endpoint(path);
        self.transport.post(&url, &params, &self.headers()).await?;
        tracing::debug!(%url, "view recorded");
        Ok(())
    }

    pub async fn mark_whats_new_as_seen(&self, update_id: i64) -> Result<(), ClientError> {
        let params = BTreeMap::from([
            ("guid".to_string(), self.guid().await?),
            ("update_id".to_string(), update_id.to_string()),
            ("type".to_string(), "new_in_version".to_string()),
            ("answer".to_string(), "no".to_string()),
        ]);
        self.post_view("notify/updates/views", params).await
    }

    pub async fn mark_message_as_read(&self, message_id: i64) -> Result<(), ClientError> {
        let params = BTreeMap::from([
            ("guid".to_string(), self.guid().await?),
            ("message_id".to_string(), message_id.to_string()),
        ]);
        self.post_view("notify/messages/views", params).await
    }

    pub async fn mark_rate_reminder_as_seen(
        &self,
        answer: RateReminderAnswer,
    ) -> Result<(), ClientError> {
        let params = BTreeMap::from([
            ("guid".to_string(), self.guid().await?),
            ("platform".to_string(), self.config.platform.to_string()),
            ("answer".to_string(), answer.as_str().to_string()),
        ]);
        self.post_view("notify/rate_reminder/views", params).await
    }
}

/// `data`, or `data[key]` when a key is given.
pub(crate) fn select_key(
    endpoint: &str,
    data: Value,
    key: Option<&str>,
) -> Result<Value, ClientError> {
    let Some(key) = key else {
        return Ok(data);
    };
    match data {
        Value::Object(mut map) => map.remove(key).ok_or_else(|| ClientError::MissingKey {
            endpoint: endpoint.to_string(),
            key: key.to_string(),
        }),
        _ => Err(ClientError::MissingKey {
            endpoint: endpoint.to_string(),
            key: key.to_string(),
        }),
    }
}
