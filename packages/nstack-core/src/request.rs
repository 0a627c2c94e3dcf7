use crate::error::ConfigurationError;
use crate::sync_state::SyncState;
use nstack_config::{Configuration, Platform};
use nstack_utils::time::format_timestamp;
use std::collections::{BTreeMap, HashMap};

pub const APP_ID_HEADER: &str = "X-Application-id";
pub const REST_API_KEY_HEADER: &str = "X-Rest-Api-Key";
pub const ACCEPT_LANGUAGE_HEADER: &str = "Accept-Language";
pub const N_META_HEADER: &str = "N-Meta";

/// The outbound "app opened" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppOpenRequest {
    pub current_version: String,
    pub previous_version: String,
    pub guid: String,
    pub platform: Platform,
    pub last_sync_timestamp: Option<String>,
    pub accept_language: Option<String>,
    pub version_override: Option<String>,
}

impl AppOpenRequest {
    /// The version sent on the wire; the override wins when present.
    pub fn reported_version(&self) -> &str {
        self.version_override
            .as_deref()
            .unwrap_or(&self.current_version)
    }

    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::from([
            ("version".to_string(), self.reported_version().to_string()),
            ("guid".to_string(), self.guid.clone()),
            ("platform".to_string(), self.platform.to_string()),
            ("old_version".to_string(), self.previous_version.clone()),
        ]);
        if let Some(last_updated) = &self.last_sync_timestamp {
            params.insert("last_updated".to_string(), last_updated.clone());
        }
        params
    }

    pub fn headers(&self, config: &Configuration) -> HashMap<String, String> {
        let mut headers = default_headers(config);
        if let Some(accept_language) = &self.accept_language {
            headers.insert(ACCEPT_LANGUAGE_HEADER.to_string(), accept_language.clone());
        }
        headers
    }
}

/// Assemble the app-open request from configuration and persisted state.
///
/// Never produces a partial request: missing identity is an error.
pub fn build_request(
    config: &Configuration,
    sync_state: &SyncState,
    guid: &str,
) -> Result<AppOpenRequest, ConfigurationError> {
    if config.app_id.trim().is_empty() {
        return Err(ConfigurationError::MissingIdentity("app_id"));
    }
    if config.rest_api_key.trim().is_empty() {
        return Err(ConfigurationError::MissingIdentity("rest_api_key"));
    }
    if guid.trim().is_empty() {
        return Err(ConfigurationError::MissingIdentity("guid"));
    }

    Ok(AppOpenRequest {
        current_version: sync_state.current_app_version.clone(),
        previous_version: sync_state.previous_app_version.clone(),
        guid: guid.to_string(),
        platform: config.platform,
        last_sync_timestamp: Some(format_timestamp(&sync_state.last_sync_timestamp)),
        accept_language: config.accept_language(),
        version_override: config.version_override.clone(),
    })
}

pub fn app_open_url(config: &Configuration) -> String {
    let url = config.endpoint("open");
    if config.flat {
        format!("{}?flat=true", url)
    } else {
        url
    }
}

/// Headers every request to the service carries.
pub fn default_headers(config: &Configuration) -> HashMap<String, String> {
    HashMap::from([
        (APP_ID_HEADER.to_string(), config.app_id.clone()),
        (REST_API_KEY_HEADER.to_string(), config.rest_api_key.clone()),
        (N_META_HEADER.to_string(), config.n_meta()),
    ])
}
