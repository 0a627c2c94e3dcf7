use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://nstack.io/api/v1/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration field '{0}' must not be empty")]
    MissingField(&'static str),
}

/// When the SDK runs an app-open cycle on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateTrigger {
    OnStart,
    OnDidBecomeActive,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Macos,
    Tvos,
    Watchos,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Macos => "macos",
            Platform::Tvos => "tvos",
            Platform::Watchos => "watchos",
            Platform::Web => "web",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend environment tag sent in the `N-Meta` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    Production,
    Staging,
    Custom(String),
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        match value.as_str() {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Custom(value),
        }
    }
}

impl From<Environment> for String {
    fn from(value: Environment) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => f.write_str("production"),
            Environment::Staging => f.write_str("staging"),
            Environment::Custom(name) => f.write_str(name),
        }
    }
}

/// Read-only SDK configuration, supplied once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Configuration {
    pub app_id: String,
    pub rest_api_key: String,
    /// Version of the host application as installed.
    pub app_version: String,

    /// Sent instead of `app_version`; for testing against staged releases.
    #[serde(default)]
    pub version_override: Option<String>,
    #[serde(default)]
    pub accept_language_override: Option<String>,
    /// Most preferred first.
    #[serde(default)]
    pub preferred_languages: Vec<String>,

    #[serde(default = "default_update_options")]
    pub update_options: Vec<UpdateTrigger>,
    #[serde(default = "default_environment")]
    pub environment: Environment,
    #[serde(default = "default_platform")]
    pub platform: Platform,

    #[serde(default)]
    pub flat: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub translations_url_override: Option<String>,

    /// Device identifier; generated and persisted when absent.
    #[serde(default)]
    pub guid: Option<String>,
    /// Launch option keys that suppress the on-start cycle.
    #[serde(default = "default_avoid_update_keys")]
    pub avoid_update_launch_keys: Vec<String>,

    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub device_model: Option<String>,
}

fn default_update_options() -> Vec<UpdateTrigger> {
    vec![UpdateTrigger::OnStart, UpdateTrigger::OnDidBecomeActive]
}

fn default_environment() -> Environment {
    Environment::Production
}

fn default_platform() -> Platform {
    Platform::Ios
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_avoid_update_keys() -> Vec<String> {
    vec!["location".to_string()]
}

impl Configuration {
    pub fn new(
        app_id: impl Into<String>,
        rest_api_key: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            rest_api_key: rest_api_key.into(),
            app_version: app_version.into(),
            version_override: None,
            accept_language_override: None,
            preferred_languages: Vec::new(),
            update_options: default_update_options(),
            environment: default_environment(),
            platform: default_platform(),
            flat: false,
            base_url: default_base_url(),
            translations_url_override: None,
            guid: None,
            avoid_update_launch_keys: default_avoid_update_keys(),
            os_version: None,
            device_model: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Configuration = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), app_id = %config.app_id, "loaded configuration");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn with_version_override(mut self, version: impl Into<String>) -> Self {
        self.version_override = Some(version.into());
        self
    }

    pub fn with_accept_language_override(mut self, accept_language: impl Into<String>) -> Self {
        self.accept_language_override = Some(accept_language.into());
        self
    }

    pub fn with_preferred_languages(mut self, languages: Vec<String>) -> Self {
        self.preferred_languages = languages;
        self
    }

    pub fn with_update_options(mut self, options: Vec<UpdateTrigger>) -> Self {
        self.update_options = options;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_translations_url_override(mut self, url: impl Into<String>) -> Self {
        self.translations_url_override = Some(url.into());
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_device(mut self, os_version: impl Into<String>, model: impl Into<String>) -> Self {
        self.os_version = Some(os_version.into());
        self.device_model = Some(model.into());
        self
    }

    /// Identity fields must be present before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::MissingField("app_id"));
        }
        if self.rest_api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("rest_api_key"));
        }
        if self.app_version.trim().is_empty() {
            return Err(ConfigError::MissingField("app_version"));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("base_url"));
        }
        Ok(())
    }

    fn has_trigger(&self, trigger: UpdateTrigger) -> bool {
        self.update_options.contains(&trigger)
            && !self.update_options.contains(&UpdateTrigger::Never)
    }

    pub fn updates_on_start(&self) -> bool {
        self.has_trigger(UpdateTrigger::OnStart)
    }

    pub fn updates_on_did_become_active(&self) -> bool {
        self.has_trigger(UpdateTrigger::OnDidBecomeActive)
    }

    /// The locale translations are kept under: the first entry of the
    /// accept-language override, else the most preferred language.
    pub fn primary_language(&self) -> Option<String> {
        let first = match &self.accept_language_override {
            Some(accept_language) => accept_language.split(',').next(),
            None => self.preferred_languages.first().map(String::as_str),
        }?;
        let locale = first.split(';').next().unwrap_or_default().trim();
        (!locale.is_empty()).then(|| locale.to_string())
    }

    pub fn accept_language(&self) -> Option<String> {
        self.accept_language_override
            .clone()
            .or_else(|| nstack_utils::accept_language(&self.preferred_languages))
    }

    /// Join `path` onto the base URL, tolerating a missing trailing slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Value of the `N-Meta` header: `platform;environment;version;os;device`.
    pub fn n_meta(&self) -> String {
        format!(
            "{};{};{};{};{}",
            self.platform,
            self.environment,
            self.app_version,
            self.os_version.as_deref().unwrap_or_default(),
            self.device_model.as_deref().unwrap_or_default()
        )
    }
}
