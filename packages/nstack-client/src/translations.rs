use crate::client::{DataEnvelope, NStackClient};
use crate::error::ClientError;
use async_trait::async_trait;
use nstack_cache::{set_json, KeyValueStore};
use nstack_config::Configuration;
use nstack_core::request::ACCEPT_LANGUAGE_HEADER;
use nstack_core::{
    default_headers, LanguageDescriptor, LocalizationDescriptor, LocalizationRefreshError,
    LocalizationRefresher, Transport,
};
use serde_json::Value;
use std::sync::Arc;

/// Store key holding the translations fetched for `locale`.
pub fn translations_key(locale: &str) -> String {
    format!("Translations:{}", locale)
}

impl NStackClient {
    fn translations_url(&self) -> String {
        if let Some(url) = &self.config.translations_url_override {
            return url.clone();
        }
        let url = self.config.endpoint("translate/mobile/keys?all=true");
        if self.config.flat {
            format!("{}&flat=true", url)
        } else {
            url
        }
    }

    /// Every translation key for the best match of `accept_language`.
    pub async fn fetch_translations(&self, accept_language: &str) -> Result<Value, ClientError> {
        let mut headers = self.headers();
        headers.insert(ACCEPT_LANGUAGE_HEADER.to_string(), accept_language.to_string());
        let envelope: DataEnvelope<Value> =
            self.get_json(&self.translations_url(), &headers).await?;
        Ok(envelope.data)
    }

    pub async fn fetch_current_language(
        &self,
        accept_language: &str,
    ) -> Result<LanguageDescriptor, ClientError> {
        let url = self
            .config
            .endpoint("translate/mobile/languages/best_fit?show_inactive_languages=true");
        let mut headers = self.headers();
        headers.insert(ACCEPT_LANGUAGE_HEADER.to_string(), accept_language.to_string());
        let envelope: DataEnvelope<LanguageDescriptor> = self.get_json(&url, &headers).await?;
        Ok(envelope.data)
    }

    pub async fn fetch_available_languages(&self) -> Result<Vec<LanguageDescriptor>, ClientError> {
        self.get_data("translate/mobile/languages").await
    }
}

/// Downloads manifest entries and keeps them in the key-value store,
/// one entry per locale.
///
/// A forced refresh with nothing in the manifest re-fetches the keys for the
/// configured languages instead.
pub struct StoreLocalizationRefresher {
    client: NStackClient,
}

impl StoreLocalizationRefresher {
    pub fn new(
        config: Configuration,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            client: NStackClient::new(config, transport, store),
        }
    }

    async fn refresh_entry(
        &self,
        entry: &LocalizationDescriptor,
    ) -> Result<(), LocalizationRefreshError> {
        let mut headers = default_headers(&self.client.config);
        headers.insert(
            ACCEPT_LANGUAGE_HEADER.to_string(),
            entry.language.locale.clone(),
        );
        let body = self
            .client
            .transport
            .get(&entry.url, &headers)
            .await
            .map_err(|e| LocalizationRefreshError(format!("{}: {}", entry.url, e)))?;
        let envelope: DataEnvelope<Value> = serde_json::from_slice(&body)
            .map_err(|e| LocalizationRefreshError(format!("{}: {}", entry.url, e)))?;
        self.persist(&entry.language.locale, &envelope.data).await
    }

    /// Keys for the configured accept-language, stored under the most
    /// preferred locale.
    async fn refresh_current(&self) -> Result<String, LocalizationRefreshError> {
        let config = &self.client.config;
        let (Some(locale), Some(accept_language)) =
            (config.primary_language(), config.accept_language())
        else {
            return Err(LocalizationRefreshError(
                "no preferred language to refresh translations for".to_string(),
            ));
        };
        let translations = self
            .client
            .fetch_translations(&accept_language)
            .await
            .map_err(|e| LocalizationRefreshError(e.to_string()))?;
        self.persist(&locale, &translations).await?;
        Ok(locale)
    }

    async fn persist(
        &self,
        locale: &str,
        translations: &Value,
    ) -> Result<(), LocalizationRefreshError> {
        let key = translations_key(locale);
        set_json(self.client.store.as_ref(), &key, translations)
            .await
            .map_err(|e| LocalizationRefreshError(e.to_string()))
    }
}

#[async_trait]
impl LocalizationRefresher for StoreLocalizationRefresher {
    /// Fetches entries flagged `should_update`, or all of them when forced.
    /// Stops at the first failing entry.
    async fn refresh(
        &self,
        manifest: &[LocalizationDescriptor],
        forced: bool,
    ) -> Result<(), LocalizationRefreshError> {
        if forced && manifest.is_empty() {
            let locale = self.refresh_current().await?;
            tracing::info!(%locale, "translations updated");
            return Ok(());
        }
        for entry in manifest.iter().filter(|entry| forced || entry.should_update) {
            self.refresh_entry(entry).await?;
            tracing::info!(locale = %entry.language.locale, "translations updated");
        }
        Ok(())
    }
}
