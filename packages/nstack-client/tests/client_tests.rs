use chrono::{DateTime, Utc};
use mockito::{Matcher, Server};
use nstack_cache::{get_json, KeyValueStore, MemoryStore};
use nstack_client::geography::COUNTRIES_KEY;
use nstack_client::{
    translations_key, ClientError, HttpTransport, NStackClient, StoreLocalizationRefresher,
};
use nstack_config::Configuration;
use nstack_core::{
    ConfigurationError, LanguageDescriptor, LocalizationDescriptor, LocalizationRefresher,
    RateReminderAnswer,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

fn config(server_url: &str) -> Configuration {
    Configuration::new("app-id", "rest-key", "1.0.0")
        .with_base_url(format!("{}/api/v1/", server_url))
        .with_preferred_languages(vec!["da-DK".to_string()])
}

fn client(config: Configuration) -> (NStackClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let client = NStackClient::new(config, Arc::new(HttpTransport::new()), store.clone());
    (client, store)
}

#[tokio::test]
async fn test_update_countries_persists() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/api/v1/geographic/countries")
        .match_header("x-application-id", "app-id")
        .match_header("x-rest-api-key", "rest-key")
        .match_header("accept-language", "da-DK")
        .with_status(200)
        .with_body(
            json!({"data": [
                {"id": 57, "name": "Denmark", "code": "DK", "code_iso": "DNK", "phone": 45},
                {"id": 80, "name": "Germany", "code": "DE", "code_iso": "DEU", "phone": 49}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let (client, store) = client(config(&server.url()));
    assert!(client.cached_countries().await.unwrap().is_empty());

    let countries = client.update_countries().await.unwrap();
    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0].code, "DK");

    let cached = client.cached_countries().await.unwrap();
    assert_eq!(cached, countries);
    let raw: Option<Value> = get_json(store.as_ref(), COUNTRIES_KEY).await.unwrap();
    assert!(raw.is_some());
}

#[tokio::test]
async fn test_validate_email() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", Matcher::Regex("^/api/v1/validator/email".to_string()))
        .match_query(Matcher::UrlEncoded("email".into(), "user@example.com".into()))
        .with_status(200)
        .with_body(r#"{"data":{"ok":true}}"#)
        .create_async()
        .await;

    let (client, _) = client(config(&server.url()));
    assert!(client.validate_email("user@example.com").await.unwrap());
}

#[tokio::test]
async fn test_mark_message_as_read() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/api/v1/notify/messages/views")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("guid=device-1".to_string()),
            Matcher::Regex("message_id=42".to_string()),
        ]))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let (client, _) = client(config(&server.url()).with_guid("device-1"));
    client.mark_message_as_read(42).await.unwrap();
    m.assert_async().await;
}

#[tokio::test]
async fn test_rate_reminder_uses_stored_guid() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/api/v1/notify/rate_reminder/views")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("guid=stored-device".to_string()),
            Matcher::Regex("answer=later".to_string()),
            Matcher::Regex("platform=ios".to_string()),
        ]))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let (client, store) = client(config(&server.url()));
    store.set("Guid", "stored-device").await.unwrap();
    client
        .mark_rate_reminder_as_seen(RateReminderAnswer::Later)
        .await
        .unwrap();
    m.assert_async().await;
}

#[tokio::test]
async fn test_view_tracking_without_guid() {
    let (client, _) = client(config("http://127.0.0.1:9"));
    let err = client.mark_whats_new_as_seen(3).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Configuration(ConfigurationError::MissingIdentity("guid"))
    ));
}

#[tokio::test]
async fn test_content_response_key() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/api/v1/content/responses/terms")
        .with_status(200)
        .with_body(r#"{"data":{"title":"Terms","body":"..."}}"#)
        .create_async()
        .await;

    let (client, _) = client(config(&server.url()));
    let title = client.content_response("terms", Some("title")).await.unwrap();
    assert_eq!(title, json!("Terms"));

    let err = client.content_response("terms", Some("footer")).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingKey { .. }));
}

#[tokio::test]
async fn test_static_response_decodes_envelope() {
    #[derive(Deserialize)]
    struct Terms {
        title: String,
    }

    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/api/v1/content/responses/12")
        .with_status(200)
        .with_body(r#"{"data":{"title":"Terms"}}"#)
        .create_async()
        .await;

    let (client, _) = client(config(&server.url()));
    let terms: Terms = client.static_response("12").await.unwrap();
    assert_eq!(terms.title, "Terms");
}

#[tokio::test]
async fn test_fetch_translations_honours_override() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/custom/translations")
        .match_header("accept-language", "en-GB")
        .with_status(200)
        .with_body(r#"{"data":{"default":{"ok":"OK"}}}"#)
        .create_async()
        .await;

    let config = config(&server.url())
        .with_translations_url_override(format!("{}/custom/translations", server.url()));
    let (client, _) = client(config);
    let translations = client.fetch_translations("en-GB").await.unwrap();
    assert_eq!(translations["default"]["ok"], "OK");
}

#[tokio::test]
async fn test_decode_error_names_endpoint() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/api/v1/translate/mobile/languages")
        .with_status(200)
        .with_body("<html></html>")
        .create_async()
        .await;

    let (client, _) = client(config(&server.url()));
    match client.fetch_available_languages().await {
        Err(ClientError::Decode { endpoint, .. }) => {
            assert!(endpoint.ends_with("translate/mobile/languages"))
        }
        other => panic!("unexpected result {:?}", other),
    }
}

fn manifest_entry(
    server_url: &str,
    id: i64,
    locale: &str,
    should_update: bool,
) -> LocalizationDescriptor {
    LocalizationDescriptor {
        id,
        url: format!("{}/api/v2/content/localize/resources/{}", server_url, id),
        last_updated_at: DateTime::parse_from_rfc3339("2024-02-01T08:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc),
        should_update,
        language: LanguageDescriptor {
            id,
            locale: locale.to_string(),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_refresher_fetches_flagged_entries() {
    let mut server = Server::new_async().await;
    let danish = server
        .mock("GET", "/api/v2/content/localize/resources/1")
        .match_header("accept-language", "da-DK")
        .with_status(200)
        .with_body(r#"{"data":{"default":{"ok":"Ja"}}}"#)
        .expect(2)
        .create_async()
        .await;
    let english = server
        .mock("GET", "/api/v2/content/localize/resources/2")
        .with_status(200)
        .with_body(r#"{"data":{"default":{"ok":"Yes"}}}"#)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let refresher = StoreLocalizationRefresher::new(
        config(&server.url()),
        Arc::new(HttpTransport::new()),
        store.clone(),
    );
    let manifest = vec![
        manifest_entry(&server.url(), 1, "da-DK", true),
        manifest_entry(&server.url(), 2, "en-GB", false),
    ];

    refresher.refresh(&manifest, false).await.unwrap();
    assert!(store.get(&translations_key("en-GB")).await.unwrap().is_none());

    refresher.refresh(&manifest, true).await.unwrap();
    let danish_keys: Option<Value> = get_json(store.as_ref(), &translations_key("da-DK"))
        .await
        .unwrap();
    assert_eq!(danish_keys.unwrap()["default"]["ok"], "Ja");
    assert!(store.get(&translations_key("en-GB")).await.unwrap().is_some());

    danish.assert_async().await;
    english.assert_async().await;
}

#[tokio::test]
async fn test_refresher_reports_failure() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/api/v2/content/localize/resources/1")
        .with_status(500)
        .create_async()
        .await;

    let refresher = StoreLocalizationRefresher::new(
        config(&server.url()),
        Arc::new(HttpTransport::new()),
        Arc::new(MemoryStore::new()),
    );
    let manifest = vec![manifest_entry(&server.url(), 1, "da-DK", true)];
    let err = refresher.refresh(&manifest, false).await.unwrap_err();
    assert!(err.0.contains("500"));
}

#[tokio::test]
async fn test_forced_refresh_without_manifest_fetches_current_language() {
    let mut server = Server::new_async().await;
    let keys = server
        .mock("GET", "/api/v1/translate/mobile/keys")
        .match_query(Matcher::UrlEncoded("all".into(), "true".into()))
        .match_header("accept-language", "da-DK,en;q=0.9")
        .with_status(200)
        .with_body(r#"{"data":{"default":{"ok":"Ja"}}}"#)
        .expect(1)
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::new());
    let config = config(&server.url())
        .with_preferred_languages(vec!["da-DK".to_string(), "en".to_string()]);
    let refresher =
        StoreLocalizationRefresher::new(config, Arc::new(HttpTransport::new()), store.clone());

    // Nothing flagged and nothing forced: no request.
    refresher.refresh(&[], false).await.unwrap();
    assert!(store.get(&translations_key("da-DK")).await.unwrap().is_none());

    refresher.refresh(&[], true).await.unwrap();
    let stored: Option<Value> = get_json(store.as_ref(), &translations_key("da-DK"))
        .await
        .unwrap();
    assert_eq!(stored.unwrap()["default"]["ok"], "Ja");
    keys.assert_async().await;
}

#[tokio::test]
async fn test_forced_refresh_without_language_fails() {
    let refresher = StoreLocalizationRefresher::new(
        Configuration::new("app-id", "rest-key", "1.0.0").with_base_url("http://127.0.0.1:9/"),
        Arc::new(HttpTransport::new()),
        Arc::new(MemoryStore::new()),
    );
    assert!(refresher.refresh(&[], true).await.is_err());
}
