use nstack_config::{ConfigError, Configuration, Environment, Platform, UpdateTrigger};

#[test]
fn test_load_full_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nstack.json");
    std::fs::write(
        &path,
        r#"{
            "app_id": "my-app",
            "rest_api_key": "secret",
            "app_version": "3.2.1",
            "version_override": "3.3.0",
            "preferred_languages": ["da-DK", "en-GB"],
            "update_options": ["onDidBecomeActive"],
            "environment": "staging",
            "platform": "android",
            "flat": true,
            "base_url": "https://staging.nstack.io/api/v1/"
        }"#,
    )
    .unwrap();

    let config = Configuration::load(&path).unwrap();
    assert_eq!(config.app_id, "my-app");
    assert_eq!(config.version_override.as_deref(), Some("3.3.0"));
    assert_eq!(config.primary_language().as_deref(), Some("da-DK"));
    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.platform, Platform::Android);
    assert_eq!(config.update_options, vec![UpdateTrigger::OnDidBecomeActive]);
    assert!(!config.updates_on_start());
    assert!(config.updates_on_did_become_active());
    assert!(config.flat);
    assert_eq!(config.endpoint("open"), "https://staging.nstack.io/api/v1/open");
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("nstack.json");
    let config = Configuration::new("app", "key", "1.0.0").with_guid("device-1");
    config.save(&path).unwrap();
    assert_eq!(Configuration::load(&path).unwrap(), config);
}

#[test]
fn test_load_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(matches!(Configuration::load(&missing), Err(ConfigError::Io(_))));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, r#"{"app_id": 1}"#).unwrap();
    assert!(matches!(Configuration::load(&broken), Err(ConfigError::Parse(_))));
}
