use super::*;

#[test]
fn test_polling_defaults() {
    let polling = PollingConfig::default();
    assert_eq!(polling.limit, 100);
    assert_eq!(polling.interval, 0);
    assert_eq!(polling.timeout, 30);
    assert_eq!(polling.retry_timeout, 10);
    assert_eq!(polling.max_handlers, 0);
}

#[test]
fn test_config_from_toml_fills_defaults() {
    let toml_str = r#"
        token = "123:ABC"

        [polling]
        limit = 50
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.token, "123:ABC");
    assert_eq!(cfg.api_url, "https://api.telegram.org");
    assert_eq!(cfg.download_dir, "downloads");
    assert_eq!(cfg.polling.limit, 50);
    assert_eq!(cfg.polling.timeout, 30);
    assert!(!cfg.accept_invalid_certs);
}

#[test]
fn test_retry_timeout_camel_case_alias() {
    let toml_str = r#"
        token = "t"

        [polling]
        retryTimeout = 3
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.polling.retry_timeout, 3);
}

#[test]
fn test_request_timeout_exceeds_long_poll() {
    let polling = PollingConfig {
        timeout: 30,
        ..Default::default()
    };
    assert_eq!(polling.request_timeout().as_secs(), 40);
}

#[test]
fn test_request_timeout_saturates() {
    let polling = PollingConfig {
        timeout: u64::MAX,
        ..Default::default()
    };
    assert_eq!(polling.request_timeout().as_secs(), u64::MAX);
}

#[test]
fn test_validate_rejects_empty_token() {
    let cfg = Config::with_token("  ");
    let err = cfg.validate().unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_validate_rejects_out_of_range_limit() {
    let mut cfg = Config::with_token("123:ABC");
    cfg.polling.limit = 0;
    assert!(cfg.validate().is_err());
    cfg.polling.limit = 101;
    assert!(cfg.validate().is_err());
    cfg.polling.limit = 100;
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_redacted_token() {
    assert_eq!(Config::with_token("123:SECRET").redacted_token(), "123:***");
    assert_eq!(Config::with_token("opaque").redacted_token(), "***");
    assert_eq!(Config::with_token("").redacted_token(), "");
}

#[test]
fn test_load_missing_file_is_config_error() {
    let err = load("/nonexistent/telegrab.toml").unwrap_err();
    assert!(matches!(err, TelegrabError::Config(_)));
}

#[test]
fn test_load_or_init_creates_file_with_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("telegrab.toml");
    let path = path.to_str().unwrap();

    let cfg = load_or_init(path, Some("42:XYZ")).unwrap();
    assert_eq!(cfg.token, "42:XYZ");
    assert_eq!(cfg.polling, PollingConfig::default());

    let written = std::fs::read_to_string(path).unwrap();
    assert!(written.contains("42:XYZ"));
    assert!(written.contains("[polling]"));

    // Reloading yields the same settings.
    let reloaded = load(path).unwrap();
    assert_eq!(reloaded, cfg);
}

#[test]
fn test_load_or_init_without_token_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("telegrab.toml");
    let err = load_or_init(path.to_str().unwrap(), None).unwrap_err();
    assert!(err.is_fatal());
    assert!(!path.exists(), "no file should be written without a token");
}

#[test]
fn test_load_or_init_token_overrides_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("telegrab.toml");
    std::fs::write(&path, "token = \"old\"\n[polling]\ninterval = 2\n").unwrap();

    let cfg = load_or_init(path.to_str().unwrap(), Some("new")).unwrap();
    assert_eq!(cfg.token, "new");
    assert_eq!(cfg.polling.interval, 2);
}

#[test]
fn test_load_rejects_malformed_toml() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bad.toml");
    std::fs::write(&path, "token = [unclosed").unwrap();
    let err = load(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("failed to parse config"));
}
