use super::*;

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert!(settings.api.base_url.is_none());
    assert_eq!(settings.api.request_timeout, Duration::from_secs(30));
    assert_eq!(
        settings.editor.autosave_debounce,
        Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS)
    );
    assert_eq!(settings.logging.level, LevelFilter::WARN);
    assert_eq!(settings.session.file, PathBuf::from(DEFAULT_SESSION_FILE));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("https://file.example/api".to_string());
    raw.logging.level = Some("info".to_string());

    let overrides = ConfigArgs {
        api_url: Some("https://cli.example/api".to_string()),
        log_level: Some("debug".to_string()),
        autosave_debounce_ms: Some(250),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.api.base_url.as_ref().map(Url::as_str),
        Some("https://cli.example/api")
    );
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.editor.autosave_debounce, Duration::from_millis(250));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ConfigArgs {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn blank_base_url_means_unset() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.api.base_url.is_none());
}

#[test]
fn non_http_base_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("ftp://example.com".to_string());
    let err = Settings::from_raw(raw).expect_err("ftp rejected");
    assert!(matches!(err, LoadError::Invalid { key: "api.base_url", .. }));
}

#[test]
fn zero_debounce_is_rejected() {
    let mut raw = RawSettings::default();
    raw.editor.autosave_debounce_ms = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero debounce");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "editor.autosave_debounce_ms",
            ..
        }
    ));
}

#[test]
fn zero_timeout_is_rejected() {
    let mut raw = RawSettings::default();
    raw.api.request_timeout_seconds = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn invalid_log_level_reports_key() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());
    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(err.to_string().contains("logging.level"));
}

#[test]
fn config_file_is_layered_under_cli() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("desk.toml");
    std::fs::write(
        &path,
        "[api]\nbase_url = \"https://file.example/api\"\nrequest_timeout_seconds = 5\n",
    )
    .expect("write config");

    let args = ConfigArgs {
        config_file: Some(path),
        request_timeout_seconds: Some(9),
        ..Default::default()
    };
    let settings = load(&args).expect("load");
    assert_eq!(
        settings.api.base_url.as_ref().map(Url::as_str),
        Some("https://file.example/api")
    );
    assert_eq!(settings.api.request_timeout, Duration::from_secs(9));
}
