use super::*;

use std::collections::HashMap;

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn sqlite_prefix_without_slashes_is_normalized() {
    assert_eq!(prepare_database_url("sqlite:data\\pitches.db"), "sqlite://data/pitches.db");
}

#[test]
fn empty_database_url_falls_back_to_default() {
    assert_eq!(normalize_database_url("   "), Settings::default().database_url);
}

#[test]
fn memory_url_is_left_alone() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
}

#[test]
fn file_settings_override_defaults() {
    let mut settings = Settings::default();
    apply_file_settings(
        &mut settings,
        r#"
        bind_addr = "0.0.0.0:9000"
        session_ttl_seconds = 120
        max_body_bytes = 1024
        "#,
    )
    .expect("parse");

    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.session_ttl_seconds, 120);
    assert_eq!(settings.max_body_bytes, 1024);
    assert_eq!(settings.database_url, Settings::default().database_url);
}

#[test]
fn malformed_file_settings_are_reported() {
    let mut settings = Settings::default();
    assert!(apply_file_settings(&mut settings, "session_ttl_seconds = \"soon\"").is_err());
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_name() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "sqlite://plain.db"),
        ("APP__DATABASE_URL", "sqlite://app.db"),
        ("SESSION_SECRET", "s3cret"),
        ("SESSION_TTL_SECONDS", "not-a-number"),
    ]);
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.database_url, "sqlite://app.db");
    assert_eq!(settings.session_secret, "s3cret");
    assert_eq!(
        settings.session_ttl_seconds,
        Settings::default().session_ttl_seconds
    );
}
