use std::fs;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const DEV_SESSION_SECRET: &str = "dev-session-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub session_secret: String,
    pub session_ttl_seconds: i64,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8443".into(),
            database_url: "sqlite://./data/pitches.db".into(),
            session_secret: DEV_SESSION_SECRET.into(),
            session_ttl_seconds: 7 * 24 * 3600,
            max_body_bytes: 256 * 1024,
        }
    }
}

/// Keys accepted in `server.toml`; anything absent keeps its default.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    database_url: Option<String>,
    session_secret: Option<String>,
    session_ttl_seconds: Option<i64>,
    max_body_bytes: Option<usize>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        if let Err(error) = apply_file_settings(&mut settings, &raw) {
            warn!(%error, "ignoring unreadable server.toml");
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    if settings.session_secret == DEV_SESSION_SECRET {
        warn!("SESSION_SECRET not set; using the development secret");
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw).context("invalid server.toml")?;
    if let Some(v) = file_cfg.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.session_secret {
        settings.session_secret = v;
    }
    if let Some(v) = file_cfg.session_ttl_seconds {
        settings.session_ttl_seconds = v;
    }
    if let Some(v) = file_cfg.max_body_bytes {
        settings.max_body_bytes = v;
    }
    Ok(())
}

/// Plain names first, then `APP__*` aliases, so the aliases win.
fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["SERVER_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = lookup(key) {
            settings.server_bind = v;
        }
    }
    for key in ["DATABASE_URL", "APP__DATABASE_URL"] {
        if let Some(v) = lookup(key) {
            settings.database_url = v;
        }
    }
    for key in ["SESSION_SECRET", "APP__SESSION_SECRET"] {
        if let Some(v) = lookup(key) {
            settings.session_secret = v;
        }
    }
    for key in ["SESSION_TTL_SECONDS", "APP__SESSION_TTL_SECONDS"] {
        if let Some(parsed) = lookup(key).and_then(|v| v.parse::<i64>().ok()) {
            settings.session_ttl_seconds = parsed;
        }
    }
    for key in ["MAX_BODY_BYTES", "APP__MAX_BODY_BYTES"] {
        if let Some(parsed) = lookup(key).and_then(|v| v.parse::<usize>().ok()) {
            settings.max_body_bytes = parsed;
        }
    }
}

/// Turns bare file paths into `sqlite://` URLs. The store creates the
/// parent directory itself when it opens the database.
pub fn prepare_database_url(raw_database_url: &str) -> String {
    normalize_database_url(raw_database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
