use std::{collections::HashMap, fs, path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use client_core::{transport::HttpVideoHost, ControllerSettings, VideoHost};
use tracing::warn;

pub const CONFIG_FILE: &str = "uploader.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub csrf_token: Option<String>,
    pub poll_interval_ms: u64,
    pub max_file_size_mb: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000/youtube".into(),
            csrf_token: None,
            poll_interval_ms: 500,
            max_file_size_mb: 2048,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_file_size: self.max_file_size_mb.saturating_mul(1024 * 1024),
        }
    }

    pub fn build_host(&self) -> anyhow::Result<Arc<dyn VideoHost>> {
        let host = HttpVideoHost::new(&self.base_url, self.csrf_token.clone())
            .with_context(|| format!("failed to configure video host at '{}'", self.base_url))?
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs));
        Ok(Arc::new(host))
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, env);

    settings
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("ignoring unreadable {CONFIG_FILE}: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.get("base_url").and_then(toml::Value::as_str) {
        settings.base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("csrf_token").and_then(toml::Value::as_str) {
        settings.csrf_token = Some(v.to_string());
    }
    if let Some(v) = file_cfg.get("poll_interval_ms").and_then(as_u64) {
        settings.poll_interval_ms = v;
    }
    if let Some(v) = file_cfg.get("max_file_size_mb").and_then(as_u64) {
        settings.max_file_size_mb = v;
    }
    if let Some(v) = file_cfg.get("request_timeout_secs").and_then(as_u64) {
        settings.request_timeout_secs = v;
    }
}

fn as_u64(value: &toml::Value) -> Option<u64> {
    match value {
        toml::Value::Integer(v) => u64::try_from(*v).ok(),
        toml::Value::String(v) => v.trim().parse().ok(),
        _ => None,
    }
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("UPLOADER_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("UPLOADER_CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }
    if let Some(v) = env("APP__CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }

    if let Some(v) = env("APP__POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        settings.poll_interval_ms = v;
    }
    if let Some(v) = env("APP__MAX_FILE_SIZE_MB").and_then(|v| v.parse().ok()) {
        settings.max_file_size_mb = v;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.request_timeout_secs = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
