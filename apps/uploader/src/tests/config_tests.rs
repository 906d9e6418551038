use super::{apply_env_overrides, apply_file_overrides, load_settings_from, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::Path,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_from(Path::new("/nonexistent/uploader.toml"), env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
base_url = "https://videos.example.test/youtube"
csrf_token = "from-file"
poll_interval_ms = 250
max_file_size_mb = "512"
"#,
    );
    assert_eq!(settings.base_url, "https://videos.example.test/youtube");
    assert_eq!(settings.csrf_token.as_deref(), Some("from-file"));
    assert_eq!(settings.poll_interval_ms, 250);
    assert_eq!(settings.max_file_size_mb, 512);
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn malformed_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "base_url = [unterminated");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("UPLOADER_BASE_URL", "http://plain.test"),
            ("APP__BASE_URL", "http://app.test"),
            ("UPLOADER_CSRF_TOKEN", "tok"),
            ("APP__POLL_INTERVAL_MS", "0"),
            ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]),
    );
    assert_eq!(settings.base_url, "http://app.test");
    assert_eq!(settings.csrf_token.as_deref(), Some("tok"));
    assert_eq!(settings.poll_interval_ms, 0);
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn env_overrides_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("uploader_config_test_{suffix}.toml"));
    fs::write(&path, "base_url = \"http://file.test\"\ncsrf_token = \"file\"\n").expect("write");

    let settings = load_settings_from(&path, env_from(&[("APP__CSRF_TOKEN", "env")]));
    assert_eq!(settings.base_url, "http://file.test");
    assert_eq!(settings.csrf_token.as_deref(), Some("env"));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn converts_to_controller_settings() {
    let settings = Settings {
        poll_interval_ms: 750,
        max_file_size_mb: 2,
        ..Settings::default()
    };
    let controller = settings.controller_settings();
    assert_eq!(controller.poll_interval, Duration::from_millis(750));
    assert_eq!(controller.max_file_size, 2 * 1024 * 1024);
    assert!(settings.build_host().is_ok());

    let broken = Settings {
        base_url: "::not a url::".to_string(),
        ..Settings::default()
    };
    assert!(broken.build_host().is_err());
}
