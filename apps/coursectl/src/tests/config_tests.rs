use super::{apply_env, load_settings, parse_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::Path,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let settings = parse_settings("server_url = \"https://learn.example.org\"\nredirect_delay_ms = 500\n")
        .expect("parse");
    assert_eq!(settings.server_url, "https://learn.example.org");
    assert_eq!(settings.redirect_delay(), Duration::from_millis(500));
    assert_eq!(settings.request_timeout_secs, Settings::default().request_timeout_secs);
    assert_eq!(settings.countdown_tick(), Duration::from_secs(1));
}

#[test]
fn malformed_file_is_an_error() {
    assert!(parse_settings("request_timeout_secs = \"soon\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_plain_server_url() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        lookup_from(&[
            ("COURSE_SERVER_URL", "http://plain:1"),
            ("APP__SERVER_URL", "http://prefixed:2"),
            ("APP__COUNTDOWN_TICK_MS", "250"),
        ]),
    );
    assert_eq!(settings.server_url, "http://prefixed:2");
    assert_eq!(settings.countdown_tick_ms, 250);
}

#[test]
fn unparsable_numeric_env_is_ignored() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        lookup_from(&[("APP__REQUEST_TIMEOUT_SECS", "ten"), ("APP__REDIRECT_DELAY_MS", "-5")]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let settings = load_settings(Path::new("/nonexistent/coursectl.toml")).expect("load");
    assert!(!settings.server_url.is_empty());
}

#[test]
fn reads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("coursectl_config_test_{suffix}.toml"));
    fs::write(&path, "request_timeout_secs = 3\n").expect("write");

    let settings = load_settings(&path).expect("load");
    assert_eq!(settings.request_timeout(), Duration::from_secs(3));

    fs::remove_file(path).expect("cleanup");
}
