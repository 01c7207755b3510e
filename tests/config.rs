// tests/config.rs
//
// File + env loading. Env-mutating tests run serially.

use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;
use trendcast::config::generator::DEFAULT_OPENAI_MODEL;
use trendcast::config::{
    AppConfig, ProviderKind, DEFAULT_CACHE_TTL_SECS, DEFAULT_CAP, ENV_AI_TEST_MODE,
    ENV_CACHE_TTL_SECS, ENV_CAP, ENV_CONFIG_PATH, ENV_GENERATOR, ENV_SOURCE,
};
use trendcast::trends::types::SourceKind;

const ALL_VARS: [&str; 6] = [
    ENV_CONFIG_PATH,
    ENV_SOURCE,
    ENV_CAP,
    ENV_CACHE_TTL_SECS,
    ENV_GENERATOR,
    ENV_AI_TEST_MODE,
];

fn clear_env() {
    for v in ALL_VARS {
        std::env::remove_var(v);
    }
}

fn write_toml(body: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("temp file");
    f.write_all(body.as_bytes()).expect("write toml");
    f
}

#[test]
fn shipped_config_file_parses() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/trendcast.toml");
    let cfg = AppConfig::load_from(&path).expect("shipped config loads");
    assert_eq!(cfg.trends.source, SourceKind::GoogleRss);
    assert_eq!(cfg.trends.cap, DEFAULT_CAP);
    assert_eq!(cfg.trends.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
    assert_eq!(cfg.generator.provider, ProviderKind::Gemini);
    assert_eq!(cfg.generator.api_key, "ENV");
}

#[test]
fn load_from_reports_missing_file() {
    let err = AppConfig::load_from(std::path::Path::new("/definitely/not/here.toml")).unwrap_err();
    assert!(format!("{err:#}").contains("reading config"));
}

#[test]
#[serial]
fn load_default_reads_env_path_and_applies_overrides() {
    clear_env();
    let f = write_toml(
        r#"
[trends]
source = "aggregator"
cap = 15
cache_ttl_secs = 60

[generator]
provider = "openai"
api_key = ""
"#,
    );
    std::env::set_var(ENV_CONFIG_PATH, f.path());
    std::env::set_var(ENV_SOURCE, "yahoo_realtime");
    std::env::set_var(ENV_CAP, "999");

    let cfg = AppConfig::load_default().expect("load");
    assert_eq!(cfg.trends.source, SourceKind::YahooRealtime, "env beats file");
    assert_eq!(cfg.trends.cap, 50, "cap is clamped after overrides");
    assert_eq!(cfg.trends.cache_ttl_secs, 60);
    assert_eq!(cfg.generator.provider, ProviderKind::OpenAi);

    clear_env();
}

#[test]
#[serial]
fn bad_env_values_are_ignored() {
    clear_env();
    let f = write_toml("[trends]\ncap = 7\n");
    std::env::set_var(ENV_CONFIG_PATH, f.path());
    std::env::set_var(ENV_SOURCE, "bing");
    std::env::set_var(ENV_CAP, "ten");
    std::env::set_var(ENV_CACHE_TTL_SECS, "0");

    let cfg = AppConfig::load_default().expect("load");
    assert_eq!(cfg.trends.source, SourceKind::GoogleRss);
    assert_eq!(cfg.trends.cap, 7);
    assert_eq!(cfg.trends.cache_ttl_secs, 0, "zero disables caching");

    clear_env();
}

#[test]
#[serial]
fn ai_test_mode_forces_mock_generator() {
    clear_env();
    let f = write_toml("[generator]\nprovider = \"gemini\"\n");
    std::env::set_var(ENV_CONFIG_PATH, f.path());
    std::env::set_var(ENV_GENERATOR, "openai");
    std::env::set_var(ENV_AI_TEST_MODE, "mock");

    let cfg = AppConfig::load_default().expect("load");
    assert_eq!(cfg.generator.provider, ProviderKind::Mock);

    clear_env();
}

#[test]
#[serial]
fn generator_override_uses_that_providers_default_model() {
    clear_env();
    let shipped = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/trendcast.toml");
    std::env::set_var(ENV_CONFIG_PATH, &shipped);
    std::env::set_var(ENV_GENERATOR, "openai");

    let cfg = AppConfig::load_default().expect("load");
    assert_eq!(cfg.generator.provider, ProviderKind::OpenAi);
    assert_eq!(cfg.generator.model_or_default(), DEFAULT_OPENAI_MODEL);

    clear_env();
}

#[test]
#[serial]
fn missing_env_path_is_an_error() {
    clear_env();
    std::env::set_var(ENV_CONFIG_PATH, "/definitely/not/here.toml");
    assert!(AppConfig::load_default().is_err());
    clear_env();
}
