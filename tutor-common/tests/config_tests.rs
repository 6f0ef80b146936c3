//! Configuration resolution tests
//!
//! Covers the CLI → ENV → TOML → default priority order and credential
//! resolution for the LLM and Twilio sections.
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that touch process environment are marked with #[serial].

use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tutor_common::config::{
    load_toml_config, resolve_database_path, resolve_root_folder, LlmConfig, TomlConfig,
    TwilioConfig, DATABASE_FILE_NAME, DEFAULT_LLM_MODEL, ENV_CONFIG_FILE, ENV_DATABASE_PATH,
    ENV_OPENROUTER_API_KEY, ENV_ROOT_FOLDER, ENV_TWILIO_ACCOUNT_SID, ENV_TWILIO_AUTH_TOKEN,
    ENV_TWILIO_PHONE_NUMBER,
};

fn clear_env() {
    for name in [
        ENV_ROOT_FOLDER,
        ENV_CONFIG_FILE,
        ENV_DATABASE_PATH,
        ENV_OPENROUTER_API_KEY,
        ENV_TWILIO_ACCOUNT_SID,
        ENV_TWILIO_AUTH_TOKEN,
        ENV_TWILIO_PHONE_NUMBER,
    ] {
        env::remove_var(name);
    }
}

fn toml_with_root(root: &str) -> TomlConfig {
    TomlConfig {
        root_folder: Some(PathBuf::from(root)),
        ..Default::default()
    }
}

#[test]
#[serial]
fn test_cli_argument_wins_over_env_and_toml() {
    clear_env();
    env::set_var(ENV_ROOT_FOLDER, "/tmp/from-env");

    let resolved = resolve_root_folder(Some(Path::new("/tmp/from-cli")), &toml_with_root("/tmp/from-toml"));
    assert_eq!(resolved, PathBuf::from("/tmp/from-cli"));

    clear_env();
}

#[test]
#[serial]
fn test_env_wins_over_toml() {
    clear_env();
    env::set_var(ENV_ROOT_FOLDER, "/tmp/from-env");

    let resolved = resolve_root_folder(None, &toml_with_root("/tmp/from-toml"));
    assert_eq!(resolved, PathBuf::from("/tmp/from-env"));

    clear_env();
}

#[test]
#[serial]
fn test_toml_used_when_no_cli_or_env() {
    clear_env();

    let resolved = resolve_root_folder(None, &toml_with_root("/tmp/from-toml"));
    assert_eq!(resolved, PathBuf::from("/tmp/from-toml"));
}

#[test]
#[serial]
fn test_default_root_folder_is_not_empty() {
    clear_env();

    let resolved = resolve_root_folder(None, &TomlConfig::default());
    assert!(!resolved.as_os_str().is_empty());
}

#[test]
#[serial]
fn test_database_path_defaults_into_root_folder() {
    clear_env();

    let path = resolve_database_path(Path::new("/srv/tutor"), &TomlConfig::default());
    assert_eq!(path, PathBuf::from("/srv/tutor").join(DATABASE_FILE_NAME));

    env::set_var(ENV_DATABASE_PATH, "/tmp/override.db");
    let path = resolve_database_path(Path::new("/srv/tutor"), &TomlConfig::default());
    assert_eq!(path, PathBuf::from("/tmp/override.db"));

    clear_env();
}

#[test]
#[serial]
fn test_load_explicit_toml_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        root_folder = "/srv/tutor"
        port = 9100

        [llm]
        api_key = "toml-key"
        "#,
    )
    .unwrap();

    let config = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/tutor")));
    assert_eq!(config.port, Some(9100));
    assert_eq!(config.llm.api_key.as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_missing_explicit_toml_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(load_toml_config(Some(&missing)).is_err());
}

#[test]
#[serial]
fn test_malformed_toml_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    assert!(load_toml_config(Some(&path)).is_err());
}

#[test]
#[serial]
fn test_llm_key_env_wins_over_toml() {
    clear_env();
    let mut toml_config = TomlConfig::default();
    toml_config.llm.api_key = Some("toml-key".to_string());

    let from_toml = LlmConfig::resolve(&toml_config);
    assert_eq!(from_toml.api_key.as_deref(), Some("toml-key"));
    assert_eq!(from_toml.model, DEFAULT_LLM_MODEL);

    env::set_var(ENV_OPENROUTER_API_KEY, "env-key");
    let from_env = LlmConfig::resolve(&toml_config);
    assert_eq!(from_env.api_key.as_deref(), Some("env-key"));

    clear_env();
}

#[test]
#[serial]
fn test_llm_blank_key_is_not_configured() {
    clear_env();
    env::set_var(ENV_OPENROUTER_API_KEY, "   ");

    let config = LlmConfig::resolve(&TomlConfig::default());
    assert!(!config.is_configured());

    clear_env();
}

#[test]
#[serial]
fn test_twilio_requires_all_credentials() {
    clear_env();
    env::set_var(ENV_TWILIO_ACCOUNT_SID, "AC123");
    env::set_var(ENV_TWILIO_AUTH_TOKEN, "secret");

    assert!(TwilioConfig::resolve(&TomlConfig::default()).is_none());

    let mut toml_config = TomlConfig::default();
    toml_config.twilio.phone_number = Some("+14155238886".to_string());
    let twilio = TwilioConfig::resolve(&toml_config).expect("credentials from ENV + TOML");
    assert_eq!(twilio.account_sid, "AC123");
    assert_eq!(twilio.phone_number, "+14155238886");
    assert_eq!(twilio.api_base, "https://api.twilio.com");

    clear_env();
}
