//! Configuration loading and root folder resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority, applied by the binary)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The resolved [`BotConfig`] is built once at startup and handed to the
//! components that need it. Nothing reads the environment after that.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Directory name used under the platform config/data folders
pub const APP_DIR_NAME: &str = "wa-tutor";

/// Database file created inside the root folder
pub const DATABASE_FILE_NAME: &str = "wa_tutor.db";

pub const ENV_ROOT_FOLDER: &str = "WA_TUTOR_ROOT";
pub const ENV_CONFIG_FILE: &str = "WA_TUTOR_CONFIG";
pub const ENV_DATABASE_PATH: &str = "DATABASE_PATH";
pub const ENV_OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const ENV_TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const ENV_TWILIO_PHONE_NUMBER: &str = "TWILIO_PHONE_NUMBER";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LLM_MODEL: &str = "deepseek/deepseek-chat-v3.1";
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 300;
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Bootstrap configuration loaded from TOML file
///
/// All fields are optional; a missing file is the same as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Explicit database file (overrides `root_folder`)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP bind host
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub llm: LlmSection,

    #[serde(default)]
    pub twilio: TwilioSection,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[llm]` table of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

/// `[twilio]` table of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TwilioSection {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub phone_number: Option<String>,
    pub api_base: Option<String>,
}

/// Settings for the lesson generation service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer key; `None` means lesson generation is unavailable
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound on a single generation request
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            max_tokens: DEFAULT_LLM_MAX_TOKENS,
            temperature: DEFAULT_LLM_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

impl LlmConfig {
    /// Resolve from ENV → TOML → defaults
    pub fn resolve(toml_config: &TomlConfig) -> Self {
        let section = &toml_config.llm;

        let api_key = match env_value(ENV_OPENROUTER_API_KEY) {
            Some(key) => {
                info!("LLM API key loaded from environment variable");
                Some(key)
            }
            None => section.api_key.clone().filter(|k| is_valid_key(k)).map(|k| {
                info!("LLM API key loaded from TOML config");
                k
            }),
        };

        if api_key.is_none() {
            warn!(
                "{} not set; lesson generation will fail until it is configured",
                ENV_OPENROUTER_API_KEY
            );
        }

        Self {
            api_key,
            base_url: section
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: section
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            max_tokens: section.max_tokens.unwrap_or(DEFAULT_LLM_MAX_TOKENS),
            temperature: section.temperature.unwrap_or(DEFAULT_LLM_TEMPERATURE),
            timeout: Duration::from_secs(section.timeout_secs.unwrap_or(DEFAULT_LLM_TIMEOUT_SECS)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Twilio account credentials
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number without the `whatsapp:` prefix
    pub phone_number: String,
    pub api_base: String,
}

impl TwilioConfig {
    /// Resolve from ENV → TOML, per field
    ///
    /// Returns `None` unless all three credentials are present.
    pub fn resolve(toml_config: &TomlConfig) -> Option<Self> {
        let section = &toml_config.twilio;
        let pick = |env_name: &str, toml_value: &Option<String>| {
            env_value(env_name).or_else(|| toml_value.clone().filter(|v| is_valid_key(v)))
        };

        let account_sid = pick(ENV_TWILIO_ACCOUNT_SID, &section.account_sid);
        let auth_token = pick(ENV_TWILIO_AUTH_TOKEN, &section.auth_token);
        let phone_number = pick(ENV_TWILIO_PHONE_NUMBER, &section.phone_number);

        match (account_sid, auth_token, phone_number) {
            (Some(account_sid), Some(auth_token), Some(phone_number)) => {
                info!("Twilio credentials configured");
                Some(Self {
                    account_sid,
                    auth_token,
                    phone_number,
                    api_base: section
                        .api_base
                        .clone()
                        .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
                })
            }
            _ => {
                warn!("Twilio configuration not found. Outbound messaging is disabled.");
                None
            }
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub llm: LlmConfig,
    pub twilio: Option<TwilioConfig>,
}

impl BotConfig {
    /// `host:port` string for the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Validate a credential (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Read an environment variable, ignoring blank values
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_key(v))
}

/// Platform default location of the TOML file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Load the TOML bootstrap file
///
/// An explicitly requested file must exist. The platform default file is
/// optional and yields an empty config when absent.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| env_value(ENV_CONFIG_FILE).map(PathBuf::from));

    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Root folder resolution: CLI → ENV → TOML → OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = env_value(ENV_ROOT_FOLDER) {
        return PathBuf::from(path);
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    get_default_root_folder()
}

/// Database path: ENV → TOML → `{root}/wa_tutor.db`
pub fn resolve_database_path(root_folder: &Path, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = env_value(ENV_DATABASE_PATH) {
        return PathBuf::from(path);
    }

    if let Some(path) = &toml_config.database_path {
        return path.clone();
    }

    root_folder.join(DATABASE_FILE_NAME)
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./wa_tutor_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("sk-or-123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    fn test_toml_sections_parse() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 9000

            [logging]
            level = "debug"

            [llm]
            model = "test/model"
            timeout_secs = 5

            [twilio]
            phone_number = "+15550001111"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, Some(9000));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.llm.model.as_deref(), Some("test/model"));
        assert_eq!(config.llm.timeout_secs, Some(5));
        assert_eq!(config.twilio.phone_number.as_deref(), Some("+15550001111"));
        assert!(config.twilio.account_sid.is_none());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.root_folder.is_none());
    }

    #[test]
    fn test_bind_address() {
        let config = BotConfig {
            host: "127.0.0.1".to_string(),
            port: 8123,
            database_path: PathBuf::from("/tmp/x.db"),
            llm: LlmConfig::default(),
            twilio: None,
        };
        assert_eq!(config.bind_address(), "127.0.0.1:8123");
    }
}
