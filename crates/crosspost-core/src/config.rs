use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CrosspostError, Result};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_X_API_BASE: &str = "https://api.x.com";
pub const DEFAULT_X_UPLOAD_BASE: &str = "https://upload.twitter.com";
pub const DEFAULT_HTTP_PORT: u16 = 10_000;
pub const DEFAULT_HTTP_BIND: &str = "0.0.0.0";
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024; // X photo upload cap
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 4096;
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 20 * 1024 * 1024; // Bot API getFile cap
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Flat env names understood for compatibility with `.env` files of older
/// deployments, mapped onto config key paths.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("TELEGRAM_BOT_TOKEN", "telegram.bot_token"),
    ("TELEGRAM_CHANNEL_ID", "telegram.channel_id"),
    ("AUTHORIZED_USER_ID", "telegram.authorized_user_id"),
    ("TWITTER_API_KEY", "x.api_key"),
    ("TWITTER_API_SECRET", "x.api_secret"),
    ("TWITTER_ACCESS_TOKEN", "x.access_token"),
    ("TWITTER_ACCESS_SECRET", "x.access_secret"),
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_MODEL", "openai.model"),
    ("LOG_LEVEL", "log_level"),
    ("PORT", "http.port"),
];

/// Top-level config (crosspost.toml + CROSSPOST_* env overrides + legacy env names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrosspostConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub x: XConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for CrosspostConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            x: XConfig::default(),
            openai: OpenAiConfig::default(),
            media: MediaConfig::default(),
            pipeline: PipelineConfig::default(),
            http: HttpConfig::default(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Destination channel: numeric chat id (`-100…`) or `@channelname`.
    #[serde(default, deserialize_with = "string_or_number")]
    pub channel_id: String,
    /// Telegram usernames or numeric user ids allowed to submit posts.
    #[serde(default)]
    pub allow_users: Vec<String>,
    /// Single authorized user id, as set by `AUTHORIZED_USER_ID`.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub authorized_user_id: Option<String>,
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: String::new(),
            allow_users: Vec::new(),
            authorized_user_id: None,
            max_download_bytes: default_max_download_bytes(),
        }
    }
}

impl TelegramConfig {
    /// Every allowlist entry, including `authorized_user_id` when set.
    pub fn allowed_users(&self) -> Vec<String> {
        let mut users = self.allow_users.clone();
        if let Some(id) = &self.authorized_user_id {
            if !id.is_empty() && !users.contains(id) {
                users.push(id.clone());
            }
        }
        users
    }
}

/// X (Twitter) credentials. Posting uses OAuth 1.0a user context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub access_token: String,
    #[serde(default)]
    pub access_secret: String,
    /// Account handle used for post URLs. Looked up via `users/me` when unset.
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default = "default_x_api_base")]
    pub api_base: String,
    #[serde(default = "default_x_upload_base")]
    pub upload_base: String,
}

impl Default for XConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            access_token: String::new(),
            access_secret: String::new(),
            handle: None,
            api_base: default_x_api_base(),
            upload_base: default_x_upload_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_openai_model(),
            base_url: default_openai_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
    #[serde(default = "default_max_image_dimension")]
    pub max_image_dimension: u32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            max_image_dimension: default_max_image_dimension(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound for every external call (model, download, publish).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

/// Health endpoint for hosted deployments that expect an open port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_http_bind")]
    pub bind: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: default_http_bind(),
            port: default_http_port(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}
fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}
fn default_x_api_base() -> String {
    DEFAULT_X_API_BASE.to_string()
}
fn default_x_upload_base() -> String {
    DEFAULT_X_UPLOAD_BASE.to_string()
}
fn default_http_bind() -> String {
    DEFAULT_HTTP_BIND.to_string()
}
fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}
fn default_max_image_bytes() -> u64 {
    DEFAULT_MAX_IMAGE_BYTES
}
fn default_max_image_dimension() -> u32 {
    DEFAULT_MAX_IMAGE_DIMENSION
}
fn default_max_download_bytes() -> u64 {
    DEFAULT_MAX_DOWNLOAD_BYTES
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

// Env values such as `-1001234` or `42` arrive as numbers; ids are kept as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Uint(u64),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Uint(u) => u.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    StringOrNumber::deserialize(d).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<StringOrNumber>::deserialize(d)?.map(String::from))
}

impl CrosspostConfig {
    /// Load config from a TOML file with env var overrides.
    ///
    /// Sources, later ones winning:
    ///   1. `config_path`, else `~/.crosspost/crosspost.toml` (optional)
    ///   2. `CROSSPOST_*` env vars, `__` separating nested keys
    ///      (`CROSSPOST_TELEGRAM__BOT_TOKEN`)
    ///   3. legacy flat env names (`TELEGRAM_BOT_TOKEN`, `OPENAI_API_KEY`, …)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::figment(&path)
            .extract()
            .map_err(|e| CrosspostError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CROSSPOST_").split("__"))
            .merge(legacy_env())
    }

    /// Check that every credential the bot cannot run without is present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("TELEGRAM_BOT_TOKEN", self.telegram.bot_token.as_str()),
            ("TELEGRAM_CHANNEL_ID", self.telegram.channel_id.as_str()),
            ("TWITTER_API_KEY", self.x.api_key.as_str()),
            ("TWITTER_API_SECRET", self.x.api_secret.as_str()),
            ("TWITTER_ACCESS_TOKEN", self.x.access_token.as_str()),
            ("TWITTER_ACCESS_SECRET", self.x.access_secret.as_str()),
            ("OPENAI_API_KEY", self.openai.api_key.as_str()),
        ];

        let mut missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| key.to_string())
            .collect();

        if self.telegram.allowed_users().is_empty() {
            missing.push("AUTHORIZED_USER_ID".to_string());
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CrosspostError::MissingSettings(missing))
        }
    }
}

fn legacy_env() -> Env {
    Env::raw().filter_map(|key| {
        LEGACY_ENV_KEYS
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).into())
    })
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.crosspost/crosspost.toml", home)
}
