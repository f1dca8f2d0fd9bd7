use std::env;
use std::time::Duration;

use crate::session::VideoCodec;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Issuance URL template; `{id}` is replaced by the event id.
    pub token_endpoint: Option<String>,
    pub livekit_url: Option<String>,
    pub livekit_api_key: Option<String>,
    pub livekit_api_secret: Option<String>,
    pub default_codec: VideoCodec,
    pub show_settings_menu: bool,
    pub issuance_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            token_endpoint: non_empty_var("TOKEN_ENDPOINT"),
            livekit_url: non_empty_var("LIVEKIT_URL"),
            livekit_api_key: non_empty_var("LIVEKIT_API_KEY"),
            livekit_api_secret: non_empty_var("LIVEKIT_API_SECRET"),
            default_codec: match non_empty_var("DEFAULT_CODEC") {
                Some(name) => name
                    .parse::<VideoCodec>()
                    .map_err(|_| ConfigError::UnknownCodec(name))?,
                None => VideoCodec::default(),
            },
            show_settings_menu: env::var("SHOW_SETTINGS_MENU")
                .map(|v| v == "true")
                .unwrap_or(false),
            issuance_timeout: parse_timeout(non_empty_var("ISSUANCE_TIMEOUT_SECONDS").as_deref())?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// True when any of the local signing settings is present.
    pub fn has_signing_settings(&self) -> bool {
        self.livekit_url.is_some()
            || self.livekit_api_key.is_some()
            || self.livekit_api_secret.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            token_endpoint: None,
            livekit_url: None,
            livekit_api_key: None,
            livekit_api_secret: None,
            default_codec: VideoCodec::default(),
            show_settings_menu: false,
            issuance_timeout: Duration::from_secs(10),
        }
    }
}

/// Empty values count as unset.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Whole seconds; unset means 10.
fn parse_timeout(value: Option<&str>) -> Result<Duration, ConfigError> {
    match value {
        Some(raw) => raw
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidTimeout(raw.to_string())),
        None => Ok(Duration::from_secs(10)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server port")]
    InvalidPort,
    #[error("Invalid issuance timeout: {0}")]
    InvalidTimeout(String),
    #[error("Unknown video codec: {0}")]
    UnknownCodec(String),
}
