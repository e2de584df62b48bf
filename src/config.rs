use secrecy::{ExposeSecret, SecretBox};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;
pub const DEFAULT_RESUME_DELAY_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
    #[error("Invalid server URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Environment error: {0}")]
    EnvError(#[from] env::VarError),
}

/// Configuration for the assistant and its Professor server connection
#[derive(Debug)]
pub struct ScoutConfig {
    pub server_url: Url,
    pub server_token: Option<SecretBox<String>>,
    pub request_timeout: Duration,
    pub resume_delay: Duration,
    pub confidence_threshold: f32,
    pub labels_path: Option<PathBuf>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
            server_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            resume_delay: Duration::from_millis(DEFAULT_RESUME_DELAY_MS),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            labels_path: None,
        }
    }
}

impl ScoutConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(raw) = Self::optional_var("SCOUT_SERVER_URL")? {
            config.server_url = Self::parse_server_url(&raw)?;
        }

        config.server_token = Self::optional_var("SCOUT_SERVER_TOKEN")?
            .map(|token| SecretBox::new(Box::new(token)));

        if let Some(raw) = Self::optional_var("SCOUT_REQUEST_TIMEOUT_SECS")? {
            let secs = Self::parse_u64("SCOUT_REQUEST_TIMEOUT_SECS", &raw)?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "SCOUT_REQUEST_TIMEOUT_SECS".to_string(),
                    reason: "timeout must be at least one second".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = Self::optional_var("SCOUT_RESUME_DELAY_MS")? {
            config.resume_delay =
                Duration::from_millis(Self::parse_u64("SCOUT_RESUME_DELAY_MS", &raw)?);
        }

        if let Some(raw) = Self::optional_var("SCOUT_CONFIDENCE_THRESHOLD")? {
            config.confidence_threshold = Self::parse_threshold(&raw)?;
        }

        config.labels_path = Self::optional_var("SCOUT_LABELS_PATH")?.map(PathBuf::from);

        Ok(config)
    }

    /// Read an environment variable, treating unset and blank values as absent
    fn optional_var(name: &str) -> Result<Option<String>, ConfigError> {
        match env::var(name) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse_server_url(raw: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidValue {
                var: "SCOUT_SERVER_URL".to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(url)
    }

    fn parse_u64(var: &str, raw: &str) -> Result<u64, ConfigError> {
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
            var: var.to_string(),
            reason: e.to_string(),
        })
    }

    fn parse_threshold(raw: &str) -> Result<f32, ConfigError> {
        let value = raw
            .parse::<f32>()
            .map_err(|e| ConfigError::InvalidValue {
                var: "SCOUT_CONFIDENCE_THRESHOLD".to_string(),
                reason: e.to_string(),
            })?;

        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidValue {
                var: "SCOUT_CONFIDENCE_THRESHOLD".to_string(),
                reason: "threshold must be between 0.0 and 1.0".to_string(),
            });
        }
        Ok(value)
    }

    /// Get the server bearer token (use only when making API calls)
    pub fn server_token(&self) -> Option<&str> {
        self.server_token
            .as_ref()
            .map(|token| token.expose_secret().as_str())
    }
}

/// Load configuration with helpful error messages for development
pub fn load_config() -> Result<ScoutConfig, ConfigError> {
    match ScoutConfig::load() {
        Ok(config) => {
            log::info!(
                "Successfully loaded configuration (server: {})",
                config.server_url
            );
            Ok(config)
        }
        Err(e) => {
            log::error!("Configuration error: {}", e);
            log::error!("Check the SCOUT_* variables in your environment or .env file");
            Err(e)
        }
    }
}
