//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `PARLEY_*` environment variables. Secrets are read from the environment only.
//!
//! ```rust
//! use parley::config::ParleyConfig;
//! use pchat::RouterMode;
//!
//! let config = ParleyConfig::from_toml_str("mode = \"delegated\"\nport = 9000\n")
//!     .expect("valid file")
//!     .with_env(|name| (name == "PARLEY_PORT").then(|| "9100".to_string()))
//!     .expect("valid env");
//!
//! assert_eq!(config.mode, RouterMode::Delegated);
//! assert_eq!(config.port, 9100);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use pchat::{
    CityExtraction, DEFAULT_CITY, DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, ModelSettings, RouterMode,
};
use pcommon::{GenerationOptions, SecretString};
use pprovider::ProviderId;
use pservices::{DEFAULT_MAX_RESULTS, DEFAULT_TIMEZONE};
use serde::Deserialize;

pub const CONFIG_PATH_VAR: &str = "PARLEY_CONFIG";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRY_COUNT: u32 = 2;

pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    MissingCredential,
    InvalidFile,
    InvalidValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_credential(variable: &str) -> Self {
        Self::new(
            ConfigErrorKind::MissingCredential,
            format!("{variable} is not set; export it before starting parley"),
        )
    }

    pub fn invalid_file(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidFile, message)
    }

    pub fn invalid_value(source: &str, message: impl Display) -> Self {
        Self::new(ConfigErrorKind::InvalidValue, format!("{source}: {message}"))
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ConfigError {}

/// Fully resolved settings for one assistant process.
#[derive(Debug, Clone, PartialEq)]
pub struct ParleyConfig {
    pub mode: RouterMode,
    pub provider: ProviderId,
    pub model: String,
    /// Overrides the provider's default endpoint (any OpenAI-compatible host).
    pub model_base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub model_timeout: Duration,
    pub retry_count: u32,
    pub host: String,
    pub port: u16,
    pub timezone: Tz,
    pub default_city: String,
    pub weather_city_extraction: CityExtraction,
    pub history_capacity: usize,
    pub max_iterations: usize,
    pub search_max_results: usize,
    pub system_prompt: Option<String>,
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            mode: RouterMode::default(),
            provider: ProviderId::Groq,
            model: DEFAULT_MODEL.to_string(),
            model_base_url: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timezone: DEFAULT_TIMEZONE,
            default_city: DEFAULT_CITY.to_string(),
            weather_city_extraction: CityExtraction::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            search_max_results: DEFAULT_MAX_RESULTS,
            system_prompt: None,
        }
    }
}

/// One override layer. Every field is optional; present fields replace the
/// value underneath.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigLayer {
    mode: Option<String>,
    provider: Option<String>,
    model: Option<String>,
    model_base_url: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    model_timeout_secs: Option<u64>,
    retry_count: Option<u32>,
    host: Option<String>,
    port: Option<u16>,
    timezone: Option<String>,
    default_city: Option<String>,
    weather_city_extraction: Option<String>,
    history_capacity: Option<usize>,
    max_iterations: Option<usize>,
    search_max_results: Option<usize>,
    system_prompt: Option<String>,
}

impl ConfigLayer {
    fn from_env(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Ok(Self {
            mode: var("PARLEY_MODE"),
            provider: var("PARLEY_PROVIDER"),
            model: var("PARLEY_MODEL"),
            model_base_url: var("PARLEY_MODEL_BASE_URL"),
            temperature: parse_var(&var, "PARLEY_TEMPERATURE")?,
            max_tokens: parse_var(&var, "PARLEY_MAX_TOKENS")?,
            model_timeout_secs: parse_var(&var, "PARLEY_MODEL_TIMEOUT_SECS")?,
            retry_count: parse_var(&var, "PARLEY_RETRY_COUNT")?,
            host: var("PARLEY_HOST"),
            port: parse_var(&var, "PARLEY_PORT")?,
            timezone: var("PARLEY_TIMEZONE"),
            default_city: var("PARLEY_DEFAULT_CITY"),
            weather_city_extraction: var("PARLEY_WEATHER_CITY_EXTRACTION"),
            history_capacity: parse_var(&var, "PARLEY_HISTORY_CAPACITY")?,
            max_iterations: parse_var(&var, "PARLEY_MAX_ITERATIONS")?,
            search_max_results: parse_var(&var, "PARLEY_SEARCH_MAX_RESULTS")?,
            system_prompt: var("PARLEY_SYSTEM_PROMPT"),
        })
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|err| ConfigError::invalid_value(name, err))
        })
        .transpose()
}

fn parse_provider(value: &str) -> Option<ProviderId> {
    match value.trim().to_ascii_lowercase().as_str() {
        "groq" => Some(ProviderId::Groq),
        "openai" | "open-ai" => Some(ProviderId::OpenAi),
        _ => None,
    }
}

impl ParleyConfig {
    /// Defaults, then the file at `path` (or `PARLEY_CONFIG`), then the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from));

        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.with_env(|name| std::env::var(name).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ConfigError::invalid_file(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|err| ConfigError::new(err.kind, format!("{}: {}", path.display(), err.message)))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let layer: ConfigLayer =
            toml::from_str(raw).map_err(|err| ConfigError::invalid_file(err.to_string()))?;
        Self::default().apply(layer, "config file")
    }

    /// Applies `PARLEY_*` overrides read through `lookup`.
    pub fn with_env(self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let layer = ConfigLayer::from_env(&lookup)?;
        self.apply(layer, "environment")
    }

    fn apply(mut self, layer: ConfigLayer, source: &str) -> Result<Self, ConfigError> {
        if let Some(mode) = layer.mode {
            self.mode = RouterMode::parse(&mode).ok_or_else(|| {
                ConfigError::invalid_value(source, format!("unknown mode '{mode}'"))
            })?;
        }
        if let Some(provider) = layer.provider {
            self.provider = parse_provider(&provider).ok_or_else(|| {
                ConfigError::invalid_value(source, format!("unknown provider '{provider}'"))
            })?;
        }
        if let Some(timezone) = layer.timezone {
            self.timezone = timezone.trim().parse::<Tz>().map_err(|_| {
                ConfigError::invalid_value(source, format!("unknown timezone '{timezone}'"))
            })?;
        }
        if let Some(extraction) = layer.weather_city_extraction {
            self.weather_city_extraction =
                CityExtraction::parse(&extraction).ok_or_else(|| {
                    ConfigError::invalid_value(
                        source,
                        format!("unknown weather_city_extraction '{extraction}'"),
                    )
                })?;
        }

        if let Some(model) = layer.model {
            self.model = model;
        }
        if let Some(url) = layer.model_base_url {
            self.model_base_url = Some(url.trim_end_matches('/').to_string());
        }
        if let Some(temperature) = layer.temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = layer.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(secs) = layer.model_timeout_secs {
            self.model_timeout = Duration::from_secs(secs);
        }
        if let Some(retry_count) = layer.retry_count {
            self.retry_count = retry_count;
        }
        if let Some(host) = layer.host {
            self.host = host;
        }
        if let Some(port) = layer.port {
            self.port = port;
        }
        if let Some(city) = layer.default_city {
            self.default_city = city;
        }
        if let Some(capacity) = layer.history_capacity {
            self.history_capacity = capacity;
        }
        if let Some(max_iterations) = layer.max_iterations {
            self.max_iterations = max_iterations;
        }
        if let Some(max_results) = layer.search_max_results {
            self.search_max_results = max_results;
        }
        if let Some(prompt) = layer.system_prompt {
            self.system_prompt = Some(prompt);
        }

        self.validate(source)?;
        Ok(self)
    }

    fn validate(&self, source: &str) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid_value(source, "model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid_value(
                source,
                "temperature must be between 0.0 and 2.0",
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::invalid_value(source, "max_tokens must be positive"));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::invalid_value(
                source,
                "history_capacity must be positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::invalid_value(source, "max_iterations must be positive"));
        }
        if self.default_city.trim().is_empty() {
            return Err(ConfigError::invalid_value(source, "default_city must not be empty"));
        }
        Ok(())
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings::new(
            self.model.clone(),
            GenerationOptions::new(self.temperature, self.max_tokens),
        )
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Environment variable holding the model key for the configured provider.
    pub fn model_key_variable(&self) -> &'static str {
        match self.provider {
            ProviderId::Groq => GROQ_API_KEY,
            ProviderId::OpenAi => OPENAI_API_KEY,
        }
    }
}

/// Secrets required before the first turn can run.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub model_api_key: SecretString,
    pub search_api_key: SecretString,
}

impl Credentials {
    pub fn from_env(config: &ParleyConfig) -> Result<Self, ConfigError> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        config: &ParleyConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let secret = |variable: &str| {
            lookup(variable)
                .map(SecretString::new)
                .filter(|secret| !secret.is_blank())
                .ok_or_else(|| ConfigError::missing_credential(variable))
        };

        Ok(Self {
            model_api_key: secret(config.model_key_variable())?,
            search_api_key: secret(TAVILY_API_KEY)?,
        })
    }
}
