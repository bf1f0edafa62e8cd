use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docrelay service.
#[derive(Debug)]
pub struct Config {
    /// Name of the configuration table holding question-set items.
    pub questions_table: String,
    /// Lookup key identifying the question-set item for this deployment.
    pub questions_key: String,
    /// Destination stream name records are forwarded to.
    pub sink_stream: String,
    /// Base URL of the key-value configuration store.
    pub config_store_url: String,
    /// Optional API key required to access the configuration store.
    pub config_store_api_key: Option<String>,
    /// Base URL of the document extraction capability.
    pub extractor_url: String,
    /// Base URL of the streaming ingestion sink.
    pub sink_url: String,
    /// Delay between polls while an analysis is still running, in milliseconds.
    pub extractor_poll_interval_ms: u64,
    /// Whether raw provider responses are logged at debug level.
    pub log_raw_responses: bool,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            questions_table: load_env("QUESTIONS_TABLE")?,
            questions_key: load_env("QUESTIONS_KEY")?,
            sink_stream: load_env("SINK_STREAM")?,
            config_store_url: load_env("CONFIG_STORE_URL")?,
            config_store_api_key: load_env_optional("CONFIG_STORE_API_KEY"),
            extractor_url: load_env("EXTRACTOR_URL")?,
            sink_url: load_env("SINK_URL")?,
            extractor_poll_interval_ms: load_env_optional("EXTRACTOR_POLL_INTERVAL_MS")
                .map(|value| {
                    value.parse().map_err(|_| {
                        ConfigError::InvalidValue("EXTRACTOR_POLL_INTERVAL_MS".to_string())
                    })
                })
                .transpose()?
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            log_raw_responses: load_env_optional("LOG_RAW_RESPONSES")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("LOG_RAW_RESPONSES".into()))
                })
                .transpose()?
                .unwrap_or(false),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
///
/// Missing required values are a startup-fatal condition.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        table = %config.questions_table,
        key = %config.questions_key,
        stream = %config.sink_stream,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError};
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: guarded by `env_lock`, so no concurrent env mutation occurs.
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        // SAFETY: guarded by `env_lock`, so no concurrent env mutation occurs.
        unsafe { std::env::remove_var(key) }
    }

    fn install_required() {
        set_env("QUESTIONS_TABLE", "survey-questions");
        set_env("QUESTIONS_KEY", "survey");
        set_env("SINK_STREAM", "survey-stream");
        set_env("CONFIG_STORE_URL", "http://127.0.0.1:9001");
        set_env("EXTRACTOR_URL", "http://127.0.0.1:9002");
        set_env("SINK_URL", "http://127.0.0.1:9003");
        remove_env("CONFIG_STORE_API_KEY");
        remove_env("EXTRACTOR_POLL_INTERVAL_MS");
        remove_env("LOG_RAW_RESPONSES");
        remove_env("SERVER_PORT");
    }

    #[test]
    fn from_env_loads_required_values_and_defaults() {
        let _guard = env_lock().lock().expect("env lock");
        install_required();

        let config = Config::from_env().expect("config loads");
        assert_eq!(config.questions_table, "survey-questions");
        assert_eq!(config.questions_key, "survey");
        assert_eq!(config.sink_stream, "survey-stream");
        assert_eq!(config.extractor_poll_interval_ms, 500);
        assert!(!config.log_raw_responses);
        assert!(config.server_port.is_none());
    }

    #[test]
    fn from_env_fails_on_missing_stream() {
        let _guard = env_lock().lock().expect("env lock");
        install_required();
        remove_env("SINK_STREAM");

        let error = Config::from_env().expect_err("missing stream is fatal");
        assert!(matches!(error, ConfigError::MissingVariable(name) if name == "SINK_STREAM"));
    }

    #[test]
    fn from_env_rejects_unparsable_poll_interval() {
        let _guard = env_lock().lock().expect("env lock");
        install_required();
        set_env("EXTRACTOR_POLL_INTERVAL_MS", "soon");

        let error = Config::from_env().expect_err("bad interval rejected");
        assert!(matches!(error, ConfigError::InvalidValue(_)));
        remove_env("EXTRACTOR_POLL_INTERVAL_MS");
    }
}
