//! services/console/src/config.rs
//!
//! Defines the console's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use reqwest::Url;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds the console's configuration, loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_root: Url,
    pub request_timeout: Duration,
    pub log_level: Level,
}

/// Settings of the `stub-api` binary. The stub never talks to a remote API, so
/// `API_ROOT` is not needed here.
#[derive(Clone, Debug)]
pub struct StubConfig {
    pub log_level: Level,
    pub bind_address: SocketAddr,
    pub admin_email: String,
    pub admin_password: String,
}

/// Loads `.env` for development. Skipped in tests to keep them hermetic.
fn load_dotenv() {
    if !cfg!(test) {
        dotenvy::dotenv().ok();
    }
}

fn parse_log_level<F>(lookup: &F) -> Result<Level, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
    log_level_str.parse::<Level>().map_err(|_| {
        ConfigError::InvalidValue(
            "RUST_LOG".to_string(),
            format!("'{}' is not a valid log level", log_level_str),
        )
    })
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_root_str =
            lookup("API_ROOT").ok_or_else(|| ConfigError::MissingVar("API_ROOT".to_string()))?;
        let api_root = parse_api_root(&api_root_str)?;

        let timeout_str = lookup("REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "30".to_string());
        let timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            api_root,
            request_timeout: Duration::from_secs(timeout_secs),
            log_level: parse_log_level(&lookup)?,
        })
    }
}

impl StubConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_str =
            lookup("STUB_BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:4000".to_string());
        let bind_address = bind_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("STUB_BIND_ADDRESS".to_string(), e.to_string())
        })?;

        Ok(Self {
            log_level: parse_log_level(&lookup)?,
            bind_address,
            admin_email: lookup("STUB_ADMIN_EMAIL")
                .unwrap_or_else(|| "admin@ledgerdesk.local".to_string()),
            admin_password: lookup("STUB_ADMIN_PASSWORD").unwrap_or_else(|| "admin".to_string()),
        })
    }
}

/// Parses the API root and makes sure it ends with a slash, so that joining a
/// collection path keeps every segment of the root.
pub fn parse_api_root(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidValue("API_ROOT".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidValue(
            "API_ROOT".to_string(),
            format!("'{}' cannot be used as a base URL", raw),
        ));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_api_root_is_set() {
        let config = Config::from_lookup(lookup(&[("API_ROOT", "https://api.firm.test/api")]))
            .unwrap();
        assert_eq!(config.api_root.as_str(), "https://api.firm.test/api/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn the_stub_starts_without_an_api_root() {
        let stub = StubConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(stub.bind_address.port(), 4000);
        assert_eq!(stub.admin_email, "admin@ledgerdesk.local");
        assert_eq!(stub.log_level, Level::INFO);

        let err = StubConfig::from_lookup(lookup(&[("STUB_BIND_ADDRESS", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "STUB_BIND_ADDRESS"));
    }

    #[test]
    fn api_root_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(name) if name == "API_ROOT"));
    }

    #[test]
    fn bad_values_are_rejected_with_the_variable_name() {
        let err = Config::from_lookup(lookup(&[
            ("API_ROOT", "http://localhost:4000"),
            ("REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "REQUEST_TIMEOUT_SECS"));

        let err = Config::from_lookup(lookup(&[("API_ROOT", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "API_ROOT"));
    }

    #[test]
    fn joining_keeps_the_root_path() {
        let root = parse_api_root("http://localhost:4000/api").unwrap();
        assert_eq!(
            root.join("accountants/internal").unwrap().as_str(),
            "http://localhost:4000/api/accountants/internal"
        );
    }
}
