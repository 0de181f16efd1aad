//! Layered configuration loader.

use std::env;
use std::fs;
use std::path::Path;

use gatehouse_telemetry::LogFormat;

use crate::{ConfigError, GatehouseConfig};

/// Default prefix for environment overrides.
pub const ENV_PREFIX: &str = "GATEHOUSE";

/// Configuration loader.
///
/// Layers are applied in order, later ones overriding earlier ones:
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. `.env` file, loaded into the process environment
/// 4. Environment variables of the form `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use gatehouse_config::ConfigLoader;
///
/// # fn main() -> Result<(), gatehouse_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("gatehouse.toml")?
///     .with_dotenv()?
///     .with_env_prefix("GATEHOUSE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: GatehouseConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GatehouseConfig::default(),
            env_prefix: None,
        }
    }

    /// Starts from the development preset instead of the defaults.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = GatehouseConfig::development();
        self
    }

    /// Loads a configuration file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// contains unknown fields or has an unsupported extension.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.config = Self::parse_file(&content, path)?;

        Ok(self)
    }

    /// Loads a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in the given format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unsupported.
    ///
    /// # Example
    ///
    /// ```
    /// use gatehouse_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [server]
    ///     http_addr = "127.0.0.1:3000"
    ///
    ///     [auth]
    ///     token_symmetric_key = "0123456789abcdef0123456789abcdef"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::rejected(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Loads `.env` from the working directory into the process environment.
    ///
    /// A missing file is not an error. Variables already set win over the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `.env` exists but cannot be
    /// parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::rejected(format!("invalid .env file: {e}"))),
        }
    }

    /// Enables environment overrides of the form `PREFIX__SECTION__KEY`.
    ///
    /// For example, with prefix `GATEHOUSE`:
    /// - `GATEHOUSE__SERVER__HTTP_ADDR=0.0.0.0:9000`
    /// - `GATEHOUSE__TELEMETRY__LOGGING__LEVEL=debug`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation
    /// fails.
    pub fn load(self) -> Result<GatehouseConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides without validating.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed.
    pub fn load_unvalidated(mut self) -> Result<GatehouseConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            let vars: Vec<(String, String)> = env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
                .filter(|(key, _)| key.starts_with(&marker))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }
        Ok(self.config)
    }

    fn parse_file(content: &str, path: &Path) -> Result<GatehouseConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::rejected(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let rest = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env(key, "invalid key format"))?;

        let parts: Vec<&str> = rest.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_int(key, value)?;
            }
            ["SERVER", "MAX_BODY_BYTES"] => {
                config.server.max_body_bytes = parse_int(key, value)?;
            }

            ["AUTH", "TOKEN_SYMMETRIC_KEY"] => {
                config.auth.token_symmetric_key = value.to_string();
            }
            ["AUTH", "ACCESS_TOKEN_TTL_SECS"] => {
                config.auth.access_token_ttl_secs = parse_int(key, value)?;
            }
            ["AUTH", "REFRESH_TOKEN_TTL_SECS"] => {
                config.auth.refresh_token_ttl_secs = parse_int(key, value)?;
            }

            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                config.telemetry.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                config.telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                config.telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }

            ["TELEMETRY", "METRICS", "ENABLED"] => {
                config.telemetry.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }
            ["TELEMETRY", "METRICS", "ADDR"] => {
                config.telemetry.metrics.addr = value.to_string();
            }

            _ => return Err(ConfigError::env(key, "unknown configuration key")),
        }

        Ok(())
    }
}

fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env(key, "expected integer"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
