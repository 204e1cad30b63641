//! Application configuration
//!
//! Layers, lowest precedence first: built-in defaults, an optional config file,
//! `CLIMA_*` environment variables (`__` separates nested keys, e.g.
//! `CLIMA_SERVER__PORT=8080`; origins are comma-separated). Well-known
//! credential variables fill any secret that is still empty afterwards.

mod server;

use ai_core::InferenceConfig;
use application::StatsConfig;
use config::{ConfigBuilder, ConfigError, builder::DefaultState};
use integration_gldas::GldasConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use server::{LogFormat, ServerConfig};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CLIMA";

/// Variable naming the config file (without extension)
pub const CONFIG_PATH_VAR: &str = "CLIMA_CONFIG";

/// Hosted model API key
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Earthdata bearer token
pub const EARTHDATA_TOKEN_VAR: &str = "EARTHDATA_TOKEN";
/// Earthdata Login username
pub const EARTHDATA_USERNAME_VAR: &str = "EARTHDATA_USERNAME";
/// Earthdata Login password
pub const EARTHDATA_PASSWORD_VAR: &str = "EARTHDATA_PASSWORD";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Summary model configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Reanalysis archive configuration
    #[serde(default)]
    pub gldas: GldasConfig,

    /// Exceedance thresholds
    #[serde(default)]
    pub stats: StatsConfig,
}

impl AppConfig {
    /// Load configuration from the environment and the optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config".to_string());
        let builder = Self::defaults()?
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_credential_fallbacks(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Built-in defaults
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("inference.default_model", "gemini-2.5-flash")?
            .set_default("gldas.short_name", "GLDAS_NOAH025_3H")?
            .set_default("gldas.version", "2.1")
    }

    /// Fill empty secrets from well-known variables
    pub fn apply_credential_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.inference.api_key().is_none() {
            if let Some(key) = lookup(GOOGLE_API_KEY_VAR) {
                self.inference.api_key = Some(SecretString::from(key));
                debug!("Loaded inference.api_key from {GOOGLE_API_KEY_VAR}");
            }
        }
        if self.gldas.token().is_none() {
            if let Some(token) = lookup(EARTHDATA_TOKEN_VAR) {
                self.gldas.token = Some(SecretString::from(token));
                debug!("Loaded gldas.token from {EARTHDATA_TOKEN_VAR}");
            }
        }
        if self.gldas.username().is_none() {
            self.gldas.username = lookup(EARTHDATA_USERNAME_VAR).or(self.gldas.username.take());
        }
        if self.gldas.password().is_none() {
            if let Some(password) = lookup(EARTHDATA_PASSWORD_VAR) {
                self.gldas.password = Some(SecretString::from(password));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_toml(toml: &str) -> AppConfig {
        AppConfig::defaults()
            .unwrap()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_apply_without_sources() {
        let config = from_toml("");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.log_format, LogFormat::Text);
        assert!(!config.server.expose_internal_errors);
        assert_eq!(config.inference.default_model, "gemini-2.5-flash");
        assert_eq!(config.gldas.short_name, "GLDAS_NOAH025_3H");
        assert_eq!(config.gldas.version, "2.1");
        assert!((config.stats.rain_threshold - 0.1).abs() < f64::EPSILON);
        assert!((config.stats.snow_threshold - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn file_values_override_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 9090
            log_format = "json"
            allowed_origins = ["https://clima.example.org"]

            [inference]
            default_model = "gemini-2.5-pro"
            api_key = "from-file"

            [gldas]
            page_size = 3

            [stats]
            rain_threshold = 0.5
            "#,
        );
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.server.allowed_origins.len(), 1);
        assert_eq!(config.inference.default_model, "gemini-2.5-pro");
        assert_eq!(config.inference.api_key(), Some("from-file"));
        assert_eq!(config.gldas.page_size, 3);
        assert!((config.stats.rain_threshold - 0.5).abs() < f64::EPSILON);
        assert!((config.stats.snow_threshold - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn credential_fallbacks_fill_empty_secrets() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (GOOGLE_API_KEY_VAR, "g-key"),
            (EARTHDATA_USERNAME_VAR, "alice"),
            (EARTHDATA_PASSWORD_VAR, "hunter2"),
            (EARTHDATA_TOKEN_VAR, "  "),
        ]);
        let mut config = AppConfig::default();
        config.apply_credential_fallbacks(|name| vars.get(name).map(ToString::to_string));

        assert_eq!(config.inference.api_key(), Some("g-key"));
        assert_eq!(config.gldas.username(), Some("alice"));
        assert_eq!(config.gldas.password(), Some("hunter2"));
        assert!(config.gldas.token().is_none());
    }

    #[test]
    fn configured_secrets_win_over_fallbacks() {
        let mut config = AppConfig::default();
        config.inference = config.inference.with_api_key("configured");
        config.apply_credential_fallbacks(|_| Some("fallback".to_string()));

        assert_eq!(config.inference.api_key(), Some("configured"));
        assert_eq!(config.gldas.token(), Some("fallback"));
    }

    #[test]
    fn serialization_never_leaks_secrets() {
        let mut config = AppConfig::default();
        config.apply_credential_fallbacks(|name| {
            (name != EARTHDATA_USERNAME_VAR).then(|| "s3cr3t".to_string())
        });
        assert_eq!(config.gldas.password(), Some("s3cr3t"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cr3t"));
        assert!(!format!("{config:?}").contains("s3cr3t"));
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..ServerConfig::default()
        };
        assert_eq!(server.bind_address(), "127.0.0.1:8080");
    }
}
