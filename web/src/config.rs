//! Server configuration
//!
//! Everything comes from environment variables:
//!
//! | Variable        | Default       | Meaning                                   |
//! |-----------------|---------------|-------------------------------------------|
//! | `APP_ENV`       | `development` | `development` or `production`             |
//! | `PORT`          | `5173`        | Listen port                               |
//! | `BASE`          | `/`           | Path prefix the storefront is served under |
//! | `API_BASE_URL`  | unset         | Product API; unset uses the sample catalog |
//! | `TEMPLATE_PATH` | unset         | HTML template; unset uses the built-in one |
//!
//! # Example
//!
//! ```no_run
//! use storefront_web::config::ServerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! println!("Listening on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use storefront_products::ssr::DEFAULT_TEMPLATE;
use thiserror::Error;

/// Default listen port
pub const DEFAULT_PORT: u16 = 5173;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `APP_ENV` is not a known environment
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// `PORT` is not a port number
    #[error("Invalid port {value:?}: {source}")]
    InvalidPort {
        /// Raw value
        value: String,
        /// Parse failure
        #[source]
        source: std::num::ParseIntError,
    },

    /// `BASE` is not an absolute path
    #[error("Invalid base path {0:?}: must start with '/'")]
    InvalidBase(String),

    /// The template could not be read
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        /// Template location
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The template lacks a placeholder the renderer fills
    #[error("Template {path} is missing {placeholder}")]
    TemplatePlaceholder {
        /// Template location
        path: PathBuf,
        /// Missing placeholder
        placeholder: &'static str,
    },
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production
    Production,
}

impl Environment {
    /// Check if this is production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Default `tracing` filter when `RUST_LOG` is not set
    #[must_use]
    pub const fn default_log_filter(self) -> &'static str {
        match self {
            Self::Development => {
                "storefront_web=debug,storefront_products=debug,storefront_runtime=info,tower_http=debug"
            }
            Self::Production => "storefront_web=info,storefront_products=info,storefront_runtime=warn",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// SSR server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Listen port
    pub port: u16,
    /// Path prefix, always starting and ending with `/`
    pub base: String,
    /// Product API base URL; `None` serves the sample catalog
    pub api_base_url: Option<String>,
    /// HTML template file; `None` uses the built-in template
    pub template_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            port: DEFAULT_PORT,
            base: "/".to_string(),
            api_base_url: None,
            template_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let environment = var("APP_ENV")
            .map(|value| value.parse())
            .transpose()?
            .unwrap_or(defaults.environment);

        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => defaults.port,
        };

        let base = match var("BASE") {
            Some(value) => normalize_base(&value)?,
            None => defaults.base,
        };

        Ok(Self {
            environment,
            port,
            base,
            api_base_url: var("API_BASE_URL"),
            template_path: var("TEMPLATE_PATH").map(PathBuf::from),
        })
    }

    /// Address to listen on
    #[must_use]
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Read the HTML template
    ///
    /// # Errors
    ///
    /// Returns error if the configured file cannot be read or lacks the
    /// head or body placeholder
    pub fn load_template(&self) -> Result<String, ConfigError> {
        use storefront_products::ssr::{HEAD_PLACEHOLDER, HTML_PLACEHOLDER};

        let Some(path) = &self.template_path else {
            return Ok(DEFAULT_TEMPLATE.to_string());
        };

        let template = std::fs::read_to_string(path).map_err(|source| ConfigError::TemplateRead {
            path: path.clone(),
            source,
        })?;

        for placeholder in [HEAD_PLACEHOLDER, HTML_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(ConfigError::TemplatePlaceholder {
                    path: path.clone(),
                    placeholder,
                });
            }
        }

        Ok(template)
    }
}

/// `shop` is rejected, `/shop` becomes `/shop/`
fn normalize_base(base: &str) -> Result<String, ConfigError> {
    let base = base.trim();
    if !base.starts_with('/') {
        return Err(ConfigError::InvalidBase(base.to_string()));
    }
    Ok(format!("{}/", base.trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address().port(), 5173);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("APP_ENV", "prod"),
            ("PORT", "8080"),
            ("BASE", "/front/vanilla"),
            ("API_BASE_URL", "http://api.internal"),
        ])
        .unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.port, 8080);
        assert_eq!(config.base, "/front/vanilla/");
        assert_eq!(config.api_base_url.as_deref(), Some("http://api.internal"));
    }

    #[test]
    fn test_empty_values_fall_back() {
        let config = config(&[("PORT", ""), ("API_BASE_URL", " ")]).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.api_base_url.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("APP_ENV", "staging")]),
            Err(ConfigError::InvalidEnvironment(_))
        ));
        assert!(matches!(
            config(&[("PORT", "http")]),
            Err(ConfigError::InvalidPort { .. })
        ));
        assert!(matches!(
            config(&[("BASE", "shop")]),
            Err(ConfigError::InvalidBase(_))
        ));
    }

    #[test]
    fn test_template_defaults_to_builtin() {
        let template = ServerConfig::default().load_template().unwrap();

        assert_eq!(template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_missing_template_file() {
        let config = ServerConfig {
            template_path: Some(PathBuf::from("/nonexistent/index.html")),
            ..ServerConfig::default()
        };

        assert!(matches!(
            config.load_template(),
            Err(ConfigError::TemplateRead { .. })
        ));
    }
}
