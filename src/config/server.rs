//! HTTP server settings.

use crate::{
    config::{parsed_var_or, var_or},
    errors::Result,
};
use std::path::PathBuf;

/// Where and how the kiosk web application listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind (`HOST`)
    pub host: String,
    /// TCP port (`PORT`)
    pub port: u16,
    /// Grade shown when a request carries no `grado` (`DEFAULT_GRADE`)
    pub default_grade: i64,
    /// Reference-data seed file (`KIOSK_CATALOG`)
    pub catalog_path: PathBuf,
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `DEFAULT_GRADE` and `KIOSK_CATALOG` from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: var_or(&lookup, "HOST", "localhost"),
            port: parsed_var_or(&lookup, "PORT", 3200)?,
            default_grade: parsed_var_or(&lookup, "DEFAULT_GRADE", 1)?,
            catalog_path: PathBuf::from(var_or(&lookup, "KIOSK_CATALOG", "kiosk.toml")),
        })
    }

    /// `host:port` as accepted by `TcpListener::bind`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.bind_address(), "localhost:3200");
        assert_eq!(config.default_grade, 1);
        assert_eq!(config.catalog_path, PathBuf::from("kiosk.toml"));
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = ServerConfig::from_lookup(|key| match key {
            "HOST" => Some("0.0.0.0".to_string()),
            "PORT" => Some("8080".to_string()),
            "DEFAULT_GRADE" => Some("0".to_string()),
            "KIOSK_CATALOG" => Some("  ".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.default_grade, 0);
        assert_eq!(config.catalog_path, PathBuf::from("kiosk.toml"));
    }

    #[test]
    fn test_invalid_port() {
        let result = ServerConfig::from_lookup(|key| (key == "PORT").then(|| "99999".to_string()));
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }
}
