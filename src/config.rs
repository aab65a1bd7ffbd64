// src/config.rs

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::errors::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SHELL_PATH: &str = "static/admin.html";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_api_url: Url,
    pub host: IpAddr,
    pub port: u16,
    pub shell_path: PathBuf,
    pub cache_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_api_url = lookup("CATALOG_API_URL")
            .ok_or_else(|| AppError::Config("CATALOG_API_URL must be set".to_string()))?;
        let catalog_api_url = Url::parse(&raw_api_url).map_err(|e| {
            AppError::Config(format!("CATALOG_API_URL '{}' is not a valid URL: {}", raw_api_url, e))
        })?;

        let host = match lookup("APP_HOST") {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|_| AppError::Config(format!("APP_HOST '{}' is not an IP address", raw)))?,
            None => DEFAULT_HOST
                .parse()
                .map_err(|_| AppError::Config("Invalid default host".to_string()))?,
        };

        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("APP_PORT '{}' must be a valid port", raw)))?,
            None => DEFAULT_PORT,
        };

        let shell_path = lookup("ADMIN_SHELL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SHELL_PATH));

        let cache_ttl_secs = match lookup("QUERY_CACHE_TTL_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("QUERY_CACHE_TTL_SECS '{}' must be a number", raw))
            })?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            catalog_api_url,
            host,
            port,
            shell_path,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_api_url_is_set() {
        let config =
            AppConfig::from_lookup(lookup(&[("CATALOG_API_URL", "http://catalog:8080/api")]))
                .unwrap();
        assert_eq!(config.catalog_api_url.as_str(), "http://catalog:8080/api");
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.shell_path, PathBuf::from("static/admin.html"));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn missing_api_url_is_a_config_error() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("CATALOG_API_URL", "http://catalog"),
            ("APP_PORT", "http"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("APP_PORT")));
    }
}
