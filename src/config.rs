//! Runtime configuration.
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file), falling back to defaults that match the usual working-directory
//! layout (`data/<spacecraft>/` for datasets).

use std::path::PathBuf;
use std::time::Duration;

use crate::error::HelioError;

pub const DEFAULT_CDAWEB_URL: &str = "https://cdaweb.gsfc.nasa.gov/WS/cdasr/1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ENV_DATA_DIR: &str = "HELIO_DATA_DIR";
const ENV_CACHE_DIR: &str = "HELIO_CACHE_DIR";
const ENV_CDAWEB_URL: &str = "HELIO_CDAWEB_URL";
const ENV_TIMEOUT: &str = "HELIO_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct HelioConfig {
    /// Root for downloaded datasets; files land in `<data_dir>/<spacecraft>/`.
    pub data_dir: PathBuf,
    /// Root for cached remote files (SPICE kernels).
    pub cache_dir: PathBuf,
    /// Base URL of the CDAWeb REST service.
    pub cdaweb_base_url: String,
    /// Timeout applied to every HTTP request.
    pub http_timeout: Duration,
}

impl Default for HelioConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache_dir: PathBuf::from(".helio-cache"),
            cdaweb_base_url: DEFAULT_CDAWEB_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl HelioConfig {
    pub fn from_env() -> Result<Self, HelioError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HelioError> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|v| !v.trim().is_empty()) {
            config.cache_dir = PathBuf::from(dir.trim());
        }
        if let Some(url) = lookup(ENV_CDAWEB_URL).filter(|v| !v.trim().is_empty()) {
            config.cdaweb_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                HelioError::Config(format!("{ENV_TIMEOUT} must be a whole number of seconds, got '{raw}'"))
            })?;
            if secs == 0 {
                return Err(HelioError::Config(format!("{ENV_TIMEOUT} must be > 0")));
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn kernel_dir(&self) -> PathBuf {
        self.cache_dir.join("kernels")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = HelioConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, HelioConfig::default());
        assert_eq!(config.http_timeout, Duration::from_secs(120));
        assert_eq!(config.kernel_dir(), PathBuf::from(".helio-cache/kernels"));
    }

    #[test]
    fn environment_overrides() {
        let config = HelioConfig::from_lookup(lookup_from(&[
            ("HELIO_DATA_DIR", "/tmp/helio"),
            ("HELIO_CDAWEB_URL", "http://localhost:8080/cdas/"),
            ("HELIO_HTTP_TIMEOUT_SECS", " 15 "),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/helio"));
        assert_eq!(config.cdaweb_base_url, "http://localhost:8080/cdas");
        assert_eq!(config.http_timeout, Duration::from_secs(15));
    }

    #[test]
    fn malformed_timeout_is_config_error() {
        let err = HelioConfig::from_lookup(lookup_from(&[("HELIO_HTTP_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, HelioError::Config(_)));

        let err = HelioConfig::from_lookup(lookup_from(&[("HELIO_HTTP_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, HelioError::Config(_)));
    }
}
