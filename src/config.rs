use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

const APP_DIR: &str = "court_vision";
const DB_FILE: &str = "court_vision.sqlite";

pub const DEFAULT_BASE_URL: &str = "https://www.cbbdata.com/api";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub db_path: PathBuf,
}

impl Config {
    /// Reads the process environment. Call `dotenvy` first if `.env` files
    /// should count.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_blank("CBBDATA_API_KEY").ok_or_else(|| {
            Error::config(
                "CBBDATA_API_KEY is not set. Register with cbbdata and add the key to .env",
            )
        })?;
        let base_url = non_blank("CBBDATA_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = non_blank("CBBDATA_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(5, 120);
        let db_path = non_blank("COURT_VISION_DB")
            .map(PathBuf::from)
            .or_else(|| default_db_path_from(&lookup))
            .ok_or_else(|| {
                Error::config("no database location: set COURT_VISION_DB or HOME")
            })?;

        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            db_path,
        })
    }
}

fn default_db_path_from(lookup: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    app_cache_dir_from(lookup).map(|dir| dir.join(DB_FILE))
}

fn app_cache_dir_from(lookup: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Some(base) = lookup("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = lookup("HOME")?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_configuration_error() {
        let err = Config::from_lookup(lookup(&[("HOME", "/home/u")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = Config::from_lookup(lookup(&[("CBBDATA_API_KEY", "  "), ("HOME", "/h")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn missing_store_location_is_configuration_error() {
        let err = Config::from_lookup(lookup(&[("CBBDATA_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn defaults_and_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("CBBDATA_API_KEY", "secret"),
            ("XDG_CACHE_HOME", "/tmp/xdg"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(20));
        assert_eq!(
            cfg.db_path,
            PathBuf::from("/tmp/xdg/court_vision/court_vision.sqlite")
        );

        let cfg = Config::from_lookup(lookup(&[
            ("CBBDATA_API_KEY", "secret"),
            ("CBBDATA_BASE_URL", "http://localhost:9000/api/"),
            ("CBBDATA_TIMEOUT_SECS", "1"),
            ("COURT_VISION_DB", "/data/cv.sqlite"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, "http://localhost:9000/api");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.db_path, PathBuf::from("/data/cv.sqlite"));
    }
}
