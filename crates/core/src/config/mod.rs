//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding every cache store.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin of the page the worker is registered against.
    ///
    /// Set via SWCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path prefix that marks same-origin API calls.
    ///
    /// Set via SWCACHE_API_PREFIX environment variable.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Version suffix shared by both current store names.
    ///
    /// Bump it whenever the precache manifest changes.
    #[serde(default = "default_cache_version")]
    pub cache_version: u32,

    /// Logical name of the precache store.
    #[serde(default = "default_precache_name")]
    pub precache_name: String,

    /// Logical name of the runtime store.
    #[serde(default = "default_runtime_name")]
    pub runtime_name: String,

    /// Ordered manifest fetched and stored at install time.
    ///
    /// Relative entries resolve against `origin`. Set via TOML array or
    /// SWCACHE_PRECACHE_URLS (figment array syntax).
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Activate as soon as installation succeeds.
    ///
    /// Set via SWCACHE_SKIP_WAITING environment variable.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SWCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Endpoint re-fetched by the periodic content refresh.
    #[serde(default = "default_content_endpoint")]
    pub content_endpoint: String,

    /// Interval for the host-driven periodic refresh; unset disables it.
    ///
    /// Set via SWCACHE_PERIODIC_REFRESH_SECS environment variable.
    #[serde(default)]
    pub periodic_refresh_secs: Option<u64>,

    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    /// Body used when a push arrives without a payload.
    #[serde(default = "default_notification_body")]
    pub notification_body: String,

    #[serde(default = "default_notification_icon")]
    pub notification_icon: String,

    #[serde(default = "default_notification_badge")]
    pub notification_badge: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8000".into()
}

fn default_api_prefix() -> String {
    "/api/method/".into()
}

fn default_cache_version() -> u32 {
    1
}

fn default_precache_name() -> String {
    "iwex-website".into()
}

fn default_runtime_name() -> String {
    "iwex-runtime".into()
}

fn default_precache_urls() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/assets/iwex_website/css/styles.css",
        "/assets/iwex_website/js/main.js",
        "/assets/iwex_website/manifest.json",
        "https://cdn.tailwindcss.com",
        "https://unpkg.com/aos@2.3.1/dist/aos.css",
        "https://unpkg.com/aos@2.3.1/dist/aos.js",
        "https://unpkg.com/lucide@latest",
        "https://unpkg.com/vue@3/dist/vue.global.prod.js",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_content_endpoint() -> String {
    "/api/method/iwex_website.api.website.get_website_settings".into()
}

fn default_notification_title() -> String {
    "iWEX Infomatics".into()
}

fn default_notification_body() -> String {
    "New notification from iWEX".into()
}

fn default_notification_icon() -> String {
    "/assets/iwex_website/images/icon-192x192.png".into()
}

fn default_notification_badge() -> String {
    "/assets/iwex_website/images/icon-96x96.png".into()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            api_prefix: default_api_prefix(),
            cache_version: default_cache_version(),
            precache_name: default_precache_name(),
            runtime_name: default_runtime_name(),
            precache_urls: default_precache_urls(),
            skip_waiting: true,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            content_endpoint: default_content_endpoint(),
            periodic_refresh_secs: None,
            notification_title: default_notification_title(),
            notification_body: default_notification_body(),
            notification_icon: default_notification_icon(),
            notification_badge: default_notification_badge(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn periodic_refresh(&self) -> Option<Duration> {
        self.periodic_refresh_secs.map(Duration::from_secs)
    }

    /// Versioned name of the current precache store, e.g. `iwex-website-v1`.
    pub fn precache_store(&self) -> String {
        format!("{}-v{}", self.precache_name, self.cache_version)
    }

    /// Versioned name of the current runtime store, e.g. `iwex-runtime-v1`.
    pub fn runtime_store(&self) -> String {
        format!("{}-v{}", self.runtime_name, self.cache_version)
    }

    /// Parsed page origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin).map_err(|e| ConfigError::Invalid {
            field: "origin".into(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(url),
            _ => Err(ConfigError::Invalid { field: "origin".into(), reason: "must be an http(s) origin".into() }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./swcache.sqlite"));
        assert_eq!(config.api_prefix, "/api/method/");
        assert_eq!(config.user_agent, "swcache/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert!(config.skip_waiting);
        assert_eq!(config.precache_urls.len(), 10);
        assert_eq!(config.precache_urls[0], "/");
        assert!(config.periodic_refresh_secs.is_none());
    }

    #[test]
    fn test_store_names_are_versioned() {
        let config = AppConfig { cache_version: 3, ..Default::default() };
        assert_eq!(config.precache_store(), "iwex-website-v3");
        assert_eq!(config.runtime_store(), "iwex-runtime-v3");
    }

    #[test]
    fn test_origin_url() {
        let config = AppConfig { origin: "https://iwex.example".into(), ..Default::default() };
        assert_eq!(config.origin_url().unwrap().host_str(), Some("iwex.example"));

        let config = AppConfig { origin: "ftp://iwex.example".into(), ..Default::default() };
        assert!(config.origin_url().is_err());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.periodic_refresh(), None);
    }

    #[test]
    fn test_load_layers_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "swcache.toml",
                r#"
                origin = "https://iwex.example"
                cache_version = 2
                precache_urls = ["/", "/index.html"]
                "#,
            )?;
            jail.set_env("SWCACHE_CONFIG_FILE", "swcache.toml");
            jail.set_env("SWCACHE_CACHE_VERSION", "4");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.origin, "https://iwex.example");
            assert_eq!(config.cache_version, 4);
            assert_eq!(config.precache_urls, vec!["/", "/index.html"]);
            Ok(())
        });
    }
}
