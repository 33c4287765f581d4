//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not a bare http(s) origin
    /// - `api_prefix` does not start with `/`
    /// - `cache_version` is 0 or the two store names collide
    /// - `max_bytes`, `timeout_ms` or `periodic_refresh_secs` are out of range
    ///
    /// Returns `ConfigError::Missing` if a required string is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.origin_url()?;
        if origin.path() != "/" || origin.query().is_some() {
            return Err(invalid("origin", "must not carry a path or query"));
        }

        if !self.api_prefix.starts_with('/') {
            return Err(invalid("api_prefix", "must start with '/'"));
        }

        if self.cache_version == 0 {
            return Err(invalid("cache_version", "must be at least 1"));
        }

        for (field, value) in [
            ("precache_name", &self.precache_name),
            ("runtime_name", &self.runtime_name),
            ("content_endpoint", &self.content_endpoint),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { field: field.into(), hint: "must not be empty".into() });
            }
        }

        if self.precache_store() == self.runtime_store() {
            return Err(invalid("runtime_name", "must differ from precache_name"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if let Some(secs) = self.periodic_refresh_secs
            && secs < 60
        {
            return Err(invalid("periodic_refresh_secs", "must be at least 60 seconds"));
        }

        if self.precache_urls.is_empty() {
            tracing::warn!("precache_urls is empty; install will create an empty precache store");
        }

        Ok(())
    }
}
