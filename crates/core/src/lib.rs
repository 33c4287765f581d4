//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Named cache stores with a SQLite backend
//! - Request and response value types
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{ActivatedVersion, CacheDb, EntrySummary, RequestKey};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{InterceptedRequest, Response, ResponseKind};
