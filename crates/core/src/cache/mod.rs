//! SQLite-backed named cache stores.
//!
//! This module provides persistent request -> response stores using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named stores enumerated in creation order
//! - SHA-256 request keys (method + URL)
//! - Atomic multi-entry writes
//! - The activated store generation, so a restart resumes control
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod state;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::EntrySummary;
pub use hash::RequestKey;
pub use state::ActivatedVersion;
