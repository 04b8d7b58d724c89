//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Cache bucket storage with SQLite backend
//! - Asset manifest and request classification
//! - Request/response values
//! - Storefront cart and wishlist state
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod manifest;
pub mod state;

pub use cache::{CacheDb, CacheStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{Request, Response, ResponseSource};
pub use manifest::{AssetClass, AssetManifest, BucketNames};
