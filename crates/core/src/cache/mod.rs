//! SQLite-backed cache storage for worker buckets.
//!
//! This module provides persistent, named request -> response buckets using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Version-qualified buckets deleted as a unit
//! - Entries keyed by SHA-256 of the request identity
//! - All-or-nothing batch writes for install
//! - Automatic schema migrations and WAL mode

pub mod buckets;
pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::CacheStore;
