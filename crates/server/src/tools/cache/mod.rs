//! Cache inspection tools.
//!
//! This module provides tools for listing and deleting cache buckets.

pub mod delete;
pub mod list;

pub use delete::{CacheDeleteParams, delete_impl};
pub use list::{CacheListParams, list_impl};
