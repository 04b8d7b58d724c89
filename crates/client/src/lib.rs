//! Client side of swcache.
//!
//! This crate provides the network capability, the caching worker that
//! dispatches intercepted requests, and catalog loading for the storefront.

pub mod catalog;
pub mod fetch;
pub mod worker;

pub use catalog::{Catalog, load_catalog, try_load_catalog};
pub use fetch::{FetchConfig, HttpNetwork, Network};
pub use worker::{FetchOutcome, LifecycleState, ServiceWorker, WorkerConfig};
