//! # Wiggle Query Cache
//!
//! A small keyed cache in front of the API client. It deduplicates
//! concurrent requests, serves fresh data without a request, keeps stale or
//! last-good data visible while refetching, and forgets unused entries.

pub mod client;
pub mod key;
pub mod options;
pub mod state;

// Re-export the core types to provide a clean public API.
pub use client::QueryClient;
pub use key::QueryKey;
pub use options::{DEFAULT_CACHE_TIME, DEFAULT_STALE_TIME, QueryOptions};
pub use state::QueryState;
