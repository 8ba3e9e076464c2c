//! File-based JSON value cache with TTL expiration
//!
//! Stores serde-serializable values as one JSON file per key in a flat
//! directory. Freshness is judged from each file's mtime against a TTL given
//! per call, and `ensure` offers read-through memoization.
//!
//! ```no_run
//! use json_disk_cache::{CacheError, DiskCache};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), CacheError> {
//! let cache = DiskCache::new("/var/cache/app")?;
//! let names: Vec<String> = cache
//!     .ensure("names", || async { Ok::<_, CacheError>(vec!["oak".to_string()]) })
//!     .await?;
//! let fresh = cache.exists("names", Some(Duration::from_millis(9000))).await;
//! # let _ = (names, fresh);
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod error;
mod types;

pub use cache::DiskCache;
pub use config::{CacheConfig, DEFAULT_EXTENSION};
pub use error::{CacheError, Result};
pub use types::{CacheEntry, CacheStats};
