//! File-based JSON value caching keyed by file name

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::types::{CacheEntry, CacheStats};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// A cache storing one JSON file per key in a flat directory.
///
/// Freshness comes from the file's mtime, so a TTL is supplied per call
/// rather than stored with the entry. The directory must already exist;
/// it is never created. Concurrent writers to the same key are not
/// coordinated and the last write wins.
#[derive(Debug)]
pub struct DiskCache {
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

impl DiskCache {
    /// Create a cache over `dir` storing entries as `<key>.json`
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(CacheConfig::new(dir))
    }

    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    pub fn extension(&self) -> &str {
        &self.config.extension
    }

    /// File path backing `key`: `<dir>/<key><extension>`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self
            .config
            .dir
            .join(format!("{}{}", key, self.config.extension)))
    }

    /// Stat the entry for `key`, `None` if no file exists
    pub async fn entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let path = self.path_for(key)?;
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::StorageRead { path, source }),
        };
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(source) => return Err(CacheError::StorageRead { path, source }),
        };

        Ok(Some(CacheEntry {
            path,
            size: metadata.len(),
            modified_at: DateTime::<Utc>::from(modified),
        }))
    }

    /// Whether `key` has an entry that is younger than `ttl`.
    ///
    /// Without a TTL (or with a zero TTL) any existing entry counts. Stat
    /// failures of any kind, including an invalid key, report `false`.
    pub async fn exists(&self, key: &str, ttl: Option<Duration>) -> bool {
        let entry = match self.entry(key).await {
            Ok(Some(entry)) => entry,
            _ => return false,
        };

        let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) else {
            return true;
        };

        let now = Utc::now();
        let fresh = entry.is_fresh(ttl, now);
        if !fresh {
            debug!(
                key = %key,
                age = ?entry.age(now),
                ttl = ?ttl,
                "Cache entry expired"
            );
        }
        fresh
    }

    /// Serialize `value` into the entry for `key`, replacing any previous
    /// content, and hand the value back.
    ///
    /// The write is not atomic: a crash mid-write can leave a truncated file,
    /// which later reads report as a decode error.
    pub async fn write<T: Serialize>(&self, key: &str, value: T) -> Result<T> {
        let path = self.path_for(key)?;
        let json = serde_json::to_string(&value)?;
        let size = json.len();

        if let Err(source) = fs::write(&path, json).await {
            return Err(CacheError::StorageWrite { path, source });
        }

        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, size, "Cached value");
        Ok(value)
    }

    /// Read and decode the entry for `key` if it exists and is younger than `ttl`
    pub async fn read<T: DeserializeOwned>(&self, key: &str, ttl: Option<Duration>) -> Result<T> {
        let path = self.path_for(key)?;

        if !self.exists(key, ttl).await {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
            return Err(CacheError::Miss {
                key: key.to_string(),
            });
        }

        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(source) => return Err(CacheError::StorageRead { path, source }),
        };
        let value = match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(source) => return Err(CacheError::Deserialization { path, source }),
        };

        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Cache hit");
        Ok(value)
    }

    /// Return the stored value for `key`, or run `producer` and store its result.
    ///
    /// Any stored entry is accepted regardless of age. An entry that cannot be
    /// read or decoded is replaced. A producer error is returned as-is and
    /// nothing is written.
    pub async fn ensure<T, E, F, Fut>(&self, key: &str, producer: F) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.read_or_produce(key, None, producer).await
    }

    /// Like [`DiskCache::ensure`], but an entry older than `ttl` is produced again
    pub async fn ensure_fresh<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.read_or_produce(key, Some(ttl), producer).await
    }

    async fn read_or_produce<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        // An unusable key would only fail after the producer ran
        self.path_for(key)?;

        match self.read(key, ttl).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_miss() => {
                debug!(key = %key, "Producing value for missing cache entry");
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Unreadable cache entry, producing a new value");
            }
        }

        let value = producer().await?;
        Ok(self.write(key, value).await?)
    }

    /// Delete the entry for `key`, returning whether one existed
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %key, "Removed cache entry");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::StorageWrite { path, source }),
        }
    }

    /// Delete every entry file in the cache directory.
    ///
    /// Only regular files ending with the cache extension are touched.
    pub async fn clear(&self) -> Result<usize> {
        let dir = &self.config.dir;
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(source) => {
                return Err(CacheError::StorageRead {
                    path: dir.clone(),
                    source,
                })
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(CacheError::StorageRead {
                        path: dir.clone(),
                        source,
                    })
                }
            };

            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            let extension = self.config.extension.as_str();
            let is_entry = entry.file_name().to_str().is_some_and(|name| {
                name.len() > extension.len() && name.ends_with(extension)
            });
            if !is_file || !is_entry {
                continue;
            }

            let path = entry.path();
            if let Err(source) = fs::remove_file(&path).await {
                return Err(CacheError::StorageWrite { path, source });
            }
            removed += 1;
        }

        debug!(dir = ?dir, removed, "Cleared cache");
        Ok(removed)
    }

    /// Get current cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

/// Keys are used verbatim as file name stems, so anything that would escape
/// the cache directory is rejected.
fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "key is empty"
    } else if key == "." || key == ".." {
        "key is a relative path segment"
    } else if key.contains(['/', '\\']) {
        "key contains a path separator"
    } else if key.contains('\0') {
        "key contains a NUL byte"
    } else {
        return Ok(());
    };

    Err(CacheError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}
