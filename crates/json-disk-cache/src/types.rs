//! Cache types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Metadata for a stored entry, taken from the filesystem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub path: PathBuf,
    pub size: u64,
    /// Last-modified time of the entry file
    pub modified_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry is still fresh at `now` for the given TTL.
    ///
    /// Fresh means `modified_at + ttl > now`. A deadline that cannot be
    /// represented is treated as never reached.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return true;
        };
        match self.modified_at.checked_add_signed(ttl) {
            Some(deadline) => deadline > now,
            None => true,
        }
    }

    /// Age of the entry at `now`, zero if the mtime lies in the future
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.modified_at).to_std().unwrap_or_default()
    }
}

/// In-process counters for a cache handle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(modified_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry {
            path: PathBuf::from("/cache/key.json"),
            size: 6,
            modified_at,
        }
    }

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.writes, 0);
    }

    #[test]
    fn test_is_fresh_within_ttl() {
        let now = Utc::now();
        let entry = entry_at(now - chrono::Duration::milliseconds(500));
        assert!(entry.is_fresh(Duration::from_millis(9000), now));
    }

    #[test]
    fn test_is_stale_after_ttl() {
        let now = Utc::now();
        let entry = entry_at(now - chrono::Duration::milliseconds(500));
        assert!(!entry.is_fresh(Duration::from_millis(1), now));
    }

    #[test]
    fn test_deadline_equal_to_now_is_stale() {
        let now = Utc::now();
        let entry = entry_at(now - chrono::Duration::milliseconds(100));
        assert!(!entry.is_fresh(Duration::from_millis(100), now));
    }

    #[test]
    fn test_unrepresentable_deadline_is_fresh() {
        let now = Utc::now();
        let entry = entry_at(now);
        assert!(entry.is_fresh(Duration::MAX, now));
    }

    #[test]
    fn test_age() {
        let now = Utc::now();
        let entry = entry_at(now - chrono::Duration::seconds(3));
        assert_eq!(entry.age(now), Duration::from_secs(3));

        let future = entry_at(now + chrono::Duration::seconds(3));
        assert_eq!(future.age(now), Duration::ZERO);
    }

    #[test]
    fn test_cache_entry_serialization() {
        let entry = entry_at(Utc::now());
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("key.json"));

        let deserialized: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.size, entry.size);
        assert_eq!(deserialized.modified_at, entry.modified_at);
    }
}
