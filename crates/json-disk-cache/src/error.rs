//! Error types for the JSON disk cache

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum CacheError {
    /// Invalid construction arguments
    Configuration(String),
    /// Key is absent or its entry is older than the requested TTL
    Miss { key: String },
    /// Key cannot be used as a file name component
    InvalidKey { key: String, reason: &'static str },
    StorageRead {
        path: PathBuf,
        source: std::io::Error,
    },
    StorageWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    Serialization(serde_json::Error),
    Deserialization {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl CacheError {
    /// Whether this is the expected "absent or expired" condition rather than a hard failure
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss { .. })
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            CacheError::Miss { key } => {
                write!(f, "Cache key does not exist or is expired: {}", key)
            }
            CacheError::InvalidKey { key, reason } => {
                write!(f, "Invalid cache key {:?}: {}", key, reason)
            }
            CacheError::StorageRead { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            CacheError::StorageWrite { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
            CacheError::Serialization(err) => write!(f, "Serialization error: {}", err),
            CacheError::Deserialization { path, source } => {
                write!(f, "Failed to decode {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::StorageRead { source, .. } => Some(source),
            CacheError::StorageWrite { source, .. } => Some(source),
            CacheError::Serialization(err) => Some(err),
            CacheError::Deserialization { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err)
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_miss_display() {
        let err = CacheError::Miss {
            key: "profile".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Cache key does not exist or is expired: profile"
        );
        assert!(err.is_miss());
    }

    #[test]
    fn test_configuration_error_display() {
        let err = CacheError::Configuration("expected a cache directory".to_string());
        assert_eq!(
            format!("{}", err),
            "Configuration error: expected a cache directory"
        );
        assert!(!err.is_miss());
    }

    #[test]
    fn test_storage_write_source() {
        let err = CacheError::StorageWrite {
            path: PathBuf::from("/missing/key.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };
        assert!(format!("{}", err).contains("/missing/key.json"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_key_has_no_source() {
        let err = CacheError::InvalidKey {
            key: "../etc".to_string(),
            reason: "contains a path separator",
        };
        assert!(err.source().is_none());
        assert!(format!("{:?}", err).contains("InvalidKey"));
    }
}
