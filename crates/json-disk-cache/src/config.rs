use crate::error::{CacheError, Result};
use std::path::PathBuf;

/// Extension appended to every key to form its file name
pub const DEFAULT_EXTENSION: &str = ".json";

/// Cache configuration: where entries live and how their files are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub extension: String,
}

impl CacheConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Check the configuration without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(CacheError::Configuration(
                "Expected a cache directory".to_string(),
            ));
        }
        if self.extension.len() < 2 || !self.extension.starts_with('.') {
            return Err(CacheError::Configuration(format!(
                "Cache extension must start with '.': {:?}",
                self.extension
            )));
        }
        if self.extension.contains(['/', '\\', '\0']) {
            return Err(CacheError::Configuration(format!(
                "Cache extension must not contain path separators: {:?}",
                self.extension
            )));
        }
        Ok(())
    }
}
