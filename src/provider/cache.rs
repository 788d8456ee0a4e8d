//! On-disk copies of API documents

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::core::config::ProviderConfig;
use crate::core::error::{CourierError, Result};

/// Refreshable cache directory backed by a read-only bundled directory
#[derive(Debug, Clone)]
pub struct DiskCache {
    cache_dir: PathBuf,
    fallback_dir: PathBuf,
}

impl DiskCache {
    pub fn new(cache_dir: impl Into<PathBuf>, fallback_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            fallback_dir: fallback_dir.into(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.cache_dir.clone(), config.fallback_dir.clone())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Read `file` from the cache, else from the bundled fallback
    pub fn read(&self, file: &str) -> Result<Value> {
        for dir in [&self.cache_dir, &self.fallback_dir] {
            let path = dir.join(file);
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    tracing::debug!("Read {} from {}", file, dir.display());
                    return Ok(serde_json::from_str(&content)?);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(CourierError::CacheMiss(file.to_string()))
    }

    /// Store a fresh copy in the cache directory
    pub fn write(&self, file: &str, value: &Value) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir)?;
        std::fs::write(self.cache_dir.join(file), serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}
