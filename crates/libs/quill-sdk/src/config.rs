use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_MS;
use crate::error::SdkError;

/// Client-side settings for schema caching and payload assembly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub schema_cache_ttl_ms: u64,
    pub chain_id: String,
    /// Skip schema validation; used when no schema endpoint is reachable.
    pub private_mode: bool,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            schema_cache_ttl_ms: DEFAULT_TTL_MS,
            chain_id: String::new(),
            private_mode: false,
        }
    }
}

impl SdkConfig {
    pub fn from_toml(input: &str) -> Result<Self, SdkError> {
        let config: Self = toml::from_str(input).map_err(|err| SdkError::config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|err| SdkError::config(format!("{}: {err}", path.display())))?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        if self.schema_cache_ttl_ms == 0 {
            return Err(SdkError::config("schema_cache_ttl_ms must be greater than zero"));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.schema_cache_ttl_ms)
    }
}
