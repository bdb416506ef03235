//! Allocation strategy configuration.
//!
//! Defaults work without any configuration file. With the `config` feature
//! enabled, settings can also be read from TOML:
//!
//! ```toml
//! strategy = "auto"
//! mmap_threshold = 65536
//! advice = "sequential"
//! ```

use crate::allocation::mapped::AccessAdvice;
#[cfg(feature = "config")]
use crate::error::{AllocationError, Result};
#[cfg(feature = "config")]
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which backing store the factory should use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "kebab-case"))]
pub enum Strategy {
    /// Map when supported and worthwhile, copy otherwise, copy again if mapping fails
    #[default]
    Auto,
    /// Always map; no fallback
    Mapped,
    /// Always copy
    Copied,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Strategy::Auto),
            "mapped" | "mmap" => Ok(Strategy::Mapped),
            "copied" | "copy" => Ok(Strategy::Copied),
            other => Err(format!(
                "unknown strategy '{}', expected auto, mapped or copied",
                other
            )),
        }
    }
}

/// Settings consumed by [`AllocationFactory`](crate::allocation::AllocationFactory)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct AllocationConfig {
    pub strategy: Strategy,

    /// Files smaller than this are copied under [`Strategy::Auto`]
    pub mmap_threshold: u64,

    /// Advice applied to mapped regions
    pub advice: AccessAdvice,
}

impl AllocationConfig {
    /// Default size at which [`Strategy::Auto`] switches from copying to mapping
    pub const DEFAULT_MMAP_THRESHOLD: u64 = 64 * 1024; // 64KB

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    pub fn with_advice(mut self, advice: AccessAdvice) -> Self {
        self.advice = advice;
        self
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            mmap_threshold: Self::DEFAULT_MMAP_THRESHOLD,
            advice: AccessAdvice::Normal,
        }
    }
}

#[cfg(feature = "config")]
impl AllocationConfig {
    /// Parse configuration from TOML text; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AllocationError::config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AllocationError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Location of the per-user configuration file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("modelbytes").join("config.toml"))
    }

    /// Load the per-user configuration file, falling back to defaults if absent
    pub fn discover() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}
