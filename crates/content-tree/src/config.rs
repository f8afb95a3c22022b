//! Browser configuration
//!
//! ```toml
//! [structured]
//! split_struct_arrays = true
//! struct_split_threshold = 5
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How struct arrays are presented by the structured-file adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructOptions {
    /// Show the elements of small struct arrays as separate children
    pub split_struct_arrays: bool,
    /// Largest struct array that is split; 0 never splits
    pub struct_split_threshold: usize,
}

impl Default for StructOptions {
    fn default() -> Self {
        Self {
            split_struct_arrays: true,
            struct_split_threshold: 5,
        }
    }
}

impl StructOptions {
    /// Returns true if a struct array of `numel` elements is shown element by element
    pub fn splits(&self, numel: usize) -> bool {
        self.split_struct_arrays
            && self.struct_split_threshold > 0
            && numel > 1
            && numel <= self.struct_split_threshold
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub structured: StructOptions,
}

/// Configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl BrowserConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
