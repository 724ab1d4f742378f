use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::decode::DEFAULT_READ_BUFFER;

/// Folder used when the device identifier can not be read.
pub const DEFAULT_FALLBACK_FOLDER: &str = "NO_IMEI";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The per device root folder is created inside this directory.
    pub base_dir: PathBuf,
    pub fallback_folder: String,
    /// Size in bytes of the buffer used while decoding a file.
    pub read_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("data"),
            fallback_folder: DEFAULT_FALLBACK_FOLDER.to_owned(),
            read_buffer: DEFAULT_READ_BUFFER,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config is not valid ron: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Read buffer can not be zero bytes")]
    ZeroReadBuffer,
    #[error("Fallback folder name can not be empty")]
    EmptyFallback,
}

impl Config {
    /// Missing fields take their default.
    ///
    /// # Errors
    /// If `s` is not a valid ron encoded config.
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        let config: Config = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// If the file can not be read or is not a valid ron encoded config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_ron(&s)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.read_buffer == 0 {
            return Err(ConfigError::ZeroReadBuffer);
        }
        if self.fallback_folder.is_empty() {
            return Err(ConfigError::EmptyFallback);
        }
        Ok(())
    }
}
