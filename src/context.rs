//! Where on disk the data of this device lives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{instrument, warn};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
#[error("Could not determine device identifier: {0}")]
pub struct DeviceIdError(pub String);

/// Supplies the identifier that names this device's root folder.
pub trait DeviceIdentifier {
    fn device_id(&self) -> Result<String, DeviceIdError>;
}

/// The folder holding one file per record type. Resolved once at startup
/// and handed to the [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFolder {
    path: PathBuf,
    name: String,
}

impl RootFolder {
    /// Name the folder after the device, or after the configured fallback if
    /// the identifier is unavailable, and create it if needed.
    ///
    /// # Errors
    /// If the folder does not exist and can not be created.
    #[instrument(skip(ids))]
    pub fn resolve(config: &Config, ids: &impl DeviceIdentifier) -> io::Result<Self> {
        let name = match ids.device_id() {
            Ok(id) if !id.is_empty() => id,
            Ok(_) => {
                warn!("Device identifier is empty, using fallback folder");
                config.fallback_folder.clone()
            }
            Err(e) => {
                warn!("{e}, using fallback folder");
                config.fallback_folder.clone()
            }
        };
        Self::at(config.base_dir.join(&name))
    }

    /// Use an explicit folder, as a server does for an unpacked upload.
    ///
    /// # Errors
    /// If the folder does not exist and can not be created.
    pub fn at(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The device identifier (or fallback) naming this folder.
    pub fn name(&self) -> &str {
        &self.name
    }
}
