//! Per-user persisted device configuration.
//!
//! The file is a JSON object keyed by input-device name. Each entry remembers how the device was
//! last mapped (a raw matrix or a window to re-resolve), the rotation, and its button bindings so
//! that `apply` can restore everything at login.

use crate::matrix::CoordinateMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = ".tablet-mapper.conf";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't determine home directory ($HOME is not set)")]
    NoHome,
    #[error("couldn't read config file '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("couldn't parse config file '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("couldn't write config file '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("couldn't serialize config")]
    Serialize(#[source] serde_json::Error),
}

/// How a device's active area was chosen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingKind {
    /// Apply the stored matrix as is.
    #[default]
    #[serde(rename = "transformation_matrix")]
    CoordinateMatrix,
    /// Re-resolve the named window and recompute.
    #[serde(rename = "window")]
    WindowName,
}

/// Saved state for a single input device.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    /// Button number -> `xsetwacom` action.
    #[serde(default)]
    pub buttons: BTreeMap<String, String>,
    #[serde(default)]
    pub coord_matrix: CoordinateMatrix,
    #[serde(default, alias = "widowName")]
    pub window_name: String,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub mapping_type: MappingKind,
    #[serde(default)]
    pub keep_aspect: bool,
}

/// Device name -> saved configuration.
pub type TabletMapperConfig = BTreeMap<String, InputConfig>;

/// `$HOME/.tablet-mapper.conf`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .ok_or(ConfigError::NoHome)?;
    Ok(Path::new(&home).join(CONFIG_FILE_NAME))
}

/// Explicit path if given, otherwise the per-user default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

pub fn read_config(path: &Path) -> Result<TabletMapperConfig, ConfigError> {
    debug!(path = %path.display(), "reading config");
    let buf = fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&buf).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the config, treating a missing file as empty. Parse errors are still reported.
pub fn read_config_or_default(path: &Path) -> Result<TabletMapperConfig, ConfigError> {
    match read_config(path) {
        Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no config file yet; starting empty");
            Ok(TabletMapperConfig::new())
        }
        other => other,
    }
}

/// Write the config pretty-printed with two-space indentation.
pub fn write_config(path: &Path, config: &TabletMapperConfig) -> Result<(), ConfigError> {
    let buf = serde_json::to_vec_pretty(config).map_err(ConfigError::Serialize)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, buf).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), devices = config.len(), "config written");
    Ok(())
}
