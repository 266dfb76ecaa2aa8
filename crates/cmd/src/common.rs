// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use blobfs::{ConfiguredResolver, FileSystemBridge, StorageConfig};

/// Environment variable naming the storage configuration file
pub const CONFIG_ENV: &str = "BLOBFS_CONFIG";

/// Get the config path with an optional override, falling back to BLOBFS_CONFIG
pub fn get_config_path_with_override(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }

    env::var(CONFIG_ENV)
        .map_err(|_| anyhow!("{CONFIG_ENV} environment variable not set"))
        .map(PathBuf::from)
}

/// Build a bridge over the roots described by the configuration file
pub fn open_bridge(override_path: Option<PathBuf>) -> Result<FileSystemBridge> {
    let path = get_config_path_with_override(override_path)?;
    let config = StorageConfig::load(&path)
        .with_context(|| format!("Failed to load storage config {}", path.display()))?;
    Ok(bridge_for(config))
}

#[must_use]
pub fn bridge_for(config: StorageConfig) -> FileSystemBridge {
    let options = config.bridge_options();
    FileSystemBridge::with_options(Arc::new(ConfiguredResolver::new(config)), options)
}
