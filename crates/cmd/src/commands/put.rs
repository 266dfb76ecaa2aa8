// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::{Context, Result};
use blobfs::{FileSystemBridge, WriteOptions};
use bytes::Bytes;

/// Where the bytes for `put` come from
#[derive(Debug, Clone)]
pub enum PutSource {
    Content(String),
    HostFile(PathBuf),
}

impl PutSource {
    async fn read(self) -> Result<Bytes> {
        match self {
            PutSource::Content(text) => Ok(Bytes::from(text)),
            PutSource::HostFile(path) => {
                let data = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Bytes::from(data))
            }
        }
    }
}

/// Create a file, replacing an existing one only with `overwrite`
pub async fn put_command(bridge: &FileSystemBridge, path: &str, source: PutSource, overwrite: bool) -> Result<()> {
    let data = source.read().await?;
    let size = data.len();
    diagnostics::debug!("Writing {size} bytes to {path}", size: size, path: path);

    bridge
        .write_file(
            path,
            data,
            WriteOptions {
                create: true,
                overwrite,
            },
        )
        .await?;
    Ok(())
}
