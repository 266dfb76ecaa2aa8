// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use blobfs::FileSystemBridge;

pub async fn mkdir_command(bridge: &FileSystemBridge, path: &str) -> Result<()> {
    diagnostics::debug!("Creating directory {path}", path: path);

    bridge.create_directory(path).await?;

    diagnostics::info!("Directory created successfully: {path}", path: path);
    Ok(())
}
