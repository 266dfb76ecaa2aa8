// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use blobfs::{FileSystemBridge, RenameOptions};

pub async fn mv_command(bridge: &FileSystemBridge, old_path: &str, new_path: &str, overwrite: bool) -> Result<()> {
    bridge
        .rename(old_path, new_path, RenameOptions { overwrite })
        .await?;
    Ok(())
}
