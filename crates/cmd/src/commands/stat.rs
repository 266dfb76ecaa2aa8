// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::Result;
use blobfs::FileSystemBridge;

pub async fn stat_command<W: Write>(bridge: &FileSystemBridge, path: &str, out: &mut W) -> Result<()> {
    let stat = bridge.stat(path).await?;
    writeln!(out, "{path}: {}", stat.kind)?;
    Ok(())
}
