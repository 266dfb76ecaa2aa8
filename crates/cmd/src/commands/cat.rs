// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::Result;
use blobfs::FileSystemBridge;

/// Copy a file's bytes to the output unchanged
pub async fn cat_command<W: Write>(bridge: &FileSystemBridge, path: &str, out: &mut W) -> Result<()> {
    let data = bridge.read_file(path).await?;
    out.write_all(&data)?;
    out.flush()?;
    Ok(())
}
