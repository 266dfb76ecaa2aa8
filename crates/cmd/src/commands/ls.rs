// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::Result;
use blobfs::FileSystemBridge;

/// List the direct children of a directory, one per line. Directories get a
/// trailing slash.
pub async fn ls_command<W: Write>(bridge: &FileSystemBridge, path: &str, out: &mut W) -> Result<()> {
    diagnostics::debug!("Listing {path}", path: path);

    for (name, kind) in bridge.read_directory(path).await? {
        if kind.is_dir() {
            writeln!(out, "{name}/")?;
        } else {
            writeln!(out, "{name}")?;
        }
    }
    Ok(())
}
