// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Result, bail};
use blobfs::{DeleteOptions, FileSystemBridge};

/// Delete a file or directory, printing each removed path. Fails after the
/// walk if any child could not be removed.
pub async fn rm_command<W: Write>(
    bridge: &FileSystemBridge,
    path: &str,
    recursive: bool,
    out: &mut W,
) -> Result<()> {
    let report = bridge.delete(path, DeleteOptions { recursive }).await?;

    for deleted in &report.deleted {
        writeln!(out, "removed {deleted}")?;
    }
    for failure in &report.failures {
        writeln!(out, "failed {}: {}", failure.path, failure.message)?;
    }

    if !report.is_complete() {
        let failed = report.failures.len();
        bail!("{failed} entries under {path} could not be removed");
    }
    Ok(())
}
