// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use cmd::commands::{self, PutSource};
use cmd::common::open_bridge;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "blobfs")]
struct Cli {
    /// Storage config file (defaults to BLOBFS_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory
    Ls {
        /// Virtual path, e.g. "/acct/Blob Containers/c1/dir"
        path: String,
    },
    /// Show whether a path is a file or a directory
    Stat { path: String },
    /// Print a file to stdout
    Cat { path: String },
    /// Create a file
    Put {
        path: String,
        /// Literal file contents
        #[arg(long, conflicts_with = "from")]
        content: Option<String>,
        /// Host file to upload
        #[arg(long)]
        from: Option<PathBuf>,
        /// Replace the file if it exists
        #[arg(long)]
        overwrite: bool,
    },
    /// Create a directory
    Mkdir { path: String },
    /// Delete a file or directory
    Rm {
        path: String,
        /// Required for directories
        #[arg(short, long)]
        recursive: bool,
    },
    /// Move or rename (not supported by the storage model)
    Mv {
        old_path: String,
        new_path: String,
        #[arg(long)]
        overwrite: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let bridge = open_bridge(cli.config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Ls { path } => commands::ls_command(&bridge, &path, &mut out).await?,
        Commands::Stat { path } => commands::stat_command(&bridge, &path, &mut out).await?,
        Commands::Cat { path } => commands::cat_command(&bridge, &path, &mut out).await?,
        Commands::Put {
            path,
            content,
            from,
            overwrite,
        } => {
            let source = match (content, from) {
                (Some(text), None) => PutSource::Content(text),
                (None, Some(file)) => PutSource::HostFile(file),
                _ => bail!("put needs exactly one of --content or --from"),
            };
            commands::put_command(&bridge, &path, source, overwrite).await?;
        }
        Commands::Mkdir { path } => commands::mkdir_command(&bridge, &path).await?,
        Commands::Rm { path, recursive } => {
            commands::rm_command(&bridge, &path, recursive, &mut out).await?;
        }
        Commands::Mv {
            old_path,
            new_path,
            overwrite,
        } => commands::mv_command(&bridge, &old_path, &new_path, overwrite).await?,
    }

    out.flush()?;
    Ok(())
}
