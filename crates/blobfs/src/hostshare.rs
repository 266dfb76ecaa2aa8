// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! File share backed by a directory on the host.

use crate::client::ShareClient;
use crate::error::{Error, Result};
use crate::listing::{ContinuationToken, ListingEntry, ListingPage, paginate};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

/// A share rooted at a host directory. Content types are not persisted.
#[derive(Debug, Clone)]
pub struct LocalShare {
    root: PathBuf,
}

impl LocalShare {
    /// The directory must already exist.
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::not_found(root.display().to_string()));
        }
        Ok(Self { root })
    }

    fn host_path(&self, path: &str) -> PathBuf {
        let mut host = self.root.clone();
        for seg in path.split('/').filter(|s| !s.is_empty()) {
            host.push(seg);
        }
        host
    }
}

/// Map an IO error, naming the share path rather than the host path.
fn io_error(err: std::io::Error, path: &str) -> Error {
    match err.kind() {
        std::io::ErrorKind::NotFound => Error::not_found(path),
        std::io::ErrorKind::AlreadyExists => Error::already_exists(path),
        _ => Error::Io(err),
    }
}

#[async_trait]
impl ShareClient for LocalShare {
    async fn list_directory(
        &self,
        dir: &str,
        token: Option<ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<ListingPage> {
        let host = self.host_path(dir);
        let mut read_dir = tokio::fs::read_dir(&host)
            .await
            .map_err(|e| io_error(e, dir))?;

        let mut children = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| io_error(e, dir))? {
            let Ok(name) = entry.file_name().into_string() else {
                diagnostics::warn!("Skipping non UTF-8 name in {dir}", dir: dir);
                continue;
            };
            let file_type = entry.file_type().await.map_err(|e| io_error(e, dir))?;
            if file_type.is_dir() {
                children.push(ListingEntry::directory(name));
            } else if file_type.is_file() {
                let size = entry.metadata().await.map_err(|e| io_error(e, dir))?.len();
                children.push(ListingEntry::file(name, size));
            }
        }

        let (entries, continuation_token) =
            paginate(children, |e| e.name.as_str(), token.as_ref(), max_results);
        Ok(ListingPage {
            entries,
            continuation_token,
        })
    }

    async fn get_file(&self, path: &str) -> Result<Bytes> {
        let data = tokio::fs::read(self.host_path(path))
            .await
            .map_err(|e| io_error(e, path))?;
        Ok(Bytes::from(data))
    }

    async fn put_file(&self, path: &str, data: Bytes, _content_type: &str) -> Result<()> {
        tokio::fs::write(self.host_path(path), &data)
            .await
            .map_err(|e| io_error(e, path))
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        tokio::fs::remove_file(self.host_path(path))
            .await
            .map_err(|e| io_error(e, path))
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        tokio::fs::create_dir(self.host_path(path))
            .await
            .map_err(|e| io_error(e, path))
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        tokio::fs::remove_dir(self.host_path(path))
            .await
            .map_err(|e| io_error(e, path))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        tokio::fs::try_exists(self.host_path(path))
            .await
            .map_err(|e| io_error(e, path))
    }
}
