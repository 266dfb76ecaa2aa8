// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Remote primitives the bridge is built on.
//!
//! Implementations classify their own failures into `NotFound` /
//! `AlreadyExists` where they can and report everything else as
//! [`Error::Backend`](crate::Error::Backend).

use crate::error::Result;
use crate::listing::{ContinuationToken, ListingPage};
use async_trait::async_trait;
use bytes::Bytes;

/// One blob returned by a flat listing, keyed by its full name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobItem {
    pub name: String,
    pub size: u64,
}

/// Raw result of one flat listing call.
///
/// `blobs` are the objects directly under the prefix and `prefixes` the
/// folded sub-prefixes (each ending with the delimiter). Both carry full
/// names, not names relative to the listed prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobListing {
    pub blobs: Vec<BlobItem>,
    pub prefixes: Vec<String>,
    pub continuation_token: Option<ContinuationToken>,
}

/// Flat-namespace (blob container) primitives
#[async_trait]
pub trait BlobClient: Send + Sync {
    /// List one page of blobs and sub-prefixes directly under `prefix`.
    async fn list_blobs(
        &self,
        prefix: &str,
        delimiter: &str,
        token: Option<ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<BlobListing>;

    async fn get(&self, path: &str) -> Result<Bytes>;

    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;

    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Shallow-hierarchy (file share) primitives.
///
/// Paths are relative to the share root; the empty string is the root.
#[async_trait]
pub trait ShareClient: Send + Sync {
    /// List one page of the files and subdirectories of `dir`.
    async fn list_directory(
        &self,
        dir: &str,
        token: Option<ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<ListingPage>;

    async fn get_file(&self, path: &str) -> Result<Bytes>;

    async fn put_file(&self, path: &str, data: Bytes, content_type: &str) -> Result<()>;

    async fn delete_file(&self, path: &str) -> Result<()>;

    /// Create `path`; its parent must exist.
    async fn create_directory(&self, path: &str) -> Result<()>;

    /// Delete the empty directory `path`.
    async fn delete_directory(&self, path: &str) -> Result<()>;

    async fn exists(&self, path: &str) -> Result<bool>;
}
