// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Bridge scenarios over in-memory backends.


use crate::client::{BlobClient, BlobListing, ShareClient};
use crate::error::{Error, Result};
use crate::listing::ContinuationToken;
use crate::memory::MemoryShare;
use crate::object_store_client::ObjectStoreBlobClient;
use crate::path::VirtualPath;
use crate::roots::{RootHandle, RootResolver};
use crate::{BridgeOptions, FileSystemBridge};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::memory::InMemory;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

pub(crate) const C1: &str = "/acct/Blob Containers/c1";
pub(crate) const S1: &str = "/acct/File Shares/s1";

/// Path inside the blob container
pub(crate) fn c1(rest: &str) -> String {
    format!("{C1}/{rest}")
}

/// Path inside the share
pub(crate) fn s1(rest: &str) -> String {
    format!("{S1}/{rest}")
}

/// Serves one blob container `c1` and one share `s1`, counting resolutions.
pub(crate) struct FixedResolver {
    blob: Arc<dyn BlobClient>,
    share: Arc<dyn ShareClient>,
    pub(crate) calls: AtomicUsize,
}

#[async_trait]
impl RootResolver for FixedResolver {
    async fn resolve(&self, path: &VirtualPath) -> Result<RootHandle> {
        _ = self.calls.fetch_add(1, Ordering::SeqCst);
        let root = path.root();
        match root.root_path() {
            C1 => Ok(RootHandle::blob(&root, self.blob.clone())),
            S1 => Ok(RootHandle::share(&root, self.share.clone())),
            other => Err(Error::not_found(other)),
        }
    }
}

pub(crate) struct Fixture {
    pub(crate) bridge: FileSystemBridge,
    pub(crate) blob: Arc<dyn BlobClient>,
    pub(crate) share: Arc<MemoryShare>,
    pub(crate) resolver: Arc<FixedResolver>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with(in_memory_blob(), BridgeOptions::default())
    }

    pub(crate) fn with(blob: Arc<dyn BlobClient>, options: BridgeOptions) -> Self {
        let share = Arc::new(MemoryShare::new());
        let resolver = Arc::new(FixedResolver {
            blob: blob.clone(),
            share: share.clone(),
            calls: AtomicUsize::new(0),
        });
        Self {
            bridge: FileSystemBridge::with_options(resolver.clone(), options),
            blob,
            share,
            resolver,
        }
    }

    /// Put objects straight into the container, bypassing the bridge.
    pub(crate) async fn seed(&self, keys: &[&str]) {
        for key in keys {
            self.blob
                .put(key, Bytes::from(format!("contents of {key}")), "text/plain")
                .await
                .unwrap();
        }
    }

    pub(crate) async fn names(&self, path: &str) -> Vec<String> {
        self.bridge
            .read_directory(path)
            .await
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }
}

pub(crate) fn in_memory_blob() -> Arc<dyn BlobClient> {
    Arc::new(ObjectStoreBlobClient::new(Arc::new(InMemory::new())))
}

/// Wraps a client to count calls and inject failures.
pub(crate) struct FaultyBlobClient {
    inner: Arc<dyn BlobClient>,
    refuse_delete: HashSet<String>,
    cancel_after_delete: Option<CancellationToken>,
    pub(crate) lists: AtomicUsize,
    pub(crate) deletes: AtomicUsize,
}

impl FaultyBlobClient {
    pub(crate) fn new(inner: Arc<dyn BlobClient>) -> Self {
        Self {
            inner,
            refuse_delete: HashSet::new(),
            cancel_after_delete: None,
            lists: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn refusing(mut self, key: &str) -> Self {
        _ = self.refuse_delete.insert(key.to_string());
        self
    }

    /// Fire `token` once the first delete has gone through.
    pub(crate) fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_after_delete = Some(token);
        self
    }
}

#[async_trait]
impl BlobClient for FaultyBlobClient {
    async fn list_blobs(
        &self,
        prefix: &str,
        delimiter: &str,
        token: Option<ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<BlobListing> {
        _ = self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner
            .list_blobs(prefix, delimiter, token, max_results)
            .await
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        self.inner.get(path).await
    }

    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.inner.put(path, data, content_type).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        _ = self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.refuse_delete.contains(path) {
            return Err(Error::backend("injected", format!("refusing to delete {path}")));
        }
        self.inner.delete(path).await?;
        if let Some(token) = &self.cancel_after_delete {
            token.cancel();
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.inner.exists(path).await
    }
}

/// Holds the first listing after `arm()` open until `release()`, having
/// already taken its snapshot of the container.
pub(crate) struct GatedBlobClient {
    inner: Arc<dyn BlobClient>,
    armed: AtomicBool,
    pub(crate) listed: Notify,
    release: Notify,
}

impl GatedBlobClient {
    pub(crate) fn new(inner: Arc<dyn BlobClient>) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
            listed: Notify::new(),
            release: Notify::new(),
        }
    }

    pub(crate) fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl BlobClient for GatedBlobClient {
    async fn list_blobs(
        &self,
        prefix: &str,
        delimiter: &str,
        token: Option<ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<BlobListing> {
        let listing = self
            .inner
            .list_blobs(prefix, delimiter, token, max_results)
            .await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.listed.notify_one();
            self.release.notified().await;
        }
        Ok(listing)
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        self.inner.get(path).await
    }

    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.inner.put(path, data, content_type).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.inner.delete(path).await
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.inner.exists(path).await
    }
}

#[tokio::test]
async fn test_roots_resolved_once_until_refresh() {
    let fx = Fixture::new();
    fx.seed(&["a/1.txt"]).await;

    _ = fx.bridge.stat(C1).await.unwrap();
    _ = fx.bridge.stat(&c1("a")).await.unwrap();
    _ = fx.bridge.read_directory(&c1("a")).await.unwrap();
    assert_eq!(fx.resolver.calls.load(Ordering::SeqCst), 1);

    _ = fx.bridge.stat(S1).await.unwrap();
    assert_eq!(fx.resolver.calls.load(Ordering::SeqCst), 2);

    fx.bridge.refresh().await;
    _ = fx.bridge.stat(&c1("a/1.txt")).await.unwrap();
    assert_eq!(fx.resolver.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_unknown_root() {
    let fx = Fixture::new();
    let err = fx
        .bridge
        .stat("/acct/Blob Containers/nope/x")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_malformed_paths() {
    let fx = Fixture::new();
    for raw in ["relative/path", "/acct/Blob Containers", "/Blob Containers/c1", "/acct/c1/a", "/acct/Blob Containers/c1/../x"] {
        assert!(
            matches!(fx.bridge.stat(raw).await, Err(Error::MalformedPath(_))),
            "{raw} should be malformed"
        );
    }
    assert_eq!(fx.resolver.calls.load(Ordering::SeqCst), 0);
}
