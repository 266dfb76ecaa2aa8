// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::client::{BlobClient, ShareClient};
use crate::error::{Error, Result};
use crate::path::{RootKind, VirtualPath};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Remote capability behind a root
#[derive(Clone)]
pub enum Backend {
    Blob(Arc<dyn BlobClient>),
    Share(Arc<dyn ShareClient>),
}

impl Backend {
    #[must_use]
    pub fn kind(&self) -> RootKind {
        match self {
            Backend::Blob(_) => RootKind::BlobContainers,
            Backend::Share(_) => RootKind::FileShares,
        }
    }
}

/// A resolved container or share
#[derive(Clone)]
pub struct RootHandle {
    root_path: String,
    name: String,
    backend: Backend,
}

impl RootHandle {
    #[must_use]
    pub fn blob(root: &VirtualPath, client: Arc<dyn BlobClient>) -> Self {
        Self::new(root, Backend::Blob(client))
    }

    #[must_use]
    pub fn share(root: &VirtualPath, client: Arc<dyn ShareClient>) -> Self {
        Self::new(root, Backend::Share(client))
    }

    fn new(root: &VirtualPath, backend: Backend) -> Self {
        Self {
            root_path: root.root_path().to_string(),
            name: root.root_name().to_string(),
            backend,
        }
    }

    #[must_use]
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> RootKind {
        self.backend.kind()
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Full virtual path of an in-root path
    #[must_use]
    pub fn full_path(&self, file_path: &str) -> String {
        let file_path = file_path.trim_end_matches('/');
        if file_path.is_empty() {
            self.root_path.clone()
        } else {
            format!("{}/{}", self.root_path, file_path)
        }
    }
}

impl std::fmt::Debug for RootHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RootHandle{{{} ({})}}", self.root_path, self.kind())
    }
}

/// Identity collaborator: materializes the handle for a root path.
#[async_trait]
pub trait RootResolver: Send + Sync {
    /// Resolve the root that `path` lives in. Fails `NotFound` when the
    /// container or share cannot be located.
    async fn resolve(&self, path: &VirtualPath) -> Result<RootHandle>;
}

/// Memoizes root handles by root path for the lifetime of the bridge
pub struct RootRegistry {
    resolver: Arc<dyn RootResolver>,
    cache: Mutex<HashMap<String, RootHandle>>,
}

impl RootRegistry {
    #[must_use]
    pub fn new(resolver: Arc<dyn RootResolver>) -> Self {
        Self {
            resolver,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_resolve(&self, path: &VirtualPath) -> Result<RootHandle> {
        let root_path = path.root_path();
        if let Some(handle) = self.cache.lock().await.get(root_path) {
            return Ok(handle.clone());
        }

        // Resolve outside the lock; a concurrent resolver for the same root
        // loses to whichever inserted first.
        let resolved = self.resolve(path).await?;
        let mut cache = self.cache.lock().await;
        let handle = cache
            .entry(root_path.to_string())
            .or_insert(resolved)
            .clone();
        Ok(handle)
    }

    /// Uncached resolution through the identity collaborator.
    pub async fn resolve(&self, path: &VirtualPath) -> Result<RootHandle> {
        let root_path = path.root_path();
        diagnostics::debug!("Resolving root {root_path}", root_path: root_path);
        let handle = self.resolver.resolve(path).await?;
        if handle.kind() != path.kind() {
            return Err(Error::config(format!(
                "resolver returned a {} root for {}",
                handle.kind(),
                root_path
            )));
        }
        Ok(handle)
    }

    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }
}
