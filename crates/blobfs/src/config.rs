// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! YAML storage configuration and the root resolver built from it.
//!
//! ```yaml
//! accounts:
//!   - name: acct
//!     blob:
//!       type: local
//!       path: /srv/blobs
//!     share:
//!       type: memory
//!       roots: [scratch]
//! listing:
//!   policy: drain
//!   page_size: 500
//! ```

use crate::bridge::BridgeOptions;
use crate::error::{Error, Result};
use crate::hostshare::LocalShare;
use crate::listing::ListingPolicy;
use crate::memory::MemoryShare;
use crate::object_store_client::ObjectStoreBlobClient;
use crate::path::{RootKind, VirtualPath};
use crate::roots::{RootHandle, RootResolver};
use async_trait::async_trait;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Where the roots of one kind live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Process-local storage. An empty `roots` list accepts any name.
    Memory {
        #[serde(default, alias = "containers", alias = "shares")]
        roots: Vec<String>,
    },
    /// One host subdirectory per container or share under `path`
    Local { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<BackendConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<BackendConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default)]
    pub policy: ListingPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    #[serde(default)]
    pub listing: ListingConfig,
}

impl StorageConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: StorageConfig = serde_yaml_ng::from_str(yaml)
            .map_err(|e| Error::config(format!("Invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for account in &self.accounts {
            let name = account.name.trim_matches('/');
            if name.is_empty() {
                return Err(Error::config("account name cannot be empty"));
            }
            if !seen.insert(name) {
                return Err(Error::config(format!("duplicate account '{name}'")));
            }
        }
        if self.listing.page_size == Some(0) {
            return Err(Error::config("listing page_size must be positive"));
        }
        Ok(())
    }

    #[must_use]
    pub fn bridge_options(&self) -> BridgeOptions {
        BridgeOptions {
            listing_policy: self.listing.policy,
            page_size: self.listing.page_size,
            ..Default::default()
        }
    }

    /// Account whose name matches the account part of `path`
    #[must_use]
    pub fn account(&self, path: &VirtualPath) -> Option<&AccountConfig> {
        let wanted = path.account().trim_matches('/');
        self.accounts
            .iter()
            .find(|a| a.name.trim_matches('/') == wanted)
    }
}

/// Resolves roots from a [`StorageConfig`].
///
/// In-memory roots are created on first use and kept, so a refreshed
/// bridge sees the same contents.
pub struct ConfiguredResolver {
    config: StorageConfig,
    memory_blobs: Mutex<HashMap<String, Arc<InMemory>>>,
    memory_shares: Mutex<HashMap<String, Arc<MemoryShare>>>,
}

impl ConfiguredResolver {
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            memory_blobs: Mutex::new(HashMap::new()),
            memory_shares: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn backend_for(&self, path: &VirtualPath) -> Result<&BackendConfig> {
        let account = self
            .config
            .account(path)
            .ok_or_else(|| Error::not_found(path.root_path()))?;
        let backend = match path.kind() {
            RootKind::BlobContainers => account.blob.as_ref(),
            RootKind::FileShares => account.share.as_ref(),
        };
        backend.ok_or_else(|| Error::not_found(path.root_path()))
    }

    async fn blob_root(&self, path: &VirtualPath, backend: &BackendConfig) -> Result<RootHandle> {
        let store: Arc<dyn object_store::ObjectStore> = match backend {
            BackendConfig::Memory { roots } => {
                require_listed(roots, path)?;
                let mut stores = self.memory_blobs.lock().await;
                stores
                    .entry(path.root_path().to_string())
                    .or_insert_with(|| Arc::new(InMemory::new()))
                    .clone()
            }
            BackendConfig::Local { path: base } => {
                let dir = root_dir(base, path)?;
                // Empty host directories would still list as prefixes.
                Arc::new(LocalFileSystem::new_with_prefix(&dir)?.with_automatic_cleanup(true))
            }
        };
        Ok(RootHandle::blob(path, Arc::new(ObjectStoreBlobClient::new(store))))
    }

    async fn share_root(&self, path: &VirtualPath, backend: &BackendConfig) -> Result<RootHandle> {
        let share: Arc<dyn crate::client::ShareClient> = match backend {
            BackendConfig::Memory { roots } => {
                require_listed(roots, path)?;
                let mut shares = self.memory_shares.lock().await;
                shares
                    .entry(path.root_path().to_string())
                    .or_insert_with(|| Arc::new(MemoryShare::new()))
                    .clone()
            }
            BackendConfig::Local { path: base } => Arc::new(LocalShare::new(root_dir(base, path)?)?),
        };
        Ok(RootHandle::share(path, share))
    }
}

fn require_listed(roots: &[String], path: &VirtualPath) -> Result<()> {
    if roots.is_empty() || roots.iter().any(|r| r == path.root_name()) {
        Ok(())
    } else {
        Err(Error::not_found(path.root_path()))
    }
}

fn root_dir(base: &Path, path: &VirtualPath) -> Result<PathBuf> {
    let dir = base.join(path.root_name());
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(Error::not_found(path.root_path()))
    }
}

#[async_trait]
impl RootResolver for ConfiguredResolver {
    async fn resolve(&self, path: &VirtualPath) -> Result<RootHandle> {
        let root = path.root();
        let backend = self.backend_for(&root)?;
        match root.kind() {
            RootKind::BlobContainers => self.blob_root(&root, backend).await,
            RootKind::FileShares => self.share_root(&root, backend).await,
        }
    }
}
