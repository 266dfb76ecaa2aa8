// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::entity::{Backing, DirectoryEntity, Entity, LeafEntity};
use crate::error::{Error, Result};
use crate::listing::{Lister, ListingEntry, ListingPolicy};
use crate::path::{VirtualPath, child_path};
use crate::pending::PendingDirectories;
use crate::roots::{Backend, RootHandle};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Result of path resolution
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Every segment resolved
    Found(Entity),
    /// All but the final segment resolved; `name` does not exist in `parent`
    Parent { parent: Entity, name: String },
}

/// Walks a virtual path one segment at a time against remote listings and
/// the pending directory set.
#[derive(Clone)]
pub struct EntityResolver {
    lister: Lister,
    pending: Arc<PendingDirectories>,
}

impl EntityResolver {
    #[must_use]
    pub fn new(lister: Lister, pending: Arc<PendingDirectories>) -> Self {
        Self { lister, pending }
    }

    /// Resolve `path` fully or fail `NotFound`.
    pub async fn resolve(
        &self,
        root: &RootHandle,
        path: &VirtualPath,
        cancel: &CancellationToken,
    ) -> Result<Entity> {
        match self.lookup(root, path, false, cancel).await? {
            Lookup::Found(entity) => Ok(entity),
            Lookup::Parent { .. } => Err(Error::not_found(path.encode())),
        }
    }

    /// Resolve `path`. With `terminate_early`, a missing final segment yields
    /// [`Lookup::Parent`] instead of `NotFound`.
    pub async fn lookup(
        &self,
        root: &RootHandle,
        path: &VirtualPath,
        terminate_early: bool,
        cancel: &CancellationToken,
    ) -> Result<Lookup> {
        let full = path.encode();
        diagnostics::debug!("Resolving {full}", full: full);

        let segments: Vec<&str> = path.segments().collect();
        let mut current = Entity::Root(root.clone());

        for (i, name) in segments.iter().enumerate() {
            let is_final = i + 1 == segments.len();
            let Some(dir_path) = current.dir_path() else {
                return Err(Error::not_a_directory(current.full_path()));
            };
            let accumulated = child_path(&dir_path, name);
            let accumulated_full = root.full_path(&accumulated);

            // Below a pending directory nothing exists remotely.
            let (found, was_pending) = if current.is_virtual() {
                (None, false)
            } else {
                // Sampled before listing: a pending entry is only dropped once
                // a real object backs it, so one of the two must see it.
                let was_pending = self.pending.has(&accumulated_full).await;
                let found = self
                    .find_child(root, &dir_path, name, is_final, cancel)
                    .await?;
                (found, was_pending)
            };

            match found {
                Some(entry) if entry.kind.is_dir() => {
                    current = Entity::Directory(DirectoryEntity {
                        root: root.clone(),
                        parent_path: dir_path,
                        name: (*name).to_string(),
                        backing: Backing::Real,
                    });
                }
                Some(entry) => {
                    if !is_final {
                        return Err(Error::not_a_directory(root.full_path(&accumulated)));
                    }
                    return Ok(Lookup::Found(Entity::Leaf(LeafEntity {
                        root: root.clone(),
                        path: accumulated,
                        size_hint: entry.size,
                    })));
                }
                None if self.pending.has(&accumulated_full).await => {
                    current = Entity::Directory(DirectoryEntity {
                        root: root.clone(),
                        parent_path: dir_path,
                        name: (*name).to_string(),
                        backing: Backing::Virtual,
                    });
                }
                // Backed by a write that landed after our listing.
                None if was_pending => {
                    current = Entity::Directory(DirectoryEntity {
                        root: root.clone(),
                        parent_path: dir_path,
                        name: (*name).to_string(),
                        backing: Backing::Real,
                    });
                }
                None if is_final && terminate_early => {
                    return Ok(Lookup::Parent {
                        parent: current,
                        name: (*name).to_string(),
                    });
                }
                None => return Err(Error::not_found(full)),
            }
        }

        Ok(Lookup::Found(current))
    }

    async fn find_child(
        &self,
        root: &RootHandle,
        dir_path: &str,
        name: &str,
        is_final: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<ListingEntry>> {
        if let Some(entry) = self.lister.find(root, dir_path, name, cancel).await? {
            return Ok(Some(entry));
        }

        // A first-page listing may have missed a final blob further along;
        // ask for it directly.
        if is_final && self.lister.policy() == ListingPolicy::FirstPage {
            if let Backend::Blob(client) = root.backend() {
                let key = child_path(dir_path, name);
                if client.exists(&key).await? {
                    return Ok(Some(ListingEntry {
                        name: name.to_string(),
                        kind: crate::EntryKind::File,
                        size: None,
                    }));
                }
            }
        }
        Ok(None)
    }
}
