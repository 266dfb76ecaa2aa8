// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The hierarchical file-system surface over blob containers and shares.
//!
//! Every operation takes a raw virtual path such as
//! `/acct/Blob Containers/c1/a/b.txt`, decodes it once, resolves the root
//! through the [`RootRegistry`] and walks the remaining segments with the
//! [`EntityResolver`]. Directories created on a flat backend live in the
//! [`PendingDirectories`] set until a real object appears under them.

use crate::EntryKind;
use crate::content_type;
use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::listing::{Lister, ListingPolicy};
use crate::path::{RootKind, VirtualPath, as_dir_prefix, child_path};
use crate::pending::PendingDirectories;
use crate::resolver::{EntityResolver, Lookup};
use crate::roots::{Backend, RootHandle, RootRegistry, RootResolver};
use crate::watch::{ChangeKind, FileChangeEvent, Watch, WatchOptions};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Result of `stat`. Times and sizes are not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: EntryKind,
    pub size: u64,
    pub ctime: u64,
    pub mtime: u64,
}

impl FileStat {
    fn of(kind: EntryKind) -> Self {
        Self {
            kind,
            size: 0,
            ctime: 0,
            mtime: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Allow creating a file that does not exist
    pub create: bool,
    /// Allow replacing a file that exists
    pub overwrite: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub recursive: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    pub overwrite: bool,
}

/// A child that could not be removed during a recursive delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub path: String,
    pub message: String,
}

/// Outcome of `delete`: what went away and what did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Full virtual paths of removed files, directories and pending entries
    pub deleted: Vec<String>,
    pub failures: Vec<DeleteFailure>,
}

impl DeleteReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, path: String, err: &Error) {
        let message = err.to_string();
        diagnostics::warn!("Failed to delete {path}: {message}", path: path, message: message);
        self.failures.push(DeleteFailure { path, message });
    }
}

/// Tuning for a bridge instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    pub listing_policy: ListingPolicy,
    /// Maximum entries per remote listing call; `None` leaves it to the backend
    pub page_size: Option<usize>,
    /// Capacity of the change event channel
    pub event_capacity: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            listing_policy: ListingPolicy::Drain,
            page_size: None,
            event_capacity: 64,
        }
    }
}

struct State {
    roots: RootRegistry,
    pending: Arc<PendingDirectories>,
    lister: Lister,
    resolver: EntityResolver,
    events: broadcast::Sender<FileChangeEvent>,
}

/// File-system operations over remote roots. Cheap to clone; clones share
/// the root cache and pending directories.
#[derive(Clone)]
pub struct FileSystemBridge {
    state: Arc<State>,
}

impl FileSystemBridge {
    #[must_use]
    pub fn new(resolver: Arc<dyn RootResolver>) -> Self {
        Self::with_options(resolver, BridgeOptions::default())
    }

    #[must_use]
    pub fn with_options(resolver: Arc<dyn RootResolver>, options: BridgeOptions) -> Self {
        let pending = Arc::new(PendingDirectories::new());
        let lister = Lister::new(options.listing_policy, options.page_size);
        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        Self {
            state: Arc::new(State {
                roots: RootRegistry::new(resolver),
                resolver: EntityResolver::new(lister.clone(), pending.clone()),
                pending,
                lister,
                events,
            }),
        }
    }

    /// Directories created here that have no remote backing yet
    #[must_use]
    pub fn pending(&self) -> &Arc<PendingDirectories> {
        &self.state.pending
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FileChangeEvent> {
        self.state.events.subscribe()
    }

    /// Forget every resolved root.
    pub async fn refresh(&self) {
        diagnostics::debug!("Clearing resolved roots");
        self.state.roots.clear().await;
    }

    pub async fn stat(&self, path: &str) -> Result<FileStat> {
        self.stat_with_cancel(path, &CancellationToken::new()).await
    }

    pub async fn stat_with_cancel(&self, path: &str, cancel: &CancellationToken) -> Result<FileStat> {
        let (root, path) = self.locate(path).await?;
        let entity = self.state.resolver.resolve(&root, &path, cancel).await?;
        Ok(FileStat::of(entity.kind()))
    }

    pub async fn read_directory(&self, path: &str) -> Result<Vec<(String, EntryKind)>> {
        self.read_directory_with_cancel(path, &CancellationToken::new())
            .await
    }

    /// Direct children sorted by name. A directory wins over a file of the
    /// same name.
    pub async fn read_directory_with_cancel(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, EntryKind)>> {
        let (root, path) = self.locate(path).await?;
        let entity = self.state.resolver.resolve(&root, &path, cancel).await?;
        let Some(dir_path) = entity.dir_path() else {
            return Err(Error::not_a_directory(path.encode()));
        };

        let mut children: BTreeMap<String, EntryKind> = BTreeMap::new();
        if !entity.is_virtual() {
            for entry in self.state.lister.collect(&root, &dir_path, cancel).await? {
                let kind = children.entry(entry.name).or_insert(entry.kind);
                if entry.kind.is_dir() {
                    *kind = EntryKind::Directory;
                }
            }
        }
        for name in self
            .state
            .pending
            .children_directly_under(&entity.full_path())
            .await
        {
            _ = children.entry(name).or_insert(EntryKind::Directory);
        }

        Ok(children.into_iter().collect())
    }

    pub async fn create_directory(&self, path: &str) -> Result<()> {
        self.create_directory_with_cancel(path, &CancellationToken::new())
            .await
    }

    pub async fn create_directory_with_cancel(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let (root, path) = self.locate(path).await?;
        let full = path.encode();
        if path.is_root() {
            return Err(Error::already_exists(full));
        }

        match root.backend() {
            Backend::Blob(_) => {
                if self.state.pending.has(&full).await {
                    return Err(Error::already_exists(full));
                }
                match self.state.resolver.lookup(&root, &path, true, cancel).await? {
                    Lookup::Found(_) => return Err(Error::already_exists(full)),
                    Lookup::Parent { .. } => self.state.pending.add(&full).await?,
                }
                diagnostics::info!("Created pending directory {full}", full: full);
            }
            Backend::Share(client) => {
                match self.state.resolver.lookup(&root, &path, true, cancel).await? {
                    Lookup::Found(_) => return Err(Error::already_exists(full)),
                    Lookup::Parent { parent, name } => {
                        let dir = child_path(&entity_dir(&parent, &full)?, &name);
                        check_cancel(cancel)?;
                        client.create_directory(&dir).await?;
                    }
                }
                diagnostics::info!("Created share directory {full}", full: full);
            }
        }

        self.emit(ChangeKind::Created, full);
        Ok(())
    }

    pub async fn read_file(&self, path: &str) -> Result<Bytes> {
        self.read_file_with_cancel(path, &CancellationToken::new())
            .await
    }

    pub async fn read_file_with_cancel(&self, path: &str, cancel: &CancellationToken) -> Result<Bytes> {
        let (root, path) = self.locate(path).await?;
        let full = path.encode();
        let Entity::Leaf(leaf) = self.state.resolver.resolve(&root, &path, cancel).await? else {
            return Err(Error::not_found(full));
        };

        check_cancel(cancel)?;
        let data = match root.backend() {
            Backend::Blob(client) => client.get(&leaf.path).await,
            Backend::Share(client) => client.get_file(&leaf.path).await,
        }
        .map_err(|e| renamed_not_found(e, &full))?;

        let size = data.len();
        diagnostics::debug!("Read {size} bytes from {full}", size: size, full: full);
        Ok(data)
    }

    pub async fn write_file(&self, path: &str, data: Bytes, options: WriteOptions) -> Result<()> {
        self.write_file_with_cancel(path, data, options, &CancellationToken::new())
            .await
    }

    pub async fn write_file_with_cancel(
        &self,
        path: &str,
        data: Bytes,
        options: WriteOptions,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let (root, path) = self.locate(path).await?;
        let full = path.encode();
        if path.is_root() {
            return Err(Error::not_a_file(full));
        }

        let (key, change, backed_dir) = match self.state.resolver.lookup(&root, &path, true, cancel).await? {
            Lookup::Found(Entity::Leaf(leaf)) => {
                if !options.overwrite {
                    return Err(Error::no_permissions(format!(
                        "{full} exists and overwrite is not set"
                    )));
                }
                (leaf.path, ChangeKind::Changed, None)
            }
            Lookup::Found(_) => return Err(Error::not_a_file(full)),
            Lookup::Parent { parent, name } => {
                if !options.create {
                    return Err(Error::not_found(full));
                }
                let key = child_path(&entity_dir(&parent, &full)?, &name);
                (key, ChangeKind::Created, Some(parent.full_path()))
            }
        };

        let content_type = content_type::for_path(&key);
        check_cancel(cancel)?;
        match root.backend() {
            Backend::Blob(client) => client.put(&key, data, &content_type).await?,
            Backend::Share(client) => client.put_file(&key, data, &content_type).await?,
        }

        if let Some(dir) = backed_dir {
            let backed = self.state.pending.remove_self_and_ancestors(&dir).await;
            if !backed.is_empty() {
                let count = backed.len();
                diagnostics::debug!("{count} pending directories now backed by {full}", count: count, full: full);
            }
        }

        diagnostics::info!("Wrote {full} ({content_type})", full: full, content_type: content_type);
        self.emit(change, full);
        Ok(())
    }

    pub async fn delete(&self, path: &str, options: DeleteOptions) -> Result<DeleteReport> {
        self.delete_with_cancel(path, options, &CancellationToken::new())
            .await
    }

    /// Delete a file, or a directory and everything below it.
    ///
    /// Individual child failures during a recursive walk do not stop it;
    /// they are returned in the report.
    pub async fn delete_with_cancel(
        &self,
        path: &str,
        options: DeleteOptions,
        cancel: &CancellationToken,
    ) -> Result<DeleteReport> {
        let (root, path) = self.locate(path).await?;
        let full = path.encode();
        let entity = self.state.resolver.resolve(&root, &path, cancel).await?;

        let mut report = DeleteReport::default();
        match &entity {
            Entity::Leaf(leaf) => {
                check_cancel(cancel)?;
                delete_leaf(&root, &leaf.path)
                    .await
                    .map_err(|e| renamed_not_found(e, &full))?;
                report.deleted.push(full.clone());
            }
            _ if !options.recursive => {
                return Err(Error::unsupported(format!(
                    "{full} is a directory; delete it recursively"
                )));
            }
            Entity::Root(_) if root.kind() == RootKind::BlobContainers => {
                return Err(Error::unsupported(format!(
                    "blob container {full} cannot be deleted"
                )));
            }
            _ if entity.is_virtual() => {}
            _ => {
                let dir_path = entity.dir_path().unwrap_or_default();
                self.delete_tree(&root, dir_path, &mut report, cancel).await?;
            }
        }

        report
            .deleted
            .extend(self.state.pending.remove_descendants_of(&full).await);

        let count = report.deleted.len();
        let failed = report.failures.len();
        diagnostics::info!("Deleted {full}: {count} removed, {failed} failed", full: full, count: count, failed: failed);
        self.emit(ChangeKind::Deleted, full);
        Ok(report)
    }

    /// Walk a real directory top-down, deleting files as they are listed and
    /// stacking subdirectories. Share directories are removed afterwards,
    /// deepest first; the share root stays.
    async fn delete_tree(
        &self,
        root: &RootHandle,
        dir_path: String,
        report: &mut DeleteReport,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let mut stack = vec![dir_path];
        let mut visited = Vec::new();

        while let Some(dir) = stack.pop() {
            check_cancel(cancel)?;
            let entries = match self.state.lister.collect(root, &dir, cancel).await {
                Ok(entries) => entries,
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    report.fail(root.full_path(&dir), &e);
                    continue;
                }
            };
            visited.push(dir.clone());

            let (dirs, files): (Vec<_>, Vec<_>) =
                entries.into_iter().partition(|e| e.kind.is_dir());
            for file in files {
                check_cancel(cancel)?;
                let key = child_path(&dir, &file.name);
                match delete_leaf(root, &key).await {
                    Ok(()) => report.deleted.push(root.full_path(&key)),
                    Err(e) => report.fail(root.full_path(&key), &e),
                }
            }
            for sub in dirs {
                stack.push(as_dir_prefix(&child_path(&dir, &sub.name)));
            }
        }

        if let Backend::Share(client) = root.backend() {
            for dir in visited.iter().rev().filter(|d| !d.is_empty()) {
                check_cancel(cancel)?;
                let dir = dir.trim_end_matches('/');
                match client.delete_directory(dir).await {
                    Ok(()) => report.deleted.push(root.full_path(dir)),
                    Err(e) => report.fail(root.full_path(dir), &e),
                }
            }
        }
        Ok(())
    }

    /// Always fails: the backing stores have no atomic move.
    pub async fn rename(&self, old_path: &str, new_path: &str, _options: RenameOptions) -> Result<()> {
        let old = VirtualPath::decode_any(old_path)?;
        let new = VirtualPath::decode_any(new_path)?;
        let old_full = old.encode();
        let new_full = new.encode();
        if old.base_name() == new.base_name() && old.parent() != new.parent() {
            Err(Error::unsupported(format!(
                "moving {old_full} to {new_full} is not supported"
            )))
        } else {
            Err(Error::unsupported(format!(
                "renaming {old_full} to {new_full} is not supported"
            )))
        }
    }

    /// Subscribe to changes under `path`. Remote changes are not observed,
    /// so the returned watch only ends when cancelled.
    pub fn watch(&self, path: &str, options: WatchOptions) -> Result<Watch> {
        let path = VirtualPath::decode_any(path)?;
        Ok(Watch::new(path.encode(), options))
    }

    async fn locate(&self, raw: &str) -> Result<(RootHandle, VirtualPath)> {
        let path = VirtualPath::decode_any(raw)?;
        let root = self.state.roots.get_or_resolve(&path).await?;
        Ok((root, path))
    }

    fn emit(&self, kind: ChangeKind, path: String) {
        // No receivers is not an error.
        _ = self.state.events.send(FileChangeEvent::new(kind, path));
    }
}

fn check_cancel(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

fn entity_dir(entity: &Entity, full: &str) -> Result<String> {
    entity
        .dir_path()
        .ok_or_else(|| Error::not_a_directory(full))
}

async fn delete_leaf(root: &RootHandle, key: &str) -> Result<()> {
    match root.backend() {
        Backend::Blob(client) => client.delete(key).await,
        Backend::Share(client) => client.delete_file(key).await,
    }
}

fn renamed_not_found(err: Error, full: &str) -> Error {
    match err {
        Error::NotFound(_) => Error::not_found(full),
        other => other,
    }
}
