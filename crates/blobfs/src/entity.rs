// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::EntryKind;
use crate::path::{as_dir_prefix, child_path};
use crate::roots::RootHandle;

/// Whether a directory has remote backing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    /// Sub-prefix or share directory that exists remotely
    Real,
    /// Pending directory known only to this process
    Virtual,
}

/// Directory inside a root
#[derive(Debug, Clone)]
pub struct DirectoryEntity {
    pub root: RootHandle,
    /// In-root prefix of the parent: empty or ending in `/`
    pub parent_path: String,
    pub name: String,
    pub backing: Backing,
}

impl DirectoryEntity {
    /// In-root path, e.g. `a/b`
    #[must_use]
    pub fn file_path(&self) -> String {
        child_path(&self.parent_path, &self.name)
    }

    /// In-root prefix of the children, e.g. `a/b/`
    #[must_use]
    pub fn dir_path(&self) -> String {
        as_dir_prefix(&self.file_path())
    }

    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.backing == Backing::Virtual
    }
}

/// Blob or share file
#[derive(Debug, Clone)]
pub struct LeafEntity {
    pub root: RootHandle,
    /// In-root path, e.g. `a/b/file.txt`
    pub path: String,
    pub size_hint: Option<u64>,
}

/// Result of resolving a virtual path
#[derive(Debug, Clone)]
pub enum Entity {
    Root(RootHandle),
    Directory(DirectoryEntity),
    Leaf(LeafEntity),
}

impl Entity {
    #[must_use]
    pub fn root(&self) -> &RootHandle {
        match self {
            Entity::Root(root) => root,
            Entity::Directory(dir) => &dir.root,
            Entity::Leaf(leaf) => &leaf.root,
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Entity::Root(_) | Entity::Directory(_) => EntryKind::Directory,
            Entity::Leaf(_) => EntryKind::File,
        }
    }

    /// In-root path; empty for the root
    #[must_use]
    pub fn file_path(&self) -> String {
        match self {
            Entity::Root(_) => String::new(),
            Entity::Directory(dir) => dir.file_path(),
            Entity::Leaf(leaf) => leaf.path.clone(),
        }
    }

    /// Prefix of the children; `None` for a leaf
    #[must_use]
    pub fn dir_path(&self) -> Option<String> {
        match self {
            Entity::Root(_) => Some(String::new()),
            Entity::Directory(dir) => Some(dir.dir_path()),
            Entity::Leaf(_) => None,
        }
    }

    /// Full virtual path
    #[must_use]
    pub fn full_path(&self) -> String {
        self.root().full_path(&self.file_path())
    }

    /// True for a directory that exists only as a pending entry
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        matches!(self, Entity::Directory(dir) if dir.is_virtual())
    }
}
