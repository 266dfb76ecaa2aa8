// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! BlobFS - a hierarchical file-system view over blob containers and file shares
//!
//! Set BLOBFS_LOG environment variable to control logging:
//! - BLOBFS_LOG=off (default) - silent
//! - BLOBFS_LOG=info - mutations
//! - BLOBFS_LOG=debug - every lookup, listing and remote call

// Virtual path decoding
pub mod path;

// Error types
pub mod error;

mod entry_kind;

// Remote primitives and their implementations
pub mod client;
pub mod hostshare;
pub mod memory;
pub mod object_store_client;

// Lookup machinery
pub mod entity;
pub mod listing;
pub mod pending;
pub mod resolver;
pub mod roots;

// The file-system operations
pub mod bridge;

pub mod config;
pub mod content_type;
pub mod watch;

#[cfg(test)]
mod tests;

pub use bridge::{
    BridgeOptions, DeleteFailure, DeleteOptions, DeleteReport, FileStat, FileSystemBridge,
    RenameOptions, WriteOptions,
};
pub use client::{BlobClient, BlobItem, BlobListing, ShareClient};
pub use config::{AccountConfig, BackendConfig, ConfiguredResolver, ListingConfig, StorageConfig};
pub use entity::{Backing, DirectoryEntity, Entity, LeafEntity};
pub use entry_kind::EntryKind;
pub use error::{Error, FileSystemErrorKind, Result};
pub use hostshare::LocalShare;
pub use listing::{ContinuationToken, Lister, ListingEntry, ListingPage, ListingPolicy};
pub use memory::MemoryShare;
pub use object_store_client::ObjectStoreBlobClient;
pub use path::{RootKind, VirtualPath};
pub use pending::PendingDirectories;
pub use resolver::{EntityResolver, Lookup};
pub use roots::{Backend, RootHandle, RootRegistry, RootResolver};
pub use watch::{ChangeKind, FileChangeEvent, Watch, WatchOptions};
