// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Page-at-a-time enumeration of a directory's direct children.
//!
//! The flat backend folds deeper keys into sub-prefixes with a delimiter;
//! the share backend lists real subdirectories. Both come out of the
//! [`Lister`] as the same [`ListingPage`] shape with names relative to the
//! listed directory.

use crate::EntryKind;
use crate::error::{Error, Result};
use crate::roots::{Backend, RootHandle};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Delimiter used to fold flat keys into directories
pub const DELIMITER: &str = "/";

/// Opaque cursor returned by a paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A direct child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
}

impl ListingEntry {
    pub fn file<S: Into<String>>(name: S, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size: Some(size),
        }
    }

    pub fn directory<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: None,
        }
    }
}

/// One page of a listing. Exhausted when `continuation_token` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub entries: Vec<ListingEntry>,
    pub continuation_token: Option<ContinuationToken>,
}

impl ListingPage {
    pub fn files(&self) -> impl Iterator<Item = &ListingEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::File)
    }

    pub fn directories(&self) -> impl Iterator<Item = &ListingEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Directory)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ListingEntry> {
        // A sub-prefix wins over a blob of the same name.
        self.directories()
            .find(|e| e.name == name)
            .or_else(|| self.files().find(|e| e.name == name))
    }
}

/// How much of a listing lookups, enumeration and delete consume
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPolicy {
    /// Only the first page of every listing
    FirstPage,
    /// Follow continuation tokens until exhausted
    #[default]
    Drain,
}

pub type ListingStream = Pin<Box<dyn Stream<Item = Result<ListingPage>> + Send>>;

/// Drives the remote list primitive of a root
#[derive(Debug, Clone, Default)]
pub struct Lister {
    page_size: Option<usize>,
    policy: ListingPolicy,
}

impl Lister {
    #[must_use]
    pub fn new(policy: ListingPolicy, page_size: Option<usize>) -> Self {
        Self { page_size, policy }
    }

    #[must_use]
    pub fn policy(&self) -> ListingPolicy {
        self.policy
    }

    /// Fetch one page of the children of `dir_path` (empty or ending in `/`).
    pub async fn page(
        &self,
        root: &RootHandle,
        dir_path: &str,
        token: Option<ContinuationToken>,
    ) -> Result<ListingPage> {
        fetch_page(root, dir_path, token, self.page_size).await
    }

    /// Lazy sequence of pages; calling again restarts from the first page.
    pub fn pages(
        &self,
        root: RootHandle,
        dir_path: String,
        cancel: CancellationToken,
    ) -> ListingStream {
        let page_size = self.page_size;
        let first_only = self.policy == ListingPolicy::FirstPage;
        Box::pin(async_stream::stream! {
            let mut token: Option<ContinuationToken> = None;
            loop {
                if cancel.is_cancelled() {
                    yield Err(Error::Cancelled);
                    break;
                }
                match fetch_page(&root, &dir_path, token.take(), page_size).await {
                    Ok(page) => {
                        let next = page.continuation_token.clone();
                        yield Ok(page);
                        match next {
                            Some(t) if !first_only => token = Some(t),
                            _ => break,
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        })
    }

    /// All children according to the policy.
    pub async fn collect(
        &self,
        root: &RootHandle,
        dir_path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ListingEntry>> {
        let mut stream = self.pages(root.clone(), dir_path.to_string(), cancel.clone());
        let mut entries = Vec::new();
        while let Some(page) = stream.next().await {
            entries.extend(page?.entries);
        }
        Ok(entries)
    }

    /// Look for a direct child called `name`, stopping at the first page
    /// that has it as a directory.
    ///
    /// In a flat container a blob `x` and the prefix `x/` can land on
    /// different pages, so a file match keeps scanning for the prefix the
    /// same way enumeration would merge them.
    pub async fn find(
        &self,
        root: &RootHandle,
        dir_path: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ListingEntry>> {
        let flat = matches!(root.backend(), Backend::Blob(_));
        let mut file = None;
        let mut stream = self.pages(root.clone(), dir_path.to_string(), cancel.clone());
        while let Some(page) = stream.next().await {
            match page?.find(name) {
                Some(entry) if entry.kind.is_dir() || !flat => return Ok(Some(entry.clone())),
                Some(entry) => file = file.or_else(|| Some(entry.clone())),
                None => {}
            }
        }
        Ok(file)
    }
}

async fn fetch_page(
    root: &RootHandle,
    dir_path: &str,
    token: Option<ContinuationToken>,
    page_size: Option<usize>,
) -> Result<ListingPage> {
    let root_path = root.root_path();
    diagnostics::debug!("Listing {root_path} under '{dir_path}'", root_path: root_path, dir_path: dir_path);

    match root.backend() {
        Backend::Blob(client) => {
            let listing = client
                .list_blobs(dir_path, DELIMITER, token, page_size)
                .await
                .map_err(|e| missing_root(e, root))?;
            Ok(fold_blob_listing(dir_path, listing))
        }
        Backend::Share(client) => client
            .list_directory(dir_path.trim_end_matches('/'), token, page_size)
            .await
            .map_err(|e| missing_directory(e, root, dir_path)),
    }
}

/// Turn full blob names and sub-prefixes into names relative to `prefix`.
fn fold_blob_listing(prefix: &str, listing: crate::client::BlobListing) -> ListingPage {
    let mut entries = Vec::with_capacity(listing.blobs.len() + listing.prefixes.len());
    for sub in &listing.prefixes {
        let name = sub
            .strip_prefix(prefix)
            .unwrap_or(sub)
            .trim_end_matches(DELIMITER);
        if !name.is_empty() {
            entries.push(ListingEntry::directory(name));
        }
    }
    for blob in listing.blobs {
        let name = blob.name.strip_prefix(prefix).unwrap_or(&blob.name);
        // Zero-length directory markers some tools leave behind
        if !name.is_empty() && !name.contains(DELIMITER) {
            entries.push(ListingEntry::file(name, blob.size));
        }
    }
    ListingPage {
        entries,
        continuation_token: listing.continuation_token,
    }
}

fn missing_root(err: Error, root: &RootHandle) -> Error {
    match err {
        Error::NotFound(_) => Error::not_found(root.root_path()),
        other => other,
    }
}

fn missing_directory(err: Error, root: &RootHandle, dir_path: &str) -> Error {
    match err {
        Error::NotFound(_) => Error::not_found(root.full_path(dir_path)),
        other => other,
    }
}

/// Sort `items` by key and cut one page starting after `token`.
///
/// The token handed out is the key of the last item in the page, so a page
/// boundary stays stable while other keys are added or removed.
pub(crate) fn paginate<T, F>(
    mut items: Vec<T>,
    key: F,
    token: Option<&ContinuationToken>,
    max_results: Option<usize>,
) -> (Vec<T>, Option<ContinuationToken>)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| key(a).cmp(key(b)));
    let start = match token {
        Some(t) => items.partition_point(|i| key(i) <= t.as_str()),
        None => 0,
    };
    let mut page: Vec<T> = items.into_iter().skip(start).collect();
    let next = match max_results {
        Some(max) if max > 0 && page.len() > max => {
            page.truncate(max);
            page.last().map(|i| ContinuationToken::new(key(i)))
        }
        _ => None,
    };
    (page, next)
}
