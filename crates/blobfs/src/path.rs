// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Decoding of virtual paths of the form
//! `/<account>/<marker>/<root name>/<path inside the root>`.
//!
//! Every other module consumes the decoded [`VirtualPath`]; raw strings are
//! only parsed here.

use crate::error::{Error, Result};

const SEPARATOR: char = '/';

/// Which kind of root a virtual path addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    /// Flat namespace: blob containers
    BlobContainers,
    /// Shallow hierarchy: file shares
    FileShares,
}

impl RootKind {
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            RootKind::BlobContainers => "Blob Containers",
            RootKind::FileShares => "File Shares",
        }
    }

    #[must_use]
    pub fn from_marker(segment: &str) -> Option<Self> {
        match segment {
            "Blob Containers" => Some(RootKind::BlobContainers),
            "File Shares" => Some(RootKind::FileShares),
            _ => None,
        }
    }
}

impl std::fmt::Display for RootKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

/// A decoded virtual path. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualPath {
    kind: RootKind,
    account: String,
    root_path: String,
    root_name: String,
    file_path: String,
    dir_path: String,
    parent_dir_path: String,
    base_name: String,
}

impl VirtualPath {
    /// Decode `raw` expecting the given root marker.
    pub fn decode(raw: &str, kind: RootKind) -> Result<Self> {
        let segments = split_segments(raw)?;
        let marker_at = segments
            .iter()
            .position(|s| *s == kind.marker())
            .ok_or_else(|| Error::malformed_path(raw))?;
        Self::from_segments(raw, kind, &segments, marker_at)
    }

    /// Decode `raw`, picking the root kind from the first marker segment found.
    pub fn decode_any(raw: &str) -> Result<Self> {
        let segments = split_segments(raw)?;
        let (marker_at, kind) = segments
            .iter()
            .enumerate()
            .find_map(|(i, s)| RootKind::from_marker(s).map(|k| (i, k)))
            .ok_or_else(|| Error::malformed_path(raw))?;
        Self::from_segments(raw, kind, &segments, marker_at)
    }

    fn from_segments(raw: &str, kind: RootKind, segments: &[&str], marker_at: usize) -> Result<Self> {
        // Need an account before the marker and a root name after it.
        if marker_at == 0 || marker_at + 1 >= segments.len() {
            return Err(Error::malformed_path(raw));
        }
        let account = format!("{SEPARATOR}{}", segments[..marker_at].join("/"));
        let root_name = segments[marker_at + 1];
        Ok(Self::from_parts(kind, &account, root_name, &segments[marker_at + 2..]))
    }

    fn from_parts(kind: RootKind, account: &str, root_name: &str, rest: &[&str]) -> Self {
        let root_path = format!("{account}/{}/{root_name}", kind.marker());
        let file_path = rest.join("/");
        let dir_path = if file_path.is_empty() {
            String::new()
        } else {
            format!("{file_path}/")
        };
        let (parent_dir_path, base_name) = match rest.split_last() {
            Some((last, parents)) if !parents.is_empty() => {
                (format!("{}/", parents.join("/")), (*last).to_string())
            }
            Some((last, _)) => (String::new(), (*last).to_string()),
            None => (String::new(), String::new()),
        };
        Self {
            kind,
            account: account.to_string(),
            root_path,
            root_name: root_name.to_string(),
            file_path,
            dir_path,
            parent_dir_path,
            base_name,
        }
    }

    /// Inverse of `decode`: the normalized raw path.
    #[must_use]
    pub fn encode(&self) -> String {
        if self.file_path.is_empty() {
            self.root_path.clone()
        } else {
            format!("{}/{}", self.root_path, self.file_path)
        }
    }

    /// Path of the named child of this path.
    pub fn join(&self, name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(SEPARATOR) || name == "." || name == ".." {
            return Err(Error::malformed_path(format!("{}/{}", self.encode(), name)));
        }
        let mut rest: Vec<&str> = self.segments().collect();
        rest.push(name);
        Ok(Self::from_parts(self.kind, &self.account, &self.root_name, &rest))
    }

    /// Parent path, or `None` when this already addresses the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let rest: Vec<&str> = self.segments().collect();
        let (_, parents) = rest.split_last()?;
        Some(Self::from_parts(self.kind, &self.account, &self.root_name, parents))
    }

    /// The root (container or share) this path lives in.
    #[must_use]
    pub fn root(&self) -> Self {
        Self::from_parts(self.kind, &self.account, &self.root_name, &[])
    }

    /// Path segments inside the root
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.file_path.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.file_path.is_empty()
    }

    #[must_use]
    pub fn kind(&self) -> RootKind {
        self.kind
    }

    /// Everything before the marker, e.g. `/acct`
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    #[must_use]
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    #[must_use]
    pub fn dir_path(&self) -> &str {
        &self.dir_path
    }

    #[must_use]
    pub fn parent_dir_path(&self) -> &str {
        &self.parent_dir_path
    }

    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }
}

impl std::fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

fn split_segments(raw: &str) -> Result<Vec<&str>> {
    if !raw.starts_with(SEPARATOR) {
        return Err(Error::malformed_path(raw));
    }
    let segments: Vec<&str> = raw.split(SEPARATOR).filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(Error::malformed_path(raw));
    }
    Ok(segments)
}

/// Join a directory prefix (empty or ending in `/`) with a child name.
pub(crate) fn child_path(dir_path: &str, name: &str) -> String {
    format!("{dir_path}{name}")
}

/// The directory prefix (`a/b/`) for an in-root path (`a/b`).
pub(crate) fn as_dir_prefix(file_path: &str) -> String {
    if file_path.is_empty() {
        String::new()
    } else {
        format!("{}/", file_path.trim_end_matches(SEPARATOR))
    }
}
