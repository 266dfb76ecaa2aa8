// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Change notification.
//!
//! The bridge broadcasts a [`FileChangeEvent`] after each of its own
//! successful mutations. Remote changes are never observed, so a [`Watch`]
//! on a path stays quiet until it is cancelled.

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Changed,
    Deleted,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeKind::Created => "created",
            ChangeKind::Changed => "changed",
            ChangeKind::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

/// A mutation made through the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    pub kind: ChangeKind,
    /// Full virtual path
    pub path: String,
}

impl FileChangeEvent {
    pub fn new<S: Into<String>>(kind: ChangeKind, path: S) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchOptions {
    pub recursive: bool,
    pub excludes: Vec<String>,
}

/// Inert subscription returned by `watch`
#[derive(Debug)]
pub struct Watch {
    path: String,
    options: WatchOptions,
    token: CancellationToken,
}

impl Watch {
    pub(crate) fn new(path: String, options: WatchOptions) -> Self {
        Self {
            path,
            options,
            token: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Safe to call more than once.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits for the next change. Pends until the watch is cancelled, then
    /// yields `None`.
    pub async fn changed(&self) -> Option<FileChangeEvent> {
        self.token.cancelled().await;
        None
    }
}
