// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-process file share, used for tests and the `memory` backend.

use crate::client::ShareClient;
use crate::error::{Error, Result};
use crate::listing::{ContinuationToken, ListingEntry, ListingPage, paginate};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum Node {
    File { data: Bytes, content_type: String },
    Directory,
}

/// A share held in a map keyed by share-relative path
#[derive(Debug, Default)]
pub struct MemoryShare {
    nodes: Mutex<BTreeMap<String, Node>>,
}

impl MemoryShare {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type a file was stored with
    pub async fn content_type(&self, path: &str) -> Option<String> {
        match self.nodes.lock().await.get(normalize(path)) {
            Some(Node::File { content_type, .. }) => Some(content_type.clone()),
            _ => None,
        }
    }
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

fn require_parent(nodes: &BTreeMap<String, Node>, path: &str) -> Result<()> {
    let parent = parent_of(path);
    match nodes.get(parent) {
        _ if parent.is_empty() => Ok(()),
        Some(Node::Directory) => Ok(()),
        Some(Node::File { .. }) => Err(Error::not_a_directory(parent)),
        None => Err(Error::not_found(parent)),
    }
}

#[async_trait]
impl ShareClient for MemoryShare {
    async fn list_directory(
        &self,
        dir: &str,
        token: Option<ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<ListingPage> {
        let dir = normalize(dir);
        let nodes = self.nodes.lock().await;
        if !dir.is_empty() {
            match nodes.get(dir) {
                Some(Node::Directory) => {}
                Some(Node::File { .. }) => return Err(Error::not_a_directory(dir)),
                None => return Err(Error::not_found(dir)),
            }
        }

        let children: Vec<ListingEntry> = nodes
            .iter()
            .filter(|(path, _)| !path.is_empty() && parent_of(path) == dir)
            .map(|(path, node)| {
                let name = path.rsplit('/').next().unwrap_or(path);
                match node {
                    Node::File { data, .. } => ListingEntry::file(name, data.len() as u64),
                    Node::Directory => ListingEntry::directory(name),
                }
            })
            .collect();

        let (entries, continuation_token) =
            paginate(children, |e| e.name.as_str(), token.as_ref(), max_results);
        Ok(ListingPage {
            entries,
            continuation_token,
        })
    }

    async fn get_file(&self, path: &str) -> Result<Bytes> {
        match self.nodes.lock().await.get(normalize(path)) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Directory) => Err(Error::not_a_file(path)),
            None => Err(Error::not_found(path)),
        }
    }

    async fn put_file(&self, path: &str, data: Bytes, content_type: &str) -> Result<()> {
        let path = normalize(path);
        let mut nodes = self.nodes.lock().await;
        require_parent(&nodes, path)?;
        if let Some(Node::Directory) = nodes.get(path) {
            return Err(Error::not_a_file(path));
        }
        _ = nodes.insert(
            path.to_string(),
            Node::File {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        let path = normalize(path);
        let mut nodes = self.nodes.lock().await;
        match nodes.get(path) {
            Some(Node::File { .. }) => {
                _ = nodes.remove(path);
                Ok(())
            }
            Some(Node::Directory) => Err(Error::not_a_file(path)),
            None => Err(Error::not_found(path)),
        }
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        let path = normalize(path);
        if path.is_empty() {
            return Err(Error::already_exists("/"));
        }
        let mut nodes = self.nodes.lock().await;
        require_parent(&nodes, path)?;
        if nodes.contains_key(path) {
            return Err(Error::already_exists(path));
        }
        _ = nodes.insert(path.to_string(), Node::Directory);
        Ok(())
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        let path = normalize(path);
        let mut nodes = self.nodes.lock().await;
        match nodes.get(path) {
            Some(Node::Directory) => {}
            Some(Node::File { .. }) => return Err(Error::not_a_directory(path)),
            None => return Err(Error::not_found(path)),
        }
        if nodes.keys().any(|k| parent_of(k) == path && k != path) {
            return Err(Error::backend(
                "memory share",
                format!("directory not empty: {path}"),
            ));
        }
        _ = nodes.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let path = normalize(path);
        Ok(path.is_empty() || self.nodes.lock().await.contains_key(path))
    }
}
