// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use tokio::sync::Mutex;

/// Directories created on a flat backend that have no backing objects yet.
///
/// Keys are full virtual paths without a trailing separator. A path stays
/// here until a real object appears under it or it is deleted.
#[derive(Debug, Default)]
pub struct PendingDirectories {
    paths: Mutex<BTreeSet<String>>,
}

impl PendingDirectories {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, path: &str) -> Result<()> {
        let path = normalize(path);
        if !self.paths.lock().await.insert(path.to_string()) {
            return Err(Error::already_exists(path));
        }
        Ok(())
    }

    /// Returns whether `path` was present.
    pub async fn remove(&self, path: &str) -> bool {
        self.paths.lock().await.remove(normalize(path))
    }

    /// Remove `path` and everything below it. Returns the removed paths.
    pub async fn remove_descendants_of(&self, path: &str) -> Vec<String> {
        let path = normalize(path);
        let mut paths = self.paths.lock().await;
        let doomed: Vec<String> = paths
            .iter()
            .filter(|p| p.as_str() == path || is_descendant(p, path))
            .cloned()
            .collect();
        for p in &doomed {
            paths.remove(p);
        }
        doomed
    }

    /// Remove `path` and every ancestor of it. Returns the removed paths.
    pub async fn remove_self_and_ancestors(&self, path: &str) -> Vec<String> {
        let mut paths = self.paths.lock().await;
        let mut removed = Vec::new();
        let mut current = Some(normalize(path));
        while let Some(p) = current {
            if paths.remove(p) {
                removed.push(p.to_string());
            }
            current = p.rsplit_once('/').map(|(parent, _)| parent).filter(|s| !s.is_empty());
        }
        removed
    }

    pub async fn has(&self, path: &str) -> bool {
        self.paths.lock().await.contains(normalize(path))
    }

    /// Names of pending directories whose parent is exactly `parent`.
    pub async fn children_directly_under(&self, parent: &str) -> BTreeSet<String> {
        let parent = normalize(parent);
        let prefix = format!("{parent}/");
        let paths = self.paths.lock().await;
        paths
            .range(prefix.clone()..)
            .take_while(|p| p.starts_with(&prefix))
            .filter_map(|p| {
                let rest = &p[prefix.len()..];
                (!rest.contains('/')).then(|| rest.to_string())
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.paths.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.paths.lock().await.is_empty()
    }
}

fn normalize(path: &str) -> &str {
    path.trim_end_matches('/')
}

fn is_descendant(candidate: &str, ancestor: &str) -> bool {
    candidate
        .strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const ROOT: &str = "/acct/Blob Containers/c1";

    fn p(rest: &str) -> String {
        format!("{ROOT}/{rest}")
    }

    #[tokio::test]
    async fn test_add_and_has() {
        let pending = PendingDirectories::new();
        pending.add(&p("a")).await.unwrap();
        assert!(pending.has(&p("a")).await);
        assert!(pending.has(&p("a/")).await);
        assert!(!pending.has(&p("b")).await);

        let err = pending.add(&p("a/")).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let pending = PendingDirectories::new();
        assert!(!pending.remove(&p("nothing")).await);
        assert!(pending.remove_descendants_of(&p("nothing")).await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_descendants_respects_segments() {
        let pending = PendingDirectories::new();
        for d in ["a", "a/b", "a/b/c", "ab", "ab/c", "z"] {
            pending.add(&p(d)).await.unwrap();
        }

        let removed = pending.remove_descendants_of(&p("a")).await;
        assert_eq!(removed.len(), 3);
        assert!(!pending.has(&p("a/b/c")).await);
        assert!(pending.has(&p("ab")).await);
        assert!(pending.has(&p("ab/c")).await);
        assert!(pending.has(&p("z")).await);
    }

    #[tokio::test]
    async fn test_remove_self_and_ancestors() {
        let pending = PendingDirectories::new();
        for d in ["a", "a/b", "a/b/c", "a/x"] {
            pending.add(&p(d)).await.unwrap();
        }

        let mut removed = pending.remove_self_and_ancestors(&p("a/b/c")).await;
        removed.sort();
        assert_eq!(removed, vec![p("a"), p("a/b"), p("a/b/c")]);
        assert!(pending.has(&p("a/x")).await);
        assert_eq!(pending.len().await, 1);
    }

    #[tokio::test]
    async fn test_children_directly_under() {
        let pending = PendingDirectories::new();
        for d in ["a", "a/b", "a/b/c", "a/d", "ab"] {
            pending.add(&p(d)).await.unwrap();
        }

        let top: Vec<String> = pending.children_directly_under(ROOT).await.into_iter().collect();
        assert_eq!(top, vec!["a".to_string(), "ab".to_string()]);

        let under_a: Vec<String> = pending.children_directly_under(&p("a")).await.into_iter().collect();
        assert_eq!(under_a, vec!["b".to_string(), "d".to_string()]);

        assert!(pending.children_directly_under(&p("zzz")).await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_and_reads() {
        let pending = Arc::new(PendingDirectories::new());
        let mut tasks = Vec::new();
        for i in 0..32 {
            let pending = pending.clone();
            tasks.push(tokio::spawn(async move {
                pending.add(&p(&format!("d{i}"))).await.unwrap();
                let names = pending.children_directly_under(ROOT).await;
                assert!(names.contains(&format!("d{i}")));
                assert!(names.iter().all(|n| n.starts_with('d') && !n.contains('/')));
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        assert_eq!(pending.len().await, 32);
    }
}
