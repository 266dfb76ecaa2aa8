// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! [`BlobClient`] over any [`ObjectStore`].
//!
//! Continuation tokens are the last key of the previous page; the object
//! store is asked for the full delimited listing and the page is cut here.

use crate::client::{BlobClient, BlobItem, BlobListing};
use crate::error::{Error, Result};
use crate::listing::{ContinuationToken, DELIMITER, paginate};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload,
    path::Path as ObjectPath,
};
use std::sync::Arc;

enum Listed {
    Blob(BlobItem),
    Prefix(String),
}

impl Listed {
    fn key(&self) -> &str {
        match self {
            Listed::Blob(item) => &item.name,
            Listed::Prefix(prefix) => prefix,
        }
    }
}

/// A blob container backed by an object store
#[derive(Clone)]
pub struct ObjectStoreBlobClient {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreBlobClient {
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

impl std::fmt::Debug for ObjectStoreBlobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectStoreBlobClient({})", self.store)
    }
}

#[async_trait]
impl BlobClient for ObjectStoreBlobClient {
    async fn list_blobs(
        &self,
        prefix: &str,
        delimiter: &str,
        token: Option<ContinuationToken>,
        max_results: Option<usize>,
    ) -> Result<BlobListing> {
        if delimiter != DELIMITER {
            return Err(Error::unsupported(format!(
                "object store listings only fold on '{DELIMITER}', not '{delimiter}'"
            )));
        }

        let trimmed = prefix.trim_end_matches(DELIMITER);
        let location = (!trimmed.is_empty()).then(|| ObjectPath::from(trimmed));
        let result = self.store.list_with_delimiter(location.as_ref()).await?;

        let mut items: Vec<Listed> = Vec::with_capacity(result.objects.len() + result.common_prefixes.len());
        items.extend(
            result
                .common_prefixes
                .iter()
                .map(|p| Listed::Prefix(format!("{}{DELIMITER}", p.as_ref()))),
        );
        items.extend(result.objects.into_iter().map(|meta| {
            Listed::Blob(BlobItem {
                name: meta.location.as_ref().to_string(),
                size: meta.size,
            })
        }));

        let (page, continuation_token) = paginate(items, Listed::key, token.as_ref(), max_results);

        let mut listing = BlobListing {
            continuation_token,
            ..Default::default()
        };
        for item in page {
            match item {
                Listed::Blob(blob) => listing.blobs.push(blob),
                Listed::Prefix(prefix) => listing.prefixes.push(prefix),
            }
        }
        Ok(listing)
    }

    async fn get(&self, path: &str) -> Result<Bytes> {
        let result = self.store.get(&ObjectPath::from(path)).await?;
        Ok(result.bytes().await?)
    }

    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<()> {
        let location = ObjectPath::from(path);
        let mut attributes = Attributes::new();
        _ = attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        match self
            .store
            .put_opts(&location, PutPayload::from(data.clone()), opts)
            .await
        {
            Ok(_) => Ok(()),
            // Stores without attribute support still take the bytes.
            Err(object_store::Error::NotImplemented { .. }) => {
                diagnostics::debug!("Store ignores content type for {path}", path: path);
                _ = self.store.put(&location, PutPayload::from(data)).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.store.delete(&ObjectPath::from(path)).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        match self.store.head(&ObjectPath::from(path)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    async fn client_with(keys: &[&str]) -> ObjectStoreBlobClient {
        let client = ObjectStoreBlobClient::new(Arc::new(InMemory::new()));
        for k in keys {
            client
                .put(k, Bytes::from(k.to_string()), "text/plain")
                .await
                .unwrap();
        }
        client
    }

    #[tokio::test]
    async fn test_delimited_listing() {
        let client = client_with(&["top.txt", "a/one.txt", "a/b/two.txt", "c/three.txt"]).await;

        let root = client.list_blobs("", "/", None, None).await.unwrap();
        assert_eq!(root.prefixes, vec!["a/".to_string(), "c/".to_string()]);
        assert_eq!(
            root.blobs,
            vec![BlobItem {
                name: "top.txt".to_string(),
                size: 7
            }]
        );

        let a = client.list_blobs("a/", "/", None, None).await.unwrap();
        assert_eq!(a.prefixes, vec!["a/b/".to_string()]);
        assert_eq!(a.blobs.len(), 1);
        assert_eq!(a.blobs[0].name, "a/one.txt");
    }

    #[tokio::test]
    async fn test_paged_listing() {
        let client = client_with(&["p/1", "p/2", "p/3", "p/4", "p/5"]).await;
        let mut token = None;
        let mut seen = Vec::new();
        let mut calls = 0;
        loop {
            let page = client.list_blobs("p/", "/", token, Some(2)).await.unwrap();
            calls += 1;
            seen.extend(page.blobs.into_iter().map(|b| b.name));
            token = page.continuation_token;
            if token.is_none() {
                break;
            }
        }
        assert_eq!(calls, 3);
        assert_eq!(seen, vec!["p/1", "p/2", "p/3", "p/4", "p/5"]);
    }

    #[tokio::test]
    async fn test_get_exists_delete() {
        let client = client_with(&["x/y.txt"]).await;
        assert!(client.exists("x/y.txt").await.unwrap());
        assert!(!client.exists("x/z.txt").await.unwrap());
        assert_eq!(client.get("x/y.txt").await.unwrap(), Bytes::from("x/y.txt"));

        client.delete("x/y.txt").await.unwrap();
        assert!(!client.exists("x/y.txt").await.unwrap());
        assert!(client.get("x/y.txt").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_other_delimiters_rejected() {
        let client = client_with(&[]).await;
        assert!(matches!(
            client.list_blobs("", "|", None, None).await,
            Err(Error::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_local_store_without_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let store = object_store::local::LocalFileSystem::new_with_prefix(dir.path()).unwrap();
        let client = ObjectStoreBlobClient::new(Arc::new(store));
        client
            .put("d/f.json", Bytes::from_static(b"{}"), "application/json")
            .await
            .unwrap();
        assert_eq!(client.get("d/f.json").await.unwrap(), Bytes::from_static(b"{}"));
        let listing = client.list_blobs("d/", "/", None, None).await.unwrap();
        assert_eq!(listing.blobs.len(), 1);
    }
}
