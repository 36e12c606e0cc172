use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
#[cfg(feature = "aws")]
use tracing::info;

use crate::error::{PipelineError, Result};

#[cfg(feature = "aws")]
use aws_config::BehaviorVersion;
#[cfg(feature = "aws")]
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};

/// One entry of the flat object namespace the corpus lives in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoredObject {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// The durable store at its interface boundary: a flat namespace keyed by
/// filename with overwrite semantics (last write wins).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn ensure_container(&self) -> Result<()>;
    async fn list(&self) -> Result<Vec<StoredObject>>;
    async fn get(&self, name: &str) -> Result<Vec<u8>>;
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<()>;
}

/// In-memory store used by tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, (DateTime<Utc>, Vec<u8>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Insert with an explicit creation date, for deterministic tests.
    pub async fn insert_dated(&self, name: &str, bytes: Vec<u8>, created_at: DateTime<Utc>) {
        let mut objects = self.objects.write().await;
        objects.insert(name.to_string(), (created_at, bytes));
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn ensure_container(&self) -> Result<()> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredObject>> {
        let objects = self.objects.read().await;
        let mut listed: Vec<StoredObject> = objects
            .iter()
            .map(|(name, (created_at, _))| StoredObject {
                name: name.clone(),
                created_at: *created_at,
            })
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>> {
        let objects = self.objects.read().await;
        objects
            .get(name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| PipelineError::not_found(format!("object '{}'", name)))
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let mut objects = self.objects.write().await;
        debug!(object = name, bytes = bytes.len(), "storing object");
        objects.insert(name.to_string(), (Utc::now(), bytes));
        Ok(())
    }
}

/// S3-backed store. The container maps to a bucket; object creation dates
/// come from the object's last-modified time, which under overwrite
/// semantics is the time of the winning write.
#[cfg(feature = "aws")]
pub struct S3Store {
    client: S3Client,
    bucket: String,
}

#[cfg(feature = "aws")]
impl S3Store {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        S3Store {
            client,
            bucket: bucket.into(),
        }
    }

    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        S3Store {
            client: S3Client::new(&config),
            bucket: bucket.into(),
        }
    }
}

#[cfg(feature = "aws")]
#[async_trait]
impl ObjectStore for S3Store {
    async fn ensure_container(&self) -> Result<()> {
        let exists = self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok();
        if exists {
            return Ok(());
        }
        info!(bucket = %self.bucket, "creating storage container");
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| PipelineError::storage(format!("failed to create bucket: {}", e)))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredObject>> {
        let mut listed = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(continuation) = &token {
                request = request.continuation_token(continuation);
            }
            let response = request
                .send()
                .await
                .map_err(|e| PipelineError::storage(format!("failed to list objects: {}", e)))?;
            for object in response.contents() {
                let Some(name) = object.key() else { continue };
                let created_at = object
                    .last_modified()
                    .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos()))
                    .unwrap_or_else(Utc::now);
                listed.push(StoredObject {
                    name: name.to_string(),
                    created_at,
                });
            }
            token = match (response.is_truncated(), response.next_continuation_token()) {
                (Some(true), Some(continuation)) => Some(continuation.to_string()),
                _ => break,
            };
        }
        Ok(listed)
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| PipelineError::storage(format!("failed to get '{}': {}", name, e)))?;
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| PipelineError::storage(format!("failed to read '{}': {}", name, e)))?;
        Ok(data.into_bytes().to_vec())
    }

    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| PipelineError::storage(format!("failed to put '{}': {}", name, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.put("a.csv", b"alpha".to_vec()).await.unwrap();
        store.put("b.csv", b"beta".to_vec()).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "a.csv");
        assert_eq!(store.get("a.csv").await.unwrap(), b"alpha");
    }

    #[tokio::test]
    async fn overwrite_replaces_content() {
        let store = MemoryStore::new();
        store.put("a.csv", b"old".to_vec()).await.unwrap();
        store.put("a.csv", b"new".to_vec()).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.get("a.csv").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let store = MemoryStore::new();
        let error = store.get("missing.csv").await.unwrap_err();
        assert!(matches!(error, PipelineError::NotFoundError(_)));
    }
}
