//! # Manage Blobs Use Case
//!
//! バケット・オブジェクト操作

use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::domain::entities::blob::{BlobInfo, UploadOutcome};
use crate::domain::entities::schema::Provisioned;
use crate::domain::error::GcpError;
use crate::domain::repositories::object_store_repository::ObjectStoreRepository;
use crate::domain::services::blob_filter::BlobFilter;

/// オブジェクト管理ユースケース
pub struct ManageBlobsUseCase<S: ObjectStoreRepository> {
    store: Arc<S>,
}

impl<S: ObjectStoreRepository> ManageBlobsUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// バケット名一覧
    pub async fn list_buckets(&self) -> Result<Vec<String>, GcpError> {
        self.store.list_buckets().await
    }

    /// バケットを作成（既に存在してもエラーにしない）
    pub async fn create_bucket(&self, bucket: &str) -> Result<Provisioned, GcpError> {
        let outcome = self.store.create_bucket(bucket).await?;
        match outcome {
            Provisioned::Created => info!("Bucket '{}' created successfully.", bucket),
            Provisioned::AlreadyExisted => info!("Bucket '{}' already exists.", bucket),
        }
        Ok(outcome)
    }

    /// 文字列をオブジェクトとしてアップロード
    ///
    /// 既存オブジェクトがあり `overwrite` が false の場合は何もしない
    pub async fn put_blob_from_string(
        &self,
        bucket: &str,
        content: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<UploadOutcome, GcpError> {
        if !overwrite && self.store.get_blob_info(bucket, name).await?.is_some() {
            info!(
                "Blob '{}' already exists. To overwrite, set overwrite=true.",
                name
            );
            return Ok(UploadOutcome::SkippedExisting);
        }

        let blob = self
            .store
            .upload(bucket, name, content.as_bytes().to_vec())
            .await?;
        info!("Object uploaded to {} in bucket {}", name, bucket);
        Ok(UploadOutcome::Uploaded(blob))
    }

    /// オブジェクトをローカルファイルへダウンロード
    pub async fn get_blob(
        &self,
        bucket: &str,
        name: &str,
        destination: &Path,
    ) -> Result<u64, GcpError> {
        let data = self.store.download(bucket, name).await?;
        tokio::fs::write(destination, &data).await?;
        info!("Blob '{}' downloaded to '{}'.", name, destination.display());
        Ok(data.len() as u64)
    }

    /// オブジェクトをメモリへダウンロード
    pub async fn download_blob_to_memory(
        &self,
        bucket: &str,
        name: &str,
    ) -> Result<Vec<u8>, GcpError> {
        let data = self.store.download(bucket, name).await?;
        info!("Blob '{}' downloaded to memory.", name);
        Ok(data)
    }

    /// バケット内のオブジェクト名一覧
    pub async fn list_blobs(&self, bucket: &str) -> Result<Vec<String>, GcpError> {
        let blobs = self.store.list_blobs(bucket).await?;
        Ok(blobs.into_iter().map(|b| b.name).collect())
    }

    /// 除外パターンに一致しない最初のオブジェクトを選ぶ
    ///
    /// オブジェクトは削除しない
    ///
    /// # Arguments
    ///
    /// * `bucket` - バケット名
    /// * `patterns_file` - 1行1つの正規表現を書いたファイル（任意）
    pub async fn pop_blob(
        &self,
        bucket: &str,
        patterns_file: Option<&Path>,
    ) -> Result<Option<BlobInfo>, GcpError> {
        let filter = match patterns_file {
            Some(path) => BlobFilter::from_lines(&tokio::fs::read_to_string(path).await?)?,
            None => BlobFilter::default(),
        };

        let blobs = self.store.list_blobs(bucket).await?;
        if blobs.is_empty() {
            info!("No blobs found in bucket '{}'.", bucket);
            return Ok(None);
        }

        match filter.first_allowed(&blobs, |b| b.name.as_str()) {
            Some(blob) => {
                info!("First valid blob selected: {}", blob.name);
                Ok(Some(blob.clone()))
            }
            None => {
                info!("No valid blobs found after applying regex patterns.");
                Ok(None)
            }
        }
    }

    /// オブジェクトをコピー
    pub async fn copy_blob(
        &self,
        source_bucket: &str,
        source_name: &str,
        destination_bucket: &str,
        destination_name: &str,
    ) -> Result<BlobInfo, GcpError> {
        let copied = self
            .store
            .copy(source_bucket, source_name, destination_bucket, destination_name)
            .await?;
        info!(
            "Blob {}/{} copied to {}/{}",
            source_bucket, source_name, destination_bucket, destination_name
        );
        Ok(copied)
    }

    /// オブジェクトを削除
    pub async fn delete_blob(&self, bucket: &str, name: &str) -> Result<(), GcpError> {
        self.store.delete(bucket, name).await?;
        info!("Blob {}/{} deleted", bucket, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    /// (bucket, name) -> data
    #[derive(Default)]
    struct MockObjectStore {
        buckets: Mutex<HashSet<String>>,
        objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
        uploads: Mutex<u32>,
    }

    impl MockObjectStore {
        fn with_objects(bucket: &str, names: &[&str]) -> Self {
            let store = Self::default();
            store.buckets.lock().unwrap().insert(bucket.to_string());
            for name in names {
                store
                    .objects
                    .lock()
                    .unwrap()
                    .insert((bucket.to_string(), name.to_string()), b"{}".to_vec());
            }
            store
        }

        fn info(bucket: &str, name: &str, data: &[u8]) -> BlobInfo {
            BlobInfo {
                bucket: bucket.to_string(),
                name: name.to_string(),
                size: data.len() as i64,
                content_type: None,
            }
        }
    }

    #[async_trait]
    impl ObjectStoreRepository for MockObjectStore {
        async fn list_buckets(&self) -> Result<Vec<String>, GcpError> {
            let mut names: Vec<String> = self.buckets.lock().unwrap().iter().cloned().collect();
            names.sort();
            Ok(names)
        }

        async fn create_bucket(&self, bucket: &str) -> Result<Provisioned, GcpError> {
            if self.buckets.lock().unwrap().insert(bucket.to_string()) {
                Ok(Provisioned::Created)
            } else {
                Ok(Provisioned::AlreadyExisted)
            }
        }

        async fn get_blob_info(
            &self,
            bucket: &str,
            name: &str,
        ) -> Result<Option<BlobInfo>, GcpError> {
            Ok(self
                .objects
                .lock()
                .unwrap()
                .get(&(bucket.to_string(), name.to_string()))
                .map(|data| Self::info(bucket, name, data)))
        }

        async fn upload(
            &self,
            bucket: &str,
            name: &str,
            data: Vec<u8>,
        ) -> Result<BlobInfo, GcpError> {
            *self.uploads.lock().unwrap() += 1;
            let info = Self::info(bucket, name, &data);
            self.objects
                .lock()
                .unwrap()
                .insert((bucket.to_string(), name.to_string()), data);
            Ok(info)
        }

        async fn download(&self, bucket: &str, name: &str) -> Result<Vec<u8>, GcpError> {
            self.objects
                .lock()
                .unwrap()
                .get(&(bucket.to_string(), name.to_string()))
                .cloned()
                .ok_or_else(|| GcpError::NotFound {
                    resource: format!("gs://{}/{}", bucket, name),
                })
        }

        async fn list_blobs(&self, bucket: &str) -> Result<Vec<BlobInfo>, GcpError> {
            Ok(self
                .objects
                .lock()
                .unwrap()
                .iter()
                .filter(|((b, _), _)| b == bucket)
                .map(|((b, n), data)| Self::info(b, n, data))
                .collect())
        }

        async fn copy(
            &self,
            source_bucket: &str,
            source_name: &str,
            destination_bucket: &str,
            destination_name: &str,
        ) -> Result<BlobInfo, GcpError> {
            let data = self.download(source_bucket, source_name).await?;
            self.upload(destination_bucket, destination_name, data).await
        }

        async fn delete(&self, bucket: &str, name: &str) -> Result<(), GcpError> {
            self.objects
                .lock()
                .unwrap()
                .remove(&(bucket.to_string(), name.to_string()))
                .map(|_| ())
                .ok_or_else(|| GcpError::NotFound {
                    resource: format!("gs://{}/{}", bucket, name),
                })
        }
    }

    #[tokio::test]
    async fn test_create_bucket_exists_ok() {
        let store = Arc::new(MockObjectStore::default());
        let use_case = ManageBlobsUseCase::new(store);

        assert_eq!(
            use_case.create_bucket("raw-data").await.unwrap(),
            Provisioned::Created
        );
        assert_eq!(
            use_case.create_bucket("raw-data").await.unwrap(),
            Provisioned::AlreadyExisted
        );
        assert_eq!(use_case.list_buckets().await.unwrap(), vec!["raw-data"]);
    }

    #[tokio::test]
    async fn test_put_blob_skips_existing_without_overwrite() {
        let store = Arc::new(MockObjectStore::with_objects("raw", &["a.json"]));
        let use_case = ManageBlobsUseCase::new(store.clone());

        let outcome = use_case
            .put_blob_from_string("raw", "new content", "a.json", false)
            .await
            .unwrap();

        assert_eq!(outcome, UploadOutcome::SkippedExisting);
        assert_eq!(*store.uploads.lock().unwrap(), 0);
        assert_eq!(
            use_case.download_blob_to_memory("raw", "a.json").await.unwrap(),
            b"{}".to_vec()
        );
    }

    #[tokio::test]
    async fn test_put_blob_overwrites_when_asked() {
        let store = Arc::new(MockObjectStore::with_objects("raw", &["a.json"]));
        let use_case = ManageBlobsUseCase::new(store.clone());

        let outcome = use_case
            .put_blob_from_string("raw", "new content", "a.json", true)
            .await
            .unwrap();

        assert!(matches!(outcome, UploadOutcome::Uploaded(ref b) if b.size == 11));
        assert_eq!(
            use_case.download_blob_to_memory("raw", "a.json").await.unwrap(),
            b"new content".to_vec()
        );
    }

    #[tokio::test]
    async fn test_pop_blob_applies_patterns_file() {
        let store = Arc::new(MockObjectStore::with_objects(
            "raw",
            &["a_processed.json", "b.json", "c.json"],
        ));
        let use_case = ManageBlobsUseCase::new(store.clone());

        let dir = tempfile::TempDir::new().unwrap();
        let patterns = dir.path().join("patterns.txt");
        std::fs::write(&patterns, "_processed\n\n").unwrap();

        let blob = use_case.pop_blob("raw", Some(&patterns)).await.unwrap();

        assert_eq!(blob.map(|b| b.name), Some("b.json".to_string()));
        // 選ぶだけで削除はしない
        assert_eq!(use_case.list_blobs("raw").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_pop_blob_empty_and_all_excluded() {
        let store = Arc::new(MockObjectStore::with_objects("raw", &["tmp/a"]));
        let use_case = ManageBlobsUseCase::new(store);

        assert!(use_case.pop_blob("empty", None).await.unwrap().is_none());

        let dir = tempfile::TempDir::new().unwrap();
        let patterns = dir.path().join("patterns.txt");
        std::fs::write(&patterns, "^tmp/").unwrap();
        assert!(use_case.pop_blob("raw", Some(&patterns)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pop_blob_missing_patterns_file() {
        let store = Arc::new(MockObjectStore::with_objects("raw", &["a"]));
        let use_case = ManageBlobsUseCase::new(store);

        let result = use_case
            .pop_blob("raw", Some(Path::new("/nonexistent/patterns.txt")))
            .await;

        assert!(matches!(result, Err(GcpError::Io(_))));
    }

    #[tokio::test]
    async fn test_get_blob_writes_file() {
        let store = Arc::new(MockObjectStore::with_objects("raw", &["a.json"]));
        let use_case = ManageBlobsUseCase::new(store);

        let dir = tempfile::TempDir::new().unwrap();
        let destination = dir.path().join("a.json");
        let written = use_case.get_blob("raw", "a.json", &destination).await.unwrap();

        assert_eq!(written, 2);
        assert_eq!(std::fs::read(&destination).unwrap(), b"{}".to_vec());
    }

    #[tokio::test]
    async fn test_copy_and_delete() {
        let store = Arc::new(MockObjectStore::with_objects("raw", &["a.json"]));
        let use_case = ManageBlobsUseCase::new(store);

        let copied = use_case
            .copy_blob("raw", "a.json", "archive", "2024/a.json")
            .await
            .unwrap();
        assert_eq!(copied.bucket, "archive");

        use_case.delete_blob("raw", "a.json").await.unwrap();
        assert!(use_case.list_blobs("raw").await.unwrap().is_empty());

        let err = use_case.delete_blob("raw", "a.json").await.unwrap_err();
        assert!(matches!(err, GcpError::NotFound { .. }));
    }
}
