//! Cloud Storage Object Store Repository Implementation
//!
//! ObjectStoreRepositoryのCloud Storage実装

use async_trait::async_trait;
use google_cloud_storage::client::Client;
use google_cloud_storage::http::buckets::insert::{InsertBucketParam, InsertBucketRequest};
use google_cloud_storage::http::buckets::list::ListBucketsRequest;
use google_cloud_storage::http::objects::copy::CopyObjectRequest;
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::list::ListObjectsRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use google_cloud_storage::http::objects::Object;
use google_cloud_storage::http::Error as StorageError;

use crate::adapter::error::{classify_message, classify_status};
use crate::adapter::retry::{with_retry, RetryPolicy};
use crate::domain::entities::blob::BlobInfo;
use crate::domain::entities::schema::Provisioned;
use crate::domain::error::GcpError;
use crate::domain::repositories::object_store_repository::ObjectStoreRepository;

/// Cloud Storage のエラーを `GcpError` に変換
pub fn map_storage_error(err: StorageError, resource: &str) -> GcpError {
    match err {
        StorageError::Response(response) => {
            classify_status(response.code, &response.message, resource)
        }
        other => classify_message(&other.to_string()),
    }
}

/// オブジェクトのメタデータをドメインの `BlobInfo` に変換
pub fn to_blob_info(object: Object) -> BlobInfo {
    BlobInfo {
        bucket: object.bucket,
        name: object.name,
        size: object.size,
        content_type: object.content_type,
    }
}

fn object_path(bucket: &str, name: &str) -> String {
    format!("gs://{}/{}", bucket, name)
}

/// Cloud Storage リポジトリ
pub struct GcsObjectStoreRepository {
    client: Client,
    project_id: String,
    retry: RetryPolicy,
}

impl GcsObjectStoreRepository {
    pub fn new(client: Client, project_id: impl Into<String>) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl ObjectStoreRepository for GcsObjectStoreRepository {
    async fn list_buckets(&self) -> Result<Vec<String>, GcpError> {
        let client = &self.client;
        let project = self.project_id.as_str();
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let request = ListBucketsRequest {
                project: project.to_string(),
                page_token: page_token.clone(),
                ..Default::default()
            };
            let request = &request;

            let response = with_retry(&self.retry, "list buckets", move || async move {
                client
                    .list_buckets(request)
                    .await
                    .map_err(|e| map_storage_error(e, project))
            })
            .await?;

            names.extend(response.items.into_iter().map(|bucket| bucket.name));
            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(names)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<Provisioned, GcpError> {
        let client = &self.client;
        let request = InsertBucketRequest {
            name: bucket.to_string(),
            param: InsertBucketParam {
                project: self.project_id.clone(),
                ..Default::default()
            },
            ..Default::default()
        };
        let request = &request;
        let resource = format!("gs://{}", bucket);
        let resource = resource.as_str();

        let result = with_retry(&self.retry, "create bucket", move || async move {
            client
                .insert_bucket(request)
                .await
                .map_err(|e| map_storage_error(e, resource))
        })
        .await;

        match result {
            Ok(_) => Ok(Provisioned::Created),
            Err(GcpError::AlreadyExists { .. }) => Ok(Provisioned::AlreadyExisted),
            Err(e) => Err(e),
        }
    }

    async fn get_blob_info(&self, bucket: &str, name: &str) -> Result<Option<BlobInfo>, GcpError> {
        let client = &self.client;
        let request = GetObjectRequest {
            bucket: bucket.to_string(),
            object: name.to_string(),
            ..Default::default()
        };
        let request = &request;
        let resource = object_path(bucket, name);
        let resource = resource.as_str();

        let result = with_retry(&self.retry, "get object", move || async move {
            client
                .get_object(request)
                .await
                .map_err(|e| map_storage_error(e, resource))
        })
        .await;

        match result {
            Ok(object) => Ok(Some(to_blob_info(object))),
            Err(GcpError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn upload(&self, bucket: &str, name: &str, data: Vec<u8>) -> Result<BlobInfo, GcpError> {
        let client = &self.client;
        let request = UploadObjectRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };
        let request = &request;
        let data = &data;
        let resource = object_path(bucket, name);
        let resource = resource.as_str();

        let object = with_retry(&self.retry, "upload object", move || async move {
            let upload_type = UploadType::Simple(Media::new(name.to_string()));
            client
                .upload_object(request, data.clone(), &upload_type)
                .await
                .map_err(|e| map_storage_error(e, resource))
        })
        .await?;

        Ok(to_blob_info(object))
    }

    async fn download(&self, bucket: &str, name: &str) -> Result<Vec<u8>, GcpError> {
        let client = &self.client;
        let request = GetObjectRequest {
            bucket: bucket.to_string(),
            object: name.to_string(),
            ..Default::default()
        };
        let request = &request;
        let resource = object_path(bucket, name);
        let resource = resource.as_str();

        with_retry(&self.retry, "download object", move || async move {
            client
                .download_object(request, &Range::default())
                .await
                .map_err(|e| map_storage_error(e, resource))
        })
        .await
    }

    async fn list_blobs(&self, bucket: &str) -> Result<Vec<BlobInfo>, GcpError> {
        let client = &self.client;
        let resource = format!("gs://{}", bucket);
        let resource = resource.as_str();
        let mut blobs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let request = ListObjectsRequest {
                bucket: bucket.to_string(),
                page_token: page_token.clone(),
                ..Default::default()
            };
            let request = &request;

            let response = with_retry(&self.retry, "list objects", move || async move {
                client
                    .list_objects(request)
                    .await
                    .map_err(|e| map_storage_error(e, resource))
            })
            .await?;

            blobs.extend(response.items.unwrap_or_default().into_iter().map(to_blob_info));
            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(blobs)
    }

    async fn copy(
        &self,
        source_bucket: &str,
        source_name: &str,
        destination_bucket: &str,
        destination_name: &str,
    ) -> Result<BlobInfo, GcpError> {
        let client = &self.client;
        let request = CopyObjectRequest {
            source_bucket: source_bucket.to_string(),
            source_object: source_name.to_string(),
            destination_bucket: destination_bucket.to_string(),
            destination_object: destination_name.to_string(),
            ..Default::default()
        };
        let request = &request;
        let resource = object_path(source_bucket, source_name);
        let resource = resource.as_str();

        let object = with_retry(&self.retry, "copy object", move || async move {
            client
                .copy_object(request)
                .await
                .map_err(|e| map_storage_error(e, resource))
        })
        .await?;

        Ok(to_blob_info(object))
    }

    async fn delete(&self, bucket: &str, name: &str) -> Result<(), GcpError> {
        let client = &self.client;
        let request = DeleteObjectRequest {
            bucket: bucket.to_string(),
            object: name.to_string(),
            ..Default::default()
        };
        let request = &request;
        let resource = object_path(bucket, name);
        let resource = resource.as_str();

        with_retry(&self.retry, "delete object", move || async move {
            client
                .delete_object(request)
                .await
                .map_err(|e| map_storage_error(e, resource))
        })
        .await
    }
}
