//! # Object Store Repository Trait
//!
//! オブジェクトストレージ（Cloud Storage）操作を抽象化

use async_trait::async_trait;

use crate::domain::entities::blob::BlobInfo;
use crate::domain::entities::schema::Provisioned;
use crate::domain::error::GcpError;

/// オブジェクトストレージリポジトリ
#[async_trait]
pub trait ObjectStoreRepository: Send + Sync {
    /// プロジェクト内のバケット名一覧
    async fn list_buckets(&self) -> Result<Vec<String>, GcpError>;

    /// バケットを作成（既に存在する場合もエラーにしない）
    async fn create_bucket(&self, bucket: &str) -> Result<Provisioned, GcpError>;

    /// オブジェクトのメタデータを取得（存在しなければ `None`）
    async fn get_blob_info(&self, bucket: &str, name: &str) -> Result<Option<BlobInfo>, GcpError>;

    /// オブジェクトをアップロード
    async fn upload(&self, bucket: &str, name: &str, data: Vec<u8>) -> Result<BlobInfo, GcpError>;

    /// オブジェクトをダウンロード
    async fn download(&self, bucket: &str, name: &str) -> Result<Vec<u8>, GcpError>;

    /// バケット内のオブジェクト一覧（全ページ）
    async fn list_blobs(&self, bucket: &str) -> Result<Vec<BlobInfo>, GcpError>;

    /// オブジェクトをコピー
    async fn copy(
        &self,
        source_bucket: &str,
        source_name: &str,
        destination_bucket: &str,
        destination_name: &str,
    ) -> Result<BlobInfo, GcpError>;

    /// オブジェクトを削除
    async fn delete(&self, bucket: &str, name: &str) -> Result<(), GcpError>;
}
