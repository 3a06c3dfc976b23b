//! # Secret Repository Trait
//!
//! シークレット（Secret Manager）取得を抽象化

use async_trait::async_trait;

use crate::domain::error::GcpError;

/// シークレットリポジトリ
#[async_trait]
pub trait SecretRepository: Send + Sync {
    /// シークレットバージョンのペイロードを取得
    ///
    /// # Arguments
    ///
    /// * `name` - `projects/{p}/secrets/{id}/versions/{v}` 形式のリソース名
    async fn access_secret_version(&self, name: &str) -> Result<Vec<u8>, GcpError>;
}
