//! # Access Secret Use Case
//!
//! シークレットの取得

use std::sync::Arc;

use crate::domain::error::GcpError;
use crate::domain::repositories::secret_repository::SecretRepository;

/// プロジェクトIDを指定しない場合に参照する環境変数
pub const PROJECT_ENV_VAR: &str = "PROJECT_NAME";
pub const LATEST_VERSION: &str = "latest";

/// シークレット取得ユースケース
pub struct AccessSecretUseCase<S: SecretRepository> {
    repository: Arc<S>,
    project_id: String,
}

impl<S: SecretRepository> AccessSecretUseCase<S> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `repository` - シークレットリポジトリ
    /// * `project_id` - プロジェクトID（`None` なら環境変数 `PROJECT_NAME`）
    ///
    /// # Errors
    ///
    /// どちらからもプロジェクトIDが得られない場合 `Config`
    pub fn new(repository: Arc<S>, project_id: Option<String>) -> Result<Self, GcpError> {
        let project_id = project_id
            .filter(|p| !p.is_empty())
            .or_else(|| std::env::var(PROJECT_ENV_VAR).ok().filter(|p| !p.is_empty()))
            .ok_or_else(|| {
                GcpError::Config(format!(
                    "Project ID must be provided or set in the environment variable {}",
                    PROJECT_ENV_VAR
                ))
            })?;

        Ok(Self {
            repository,
            project_id,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// シークレットバージョンのリソース名
    pub fn version_name(&self, secret_id: &str, version_id: &str) -> String {
        format!(
            "projects/{}/secrets/{}/versions/{}",
            self.project_id, secret_id, version_id
        )
    }

    /// シークレットを文字列として取得
    ///
    /// # Arguments
    ///
    /// * `secret_id` - シークレットID
    /// * `version_id` - バージョン（`None` なら "latest"）
    ///
    /// # Errors
    ///
    /// ペイロードがUTF-8でない場合 `InvalidInput`
    pub async fn access_secret(
        &self,
        secret_id: &str,
        version_id: Option<&str>,
    ) -> Result<String, GcpError> {
        let name = self.version_name(secret_id, version_id.unwrap_or(LATEST_VERSION));
        let payload = self.repository.access_secret_version(&name).await?;

        String::from_utf8(payload).map_err(|_| {
            GcpError::InvalidInput(format!("secret {} is not valid UTF-8", secret_id))
        })
    }
}
