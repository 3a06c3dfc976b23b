//! GCP Authentication
//!
//! Google Cloud Platform認証機能
//!
//! 認証情報は実行環境のもの（ADC）か、サービスアカウントキーファイルのどちらか。
//! キーファイルを使う場合は `GOOGLE_APPLICATION_CREDENTIALS` に設定し、
//! 各SDKクライアントがそれを読み込む。

use std::path::Path;

use google_cloud_bigquery::client::{Client as BigQuerySdkClient, ClientConfig as BigQueryConfig};
use google_cloud_logging_v2::client::LoggingServiceV2;
use google_cloud_secretmanager_v1::client::SecretManagerService;
use google_cloud_storage::client::{Client as StorageClient, ClientConfig as StorageConfig};
use log::info;

use crate::adapter::bigquery::client::BigQueryClient;
use crate::adapter::error::classify_message;
use crate::domain::error::GcpError;

pub const CREDENTIALS_ENV_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Expands tilde in path and returns the full path
pub fn expand_key_path(key_path: &str) -> String {
    shellexpand::tilde(key_path).to_string()
}

/// 認証情報の取得元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// 実行環境の認証情報（Application Default Credentials）
    Ambient,
    /// サービスアカウントキーファイル
    KeyFile(String),
}

impl Credentials {
    /// `--local` フラグとキーパスから決定
    pub fn from_flags(local: bool, key_path: &str) -> Self {
        if local {
            Credentials::KeyFile(expand_key_path(key_path))
        } else {
            Credentials::Ambient
        }
    }

    /// キーファイルを使う場合は環境変数に設定する
    ///
    /// # Errors
    ///
    /// キーファイルが存在しなければ `Config`
    pub fn apply(&self) -> Result<(), GcpError> {
        match self {
            Credentials::Ambient => Ok(()),
            Credentials::KeyFile(path) => {
                if !Path::new(path).is_file() {
                    return Err(GcpError::Config(format!(
                        "service account key file not found: {}",
                        path
                    )));
                }
                std::env::set_var(CREDENTIALS_ENV_VAR, path);
                info!("Using service account key {}", path);
                Ok(())
            }
        }
    }
}

/// Creates a BigQuery client
///
/// # Returns
///
/// クライアントと、認証情報から判明したプロジェクトID
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn create_bigquery_client(
    credentials: &Credentials,
) -> Result<(BigQueryClient, Option<String>), GcpError> {
    credentials.apply()?;

    let (config, project_id) = BigQueryConfig::new_with_auth()
        .await
        .map_err(|e| GcpError::Auth(format!("Failed to authenticate: {}", e)))?;

    let client = BigQuerySdkClient::new(config)
        .await
        .map_err(|e| classify_message(&format!("Failed to create BigQuery client: {}", e)))?;

    Ok((BigQueryClient::new(client), project_id))
}

/// Creates a Cloud Storage client
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn create_storage_client(credentials: &Credentials) -> Result<StorageClient, GcpError> {
    credentials.apply()?;

    let config = StorageConfig::default()
        .with_auth()
        .await
        .map_err(|e| GcpError::Auth(format!("Failed to authenticate: {}", e)))?;

    Ok(StorageClient::new(config))
}

/// Creates a Secret Manager client
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn create_secret_manager_client(
    credentials: &Credentials,
) -> Result<SecretManagerService, GcpError> {
    credentials.apply()?;

    SecretManagerService::builder()
        .build()
        .await
        .map_err(|e| GcpError::Auth(format!("Failed to create Secret Manager client: {}", e)))
}

/// Creates a Cloud Logging client
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn create_logging_client(credentials: &Credentials) -> Result<LoggingServiceV2, GcpError> {
    credentials.apply()?;

    LoggingServiceV2::builder()
        .build()
        .await
        .map_err(|e| GcpError::Auth(format!("Failed to create Cloud Logging client: {}", e)))
}
