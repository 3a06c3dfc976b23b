//! Secret Manager Repository Implementation
//!
//! SecretRepositoryのSecret Manager実装

use async_trait::async_trait;
use google_cloud_secretmanager_v1::client::SecretManagerService;

use crate::adapter::error::map_gax_error;
use crate::adapter::retry::{with_retry, RetryPolicy};
use crate::domain::error::GcpError;
use crate::domain::repositories::secret_repository::SecretRepository;

/// Secret Manager リポジトリ
pub struct SecretManagerRepository {
    client: SecretManagerService,
    retry: RetryPolicy,
}

impl SecretManagerRepository {
    pub fn new(client: SecretManagerService) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl SecretRepository for SecretManagerRepository {
    async fn access_secret_version(&self, name: &str) -> Result<Vec<u8>, GcpError> {
        let client = &self.client;

        let response = with_retry(&self.retry, "access secret version", move || async move {
            client
                .access_secret_version()
                .set_name(name)
                .send()
                .await
                .map_err(|e| map_gax_error(e, name))
        })
        .await?;

        response
            .payload
            .map(|payload| payload.data.to_vec())
            .ok_or_else(|| GcpError::InvalidInput(format!("secret {} has no payload", name)))
    }
}
