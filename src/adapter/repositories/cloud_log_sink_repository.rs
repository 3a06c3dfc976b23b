//! Cloud Logging Sink Repository Implementation
//!
//! LogSinkRepositoryのCloud Logging実装

use async_trait::async_trait;
use google_cloud_api::model::MonitoredResource;
use google_cloud_logging_type::model::LogSeverity;
use google_cloud_logging_v2::client::LoggingServiceV2;
use google_cloud_logging_v2::model::LogEntry;

use crate::adapter::error::map_gax_error;
use crate::adapter::retry::{with_retry, RetryPolicy};
use crate::domain::entities::severity::Severity;
use crate::domain::error::GcpError;
use crate::domain::repositories::log_sink_repository::LogSinkRepository;

/// エントリを紐づけるモニタリング対象リソースの種類
pub const RESOURCE_TYPE: &str = "global";

/// Convert a domain severity into the Cloud Logging enum
pub fn to_log_severity(severity: Severity) -> LogSeverity {
    match severity {
        Severity::Default => LogSeverity::Default,
        Severity::Debug => LogSeverity::Debug,
        Severity::Info => LogSeverity::Info,
        Severity::Notice => LogSeverity::Notice,
        Severity::Warning => LogSeverity::Warning,
        Severity::Error => LogSeverity::Error,
        Severity::Critical => LogSeverity::Critical,
        Severity::Alert => LogSeverity::Alert,
        Severity::Emergency => LogSeverity::Emergency,
    }
}

/// 実行ホスト名（取得できなければ "unknown"）
pub fn local_hostname() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Cloud Logging リポジトリ
///
/// 各エントリに実行ホスト名のラベルを付ける
pub struct CloudLogSinkRepository {
    client: LoggingServiceV2,
    hostname: String,
    retry: RetryPolicy,
}

impl CloudLogSinkRepository {
    pub fn new(client: LoggingServiceV2, hostname: impl Into<String>) -> Self {
        Self {
            client,
            hostname: hostname.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_local_hostname(client: LoggingServiceV2) -> Self {
        Self::new(client, local_hostname())
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl LogSinkRepository for CloudLogSinkRepository {
    async fn write_text(
        &self,
        log_name: &str,
        message: &str,
        severity: Severity,
    ) -> Result<(), GcpError> {
        let client = &self.client;
        let hostname = self.hostname.as_str();

        with_retry(&self.retry, "write log entry", move || async move {
            let entry = LogEntry::new()
                .set_text_payload(message)
                .set_severity(to_log_severity(severity));
            client
                .write_log_entries()
                .set_log_name(log_name)
                .set_resource(MonitoredResource::new().set_type(RESOURCE_TYPE))
                .set_labels([("hostname", hostname)])
                .set_entries([entry])
                .send()
                .await
                .map_err(|e| map_gax_error(e, log_name))
        })
        .await?;

        Ok(())
    }
}
