//! # Write Cloud Log Use Case
//!
//! Cloud Logging へのテキストログ書き込み

use std::sync::Arc;

use log::log;

use crate::domain::entities::severity::Severity;
use crate::domain::error::GcpError;
use crate::domain::repositories::log_sink_repository::LogSinkRepository;

pub const DEFAULT_LOG_ID: &str = "default_logger";

/// クラウドログ書き込みユースケース
pub struct WriteCloudLogUseCase<L: LogSinkRepository> {
    sink: Arc<L>,
    log_name: String,
}

impl<L: LogSinkRepository> WriteCloudLogUseCase<L> {
    /// `default_logger` に書き込むユースケースを作成
    pub fn new(sink: Arc<L>, project_id: &str) -> Self {
        Self::with_log_id(sink, project_id, DEFAULT_LOG_ID)
    }

    pub fn with_log_id(sink: Arc<L>, project_id: &str, log_id: &str) -> Self {
        Self {
            sink,
            log_name: format!("projects/{}/logs/{}", project_id, log_id),
        }
    }

    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    /// テキストを1件書き込み、ローカルのロガーにも出力する
    ///
    /// # Arguments
    ///
    /// * `message` - 本文
    /// * `severity` - 重大度（`None` なら INFO）
    pub async fn log_text(
        &self,
        message: &str,
        severity: Option<Severity>,
    ) -> Result<(), GcpError> {
        let severity = severity.unwrap_or_default();
        self.sink
            .write_text(&self.log_name, message, severity)
            .await?;

        log!(
            severity.log_level(),
            "Logged: {} with severity {}",
            message,
            severity
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockLogSink {
        entries: Mutex<Vec<(String, String, Severity)>>,
        fail: bool,
    }

    #[async_trait]
    impl LogSinkRepository for MockLogSink {
        async fn write_text(
            &self,
            log_name: &str,
            message: &str,
            severity: Severity,
        ) -> Result<(), GcpError> {
            if self.fail {
                return Err(GcpError::Auth("missing logging.logEntries.create".to_string()));
            }
            self.entries.lock().unwrap().push((
                log_name.to_string(),
                message.to_string(),
                severity,
            ));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_log_text_default_severity() {
        let sink = Arc::new(MockLogSink::default());
        let use_case = WriteCloudLogUseCase::new(sink.clone(), "p1");

        use_case.log_text("This is a test log message.", None).await.unwrap();

        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "projects/p1/logs/default_logger");
        assert_eq!(entries[0].1, "This is a test log message.");
        assert_eq!(entries[0].2, Severity::Info);
    }

    #[tokio::test]
    async fn test_log_text_custom_log_and_severity() {
        let sink = Arc::new(MockLogSink::default());
        let use_case = WriteCloudLogUseCase::with_log_id(sink.clone(), "p1", "merges");

        use_case
            .log_text("merge failed", Some(Severity::Error))
            .await
            .unwrap();

        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries[0].0, "projects/p1/logs/merges");
        assert_eq!(entries[0].2, Severity::Error);
    }

    #[tokio::test]
    async fn test_log_text_propagates_errors() {
        let sink = Arc::new(MockLogSink {
            fail: true,
            ..Default::default()
        });
        let use_case = WriteCloudLogUseCase::new(sink, "p1");

        let err = use_case.log_text("x", None).await.unwrap_err();
        assert!(matches!(err, GcpError::Auth(_)));
    }
}
