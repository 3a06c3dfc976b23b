//! # Log Sink Repository Trait
//!
//! クラウドログ（Cloud Logging）への書き込みを抽象化

use async_trait::async_trait;

use crate::domain::entities::severity::Severity;
use crate::domain::error::GcpError;

/// ログシンクリポジトリ
#[async_trait]
pub trait LogSinkRepository: Send + Sync {
    /// テキストのログエントリを1件書き込む
    ///
    /// # Arguments
    ///
    /// * `log_name` - `projects/{p}/logs/{id}` 形式のログ名
    /// * `message` - 本文
    /// * `severity` - 重大度
    async fn write_text(
        &self,
        log_name: &str,
        message: &str,
        severity: Severity,
    ) -> Result<(), GcpError>;
}
