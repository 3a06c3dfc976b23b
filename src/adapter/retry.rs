//! Retry Logic and Error Classification
//!
//! リトライロジックとエラー分類

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::domain::error::GcpError;

// Retry configuration based on Google Cloud best practices
// See: https://cloud.google.com/bigquery/docs/error-messages
pub const MAX_RETRIES: u32 = 5;
pub const INITIAL_RETRY_DELAY_MS: u64 = 1000; // 1 second
pub const MAX_RETRY_DELAY_MS: u64 = 32000; // 32 seconds max
pub const BATCH_DELAY_MS: u64 = 200; // 200ms between insert batches to avoid rate limits

/// リトライ設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_delay_ms: INITIAL_RETRY_DELAY_MS,
            max_delay_ms: MAX_RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// `retry_count` 回目（1始まり）のリトライ前の待機時間
    pub fn delay_ms(&self, retry_count: u32) -> u64 {
        let shift = retry_count.saturating_sub(1).min(20);
        std::cmp::min(self.initial_delay_ms.saturating_mul(1 << shift), self.max_delay_ms)
    }
}

/// 一時的なエラー（`GcpError::Transport`）の間だけ操作をリトライ
///
/// それ以外のエラーは即座に返す
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut f: F,
) -> Result<T, GcpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GcpError>>,
{
    let mut retry_count = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retry_count < policy.max_retries => {
                retry_count += 1;
                let delay = policy.delay_ms(retry_count);
                warn!(
                    "{} failed (attempt {}/{}), retrying in {}ms: {}",
                    operation, retry_count, policy.max_retries, delay, e
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Check if an error is a dropped or refused connection
pub fn is_connection_error(error_msg: &str) -> bool {
    error_msg.contains("Broken pipe")
        || error_msg.contains("broken pipe")
        || error_msg.contains("Connection reset")
        || error_msg.contains("connection reset")
        || error_msg.contains("Connection refused")
        || error_msg.contains("connection refused")
        || error_msg.contains("connection error")
        || error_msg.contains("error sending request")
        || error_msg.contains("EOF")
        || error_msg.contains("unexpected end of file")
}

/// Check if an error is a quota or rate limit rejection
pub fn is_rate_limit_error(error_msg: &str) -> bool {
    let lower = error_msg.to_lowercase();
    lower.contains("rate limit") || lower.contains("ratelimit") || lower.contains("quota")
}

const TRANSIENT_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

const TRANSIENT_STATUS_PHRASES: [&str; 5] = [
    "Too Many Requests",
    "Internal Server Error",
    "Bad Gateway",
    "Service Unavailable",
    "Gateway Timeout",
];

/// ステータスコードが HTTP ステータスとして現れているか
///
/// "HTTP 503" / "status 503" / "status: 503" の形のみ。本文中の数値とは区別する
fn has_transient_status(error_msg: &str) -> bool {
    let lower = error_msg.to_lowercase();
    TRANSIENT_STATUS_CODES.iter().any(|code| {
        lower.contains(&format!("http {}", code))
            || lower.contains(&format!("status {}", code))
            || lower.contains(&format!("status: {}", code))
    })
}

/// Check if an error is transient (server side or throttling)
pub fn is_transient_error(error_msg: &str) -> bool {
    has_transient_status(error_msg)
        || TRANSIENT_STATUS_PHRASES
            .iter()
            .any(|phrase| error_msg.contains(phrase))
        || is_rate_limit_error(error_msg)
        || error_msg.contains("timeout")
        || error_msg.contains("Timeout")
        || error_msg.contains("timed out")
}

/// Check if an error message indicates a retryable error
pub fn is_retryable_error(error_msg: &str) -> bool {
    is_connection_error(error_msg) || is_transient_error(error_msg)
}

/// Check if an error message indicates missing or rejected credentials
pub fn is_auth_error(error_msg: &str) -> bool {
    let lower = error_msg.to_lowercase();
    lower.contains("credential")
        || lower.contains("token")
        || lower.contains("unauthenticated")
        || lower.contains("permission denied")
}

/// Check if an error indicates the request was too large (413)
pub fn is_request_too_large_error(error_msg: &str) -> bool {
    error_msg.contains("413") || error_msg.contains("Request Entity Too Large")
}
