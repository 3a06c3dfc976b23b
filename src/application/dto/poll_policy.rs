//! # Poll Policy DTO
//!
//! ジョブ完了待ちのポーリング設定

use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 8_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// `timeout` が極端に大きい場合の打ち切り時刻の上限
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// ポーリング設定
///
/// 待機間隔は `initial_delay` から倍々に伸び、`max_delay` で頭打ちになる。
/// 合計待機時間が `timeout` を超えたら打ち切る。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl PollPolicy {
    pub fn new(initial_delay: Duration, max_delay: Duration, timeout: Duration) -> Self {
        Self {
            initial_delay,
            max_delay: max_delay.max(initial_delay),
            timeout,
        }
    }

    /// 次の待機間隔
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }

    /// n回目（0始まり）のポーリング後の待機間隔
    pub fn delay_for(&self, attempt: u32) -> Duration {
        (0..attempt).fold(self.initial_delay.min(self.max_delay), |d, _| {
            self.next_delay(d)
        })
    }

    /// `started` から `timeout` 経過した時刻
    pub fn deadline(&self, started: Instant) -> Instant {
        started
            .checked_add(self.timeout)
            .unwrap_or_else(|| started + FAR_FUTURE)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }
}
