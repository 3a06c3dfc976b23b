//! # Wait For Job Use Case
//!
//! ジョブ完了待ちユースケース
//!
//! `SUBMITTED -> (PENDING|RUNNING)* -> {SUCCEEDED, FAILED}` を呼び出し元のタスク上でポーリングする。
//! タイムアウトまたはキャンセル時はジョブのキャンセルを要求してから打ち切る。

use std::sync::Arc;

use log::{error, info, warn};
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::application::dto::poll_policy::PollPolicy;
use crate::domain::entities::job::{JobHandle, JobResult};
use crate::domain::error::GcpError;
use crate::domain::repositories::warehouse_repository::WarehouseRepository;

/// ジョブ完了待ちユースケース
pub struct WaitForJobUseCase<W: WarehouseRepository> {
    warehouse: Arc<W>,
    policy: PollPolicy,
}

impl<W: WarehouseRepository> WaitForJobUseCase<W> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `warehouse` - ウェアハウスリポジトリ
    /// * `policy` - ポーリング設定
    pub fn new(warehouse: Arc<W>, policy: PollPolicy) -> Self {
        Self { warehouse, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// ジョブが終了するまで待つ
    ///
    /// # Returns
    ///
    /// 成功したジョブの結果
    ///
    /// # Errors
    ///
    /// - `JobFailed`: サービスがエラーを報告した
    /// - `Timeout`: `policy.timeout` を超えた
    /// - `Cancelled`: `cancel` が発火した
    /// - ステータス取得自体の失敗はそのまま返す
    pub async fn execute(
        &self,
        handle: &JobHandle,
        cancel: &CancellationToken,
    ) -> Result<JobResult, GcpError> {
        self.execute_since(handle, cancel, Instant::now()).await
    }

    /// `started` から数えて `policy.timeout` までジョブの終了を待つ
    ///
    /// ステータス取得の途中でもキャンセル・タイムアウトで即座に打ち切る
    pub async fn execute_since(
        &self,
        handle: &JobHandle,
        cancel: &CancellationToken,
        started: Instant,
    ) -> Result<JobResult, GcpError> {
        let deadline = self.policy.deadline(started);
        let mut attempt = 0;

        loop {
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.abort_cancelled(handle).await);
                }
                status = self.warehouse.job_status(handle) => status?,
                _ = sleep_until(deadline) => {
                    return Err(self.abort_timed_out(handle, started).await);
                }
            };

            if status.is_done() {
                if !status.errors.is_empty() {
                    error!(
                        "Job {} failed: {}",
                        handle.job_id,
                        status.errors.join("; ")
                    );
                    return Err(GcpError::JobFailed {
                        job_id: handle.job_id.clone(),
                        errors: status.errors,
                    });
                }

                info!(
                    "Job {} completed in {:?}",
                    handle.job_id,
                    started.elapsed()
                );
                return Ok(JobResult {
                    job_id: handle.job_id.clone(),
                    affected_rows: status.affected_rows,
                });
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.abort_timed_out(handle, started).await);
            }

            let pause = self.policy.delay_for(attempt).min(deadline - now);
            info!(
                "Waiting for query job {} to complete ({:?}, next check in {:?})",
                handle.job_id, status.state, pause
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.abort_cancelled(handle).await);
                }
                _ = sleep(pause) => {}
            }

            attempt += 1;
        }
    }

    async fn abort_cancelled(&self, handle: &JobHandle) -> GcpError {
        warn!("Wait for job {} cancelled", handle.job_id);
        self.cancel_quietly(handle).await;
        GcpError::Cancelled {
            job_id: Some(handle.job_id.clone()),
        }
    }

    async fn abort_timed_out(&self, handle: &JobHandle, started: Instant) -> GcpError {
        let waited = started.elapsed();
        warn!("Job {} still running after {:?}, giving up", handle.job_id, waited);
        self.cancel_quietly(handle).await;
        GcpError::Timeout {
            job_id: Some(handle.job_id.clone()),
            waited,
        }
    }

    async fn cancel_quietly(&self, handle: &JobHandle) {
        if let Err(e) = self.warehouse.cancel_job(handle).await {
            warn!("Failed to cancel job {}: {}", handle.job_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::application::use_cases::test_support::{MockWarehouse, PROJECT};
    use crate::domain::entities::job::JobStatus;

    fn fast_policy() -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(1),
            Duration::from_millis(4),
            Duration::from_millis(50),
        )
    }

    fn handle() -> JobHandle {
        JobHandle::new(PROJECT, "job_42")
    }

    #[tokio::test]
    async fn test_wait_succeeds_after_running() {
        let mock = Arc::new(MockWarehouse::default());
        mock.push_status(Ok(JobStatus::pending()));
        mock.push_status(Ok(JobStatus::running()));
        mock.push_status(Ok(JobStatus::succeeded(Some(7))));

        let waiter = WaitForJobUseCase::new(mock.clone(), fast_policy());
        let result = waiter
            .execute(&handle(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.job_id, "job_42");
        assert_eq!(result.affected_rows, Some(7));
        assert!(mock.statuses.lock().unwrap().is_empty());
        assert!(mock.cancelled().is_empty());
    }

    #[tokio::test]
    async fn test_wait_reports_service_errors() {
        let mock = Arc::new(MockWarehouse::default());
        mock.push_status(Ok(JobStatus::failed(vec![
            "Query error: Unrecognized name: idx".to_string(),
        ])));

        let waiter = WaitForJobUseCase::new(mock, fast_policy());
        let err = waiter
            .execute(&handle(), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            GcpError::JobFailed { job_id, errors } => {
                assert_eq!(job_id, "job_42");
                assert_eq!(errors, vec!["Query error: Unrecognized name: idx".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wait_times_out_and_cancels_job() {
        // ステータスが尽きると running を返し続ける
        let mock = Arc::new(MockWarehouse::default());

        let waiter = WaitForJobUseCase::new(mock.clone(), fast_policy());
        let err = waiter
            .execute(&handle(), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            GcpError::Timeout { job_id, waited } => {
                assert_eq!(job_id.as_deref(), Some("job_42"));
                assert!(waited >= Duration::from_millis(50));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(mock.cancelled(), vec!["job_42".to_string()]);
    }

    #[tokio::test]
    async fn test_wait_cancelled_before_start() {
        let mock = Arc::new(MockWarehouse::default());
        let token = CancellationToken::new();
        token.cancel();

        let waiter = WaitForJobUseCase::new(mock.clone(), fast_policy());
        let err = waiter.execute(&handle(), &token).await.unwrap_err();

        assert!(matches!(err, GcpError::Cancelled { .. }));
        assert_eq!(mock.cancelled(), vec!["job_42".to_string()]);
    }

    #[tokio::test]
    async fn test_wait_cancelled_while_sleeping() {
        let mock = Arc::new(MockWarehouse::default());
        let policy = PollPolicy::new(
            Duration::from_secs(30),
            Duration::from_secs(30),
            Duration::from_secs(600),
        );
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let waiter = WaitForJobUseCase::new(mock.clone(), policy);
        let started = std::time::Instant::now();
        let err = waiter.execute(&handle(), &token).await.unwrap_err();

        assert!(matches!(err, GcpError::Cancelled { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(mock.cancelled().len(), 1);
    }

    #[tokio::test]
    async fn test_wait_propagates_status_errors() {
        let mock = Arc::new(MockWarehouse::default());
        mock.push_status(Err(GcpError::Auth("token expired".to_string())));

        let waiter = WaitForJobUseCase::new(mock, fast_policy());
        let err = waiter
            .execute(&handle(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GcpError::Auth(_)));
    }

    fn slow_status_mock() -> Arc<MockWarehouse> {
        let mock = Arc::new(MockWarehouse::default());
        *mock.status_delay.lock().unwrap() = Some(Duration::from_secs(3));
        mock
    }

    #[tokio::test]
    async fn test_timeout_interrupts_slow_status_call() {
        let mock = slow_status_mock();
        let policy = PollPolicy::new(
            Duration::from_millis(10),
            Duration::from_millis(10),
            Duration::from_millis(100),
        );

        let waiter = WaitForJobUseCase::new(mock.clone(), policy);
        let started = std::time::Instant::now();
        let err = waiter
            .execute(&handle(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GcpError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(mock.cancelled(), vec!["job_42".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_slow_status_call() {
        let mock = slow_status_mock();
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let waiter = WaitForJobUseCase::new(mock.clone(), PollPolicy::default());
        let started = std::time::Instant::now();
        let err = waiter.execute(&handle(), &token).await.unwrap_err();

        match err {
            GcpError::Cancelled { job_id } => assert_eq!(job_id.as_deref(), Some("job_42")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(mock.cancelled(), vec!["job_42".to_string()]);
    }

    #[tokio::test]
    async fn test_execute_since_counts_time_already_spent() {
        let mock = Arc::new(MockWarehouse::default());
        let earlier = Instant::now() - Duration::from_millis(60);

        let waiter = WaitForJobUseCase::new(mock.clone(), fast_policy());
        let err = waiter
            .execute_since(&handle(), &CancellationToken::new(), earlier)
            .await
            .unwrap_err();

        match err {
            GcpError::Timeout { waited, .. } => assert!(waited >= Duration::from_millis(50)),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
