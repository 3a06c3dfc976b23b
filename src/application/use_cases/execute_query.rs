//! # Execute Query Use Case
//!
//! クエリ投入と完了待ち

use std::sync::Arc;

use log::{info, warn};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::application::dto::poll_policy::PollPolicy;
use crate::application::use_cases::wait_for_job::WaitForJobUseCase;
use crate::domain::entities::job::JobResult;
use crate::domain::error::GcpError;
use crate::domain::repositories::warehouse_repository::WarehouseRepository;

/// クエリ実行ユースケース
pub struct ExecuteQueryUseCase<W: WarehouseRepository> {
    warehouse: Arc<W>,
    waiter: WaitForJobUseCase<W>,
}

impl<W: WarehouseRepository> ExecuteQueryUseCase<W> {
    pub fn new(warehouse: Arc<W>, policy: PollPolicy) -> Self {
        let waiter = WaitForJobUseCase::new(warehouse.clone(), policy);
        Self { warehouse, waiter }
    }

    /// クエリを投入し、終了まで待つ
    ///
    /// タイムアウトは投入開始から数える。投入中にキャンセル・タイムアウトした場合は
    /// ジョブIDが分からないため `job_id: None` を返す。
    ///
    /// # Errors
    ///
    /// 投入の失敗、または [`WaitForJobUseCase::execute_since`] のエラー
    pub async fn execute_and_wait(
        &self,
        sql: &str,
        cancel: &CancellationToken,
    ) -> Result<JobResult, GcpError> {
        let started = Instant::now();
        let deadline = self.waiter.policy().deadline(started);

        let handle = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Query submission cancelled");
                return Err(GcpError::Cancelled { job_id: None });
            }
            submitted = self.warehouse.submit_query(sql) => submitted?,
            _ = sleep_until(deadline) => {
                warn!("Query submission did not finish within {:?}", started.elapsed());
                return Err(GcpError::Timeout {
                    job_id: None,
                    waited: started.elapsed(),
                });
            }
        };
        info!("Submitted query job {}", handle.job_id);

        self.waiter.execute_since(&handle, cancel, started).await
    }
}
