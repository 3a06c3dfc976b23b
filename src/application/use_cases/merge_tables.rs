//! # Merge Tables Use Case
//!
//! ステージングテーブルから本番テーブルへの重複排除マージ
//!
//! 両テーブルの存在を確認できた場合にのみ MERGE 文を1回だけ投入する。

use std::sync::Arc;

use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::application::dto::merge_request::MergeRequest;
use crate::application::dto::poll_policy::PollPolicy;
use crate::application::use_cases::execute_query::ExecuteQueryUseCase;
use crate::domain::entities::identifiers::TableRef;
use crate::domain::entities::job::JobResult;
use crate::domain::error::{GcpError, TableRole};
use crate::domain::repositories::warehouse_repository::WarehouseRepository;
use crate::domain::services::merge_statement::MergeStatement;

/// マージユースケース
pub struct MergeTablesUseCase<W: WarehouseRepository> {
    warehouse: Arc<W>,
    executor: ExecuteQueryUseCase<W>,
}

impl<W: WarehouseRepository> MergeTablesUseCase<W> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `warehouse` - ウェアハウスリポジトリ
    /// * `policy` - ジョブ完了待ちのポーリング設定
    pub fn new(warehouse: Arc<W>, policy: PollPolicy) -> Self {
        let executor = ExecuteQueryUseCase::new(warehouse.clone(), policy);
        Self {
            warehouse,
            executor,
        }
    }

    /// マージを実行
    ///
    /// # Returns
    ///
    /// 完了したジョブの結果
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier`: 識別子が不正
    /// - `PreconditionFailed`: どちらかのテーブルが存在しない（クエリは投入しない）
    /// - `JobFailed` / `Timeout` / `Cancelled`: 投入中・投入後の失敗
    /// - `Transport` / `Auth`: 通信・認証の失敗
    pub async fn execute(
        &self,
        request: &MergeRequest,
        cancel: &CancellationToken,
    ) -> Result<JobResult, GcpError> {
        let targets = request.resolve(self.warehouse.project_id())?;

        self.ensure_exists(&targets.staging, TableRole::Staging)
            .await?;
        self.ensure_exists(&targets.production, TableRole::Production)
            .await?;

        let statement = MergeStatement::new(
            targets.production.clone(),
            targets.staging.clone(),
            targets.key,
        );
        let result = self
            .executor
            .execute_and_wait(&statement.to_sql(), cancel)
            .await?;

        match result.affected_rows {
            Some(rows) => info!(
                "Inserted {} new rows from {} into {} without duplicates",
                rows, targets.staging.table_id, targets.production.table_id
            ),
            None => info!(
                "Merged {} into {}",
                targets.staging.table_id, targets.production.table_id
            ),
        }

        Ok(result)
    }

    async fn ensure_exists(&self, table: &TableRef, role: TableRole) -> Result<(), GcpError> {
        if self.warehouse.table_exists(table).await? {
            return Ok(());
        }

        error!("{} table: {} does not exist", role, table.table_id);
        Err(GcpError::PreconditionFailed {
            role,
            table: table.table_id.to_string(),
        })
    }
}
