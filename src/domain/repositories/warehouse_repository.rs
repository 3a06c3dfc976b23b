//! # Warehouse Repository Trait
//!
//! データウェアハウス（BigQuery）操作を抽象化

use async_trait::async_trait;

use crate::domain::entities::identifiers::{DatasetId, TableRef};
use crate::domain::entities::job::{JobHandle, JobStatus};
use crate::domain::entities::schema::{FieldSchema, Provisioned};
use crate::domain::error::GcpError;

/// ウェアハウスリポジトリ
///
/// 1つのSDKクライアントを保持し、その寿命の間すべての呼び出しで使い回す
#[async_trait]
pub trait WarehouseRepository: Send + Sync {
    /// クライアントが属するプロジェクトID
    fn project_id(&self) -> &str;

    /// テーブルの存在確認
    ///
    /// # Returns
    ///
    /// サービスが "not found" を返した場合は `false`
    ///
    /// # Errors
    ///
    /// "not found" 以外の失敗はそのまま返す
    async fn table_exists(&self, table: &TableRef) -> Result<bool, GcpError>;

    /// データセットを作成（既に存在する場合もエラーにしない）
    async fn create_dataset(
        &self,
        dataset_id: &DatasetId,
        location: &str,
    ) -> Result<Provisioned, GcpError>;

    /// テーブルを作成（既に存在する場合もエラーにしない）
    async fn create_table(
        &self,
        table: &TableRef,
        schema: &[FieldSchema],
    ) -> Result<Provisioned, GcpError>;

    /// クエリジョブを投入する
    async fn submit_query(&self, sql: &str) -> Result<JobHandle, GcpError>;

    /// ジョブの状態を取得する
    async fn job_status(&self, handle: &JobHandle) -> Result<JobStatus, GcpError>;

    /// ジョブのキャンセルを要求する
    async fn cancel_job(&self, handle: &JobHandle) -> Result<(), GcpError>;

    /// 行を追記する
    ///
    /// # Returns
    ///
    /// 追記された行数
    ///
    /// # Errors
    ///
    /// 一部の行を書き込んだ後に失敗した場合 `PartialLoad`
    async fn insert_rows(
        &self,
        table: &TableRef,
        rows: Vec<serde_json::Value>,
    ) -> Result<usize, GcpError>;
}
