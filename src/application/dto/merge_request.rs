//! # Merge Request DTO
//!
//! ステージング → 本番マージの入力

use crate::domain::entities::identifiers::{ColumnName, TableId, TableRef};
use crate::domain::error::GcpError;

pub const DEFAULT_UNIQUE_COLUMN: &str = "id";

/// マージ要求
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// 両テーブルを含むデータセット
    pub dataset_id: String,
    /// ステージングテーブル
    pub staging_table_id: String,
    /// 本番テーブル
    pub prod_table_id: String,
    /// 重複判定に使うユニークカラム
    pub unique_column: String,
}

/// 検証済みのマージ対象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeTargets {
    pub staging: TableRef,
    pub production: TableRef,
    pub key: ColumnName,
}

impl MergeRequest {
    /// ユニークカラムは "id"
    pub fn new(
        dataset_id: impl Into<String>,
        staging_table_id: impl Into<String>,
        prod_table_id: impl Into<String>,
    ) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            staging_table_id: staging_table_id.into(),
            prod_table_id: prod_table_id.into(),
            unique_column: DEFAULT_UNIQUE_COLUMN.to_string(),
        }
    }

    pub fn with_unique_column(mut self, column: impl Into<String>) -> Self {
        self.unique_column = column.into();
        self
    }

    /// 識別子を検証してテーブル参照へ変換
    ///
    /// # Errors
    ///
    /// いずれかの識別子が不正な場合 `InvalidIdentifier`
    pub fn resolve(&self, project_id: &str) -> Result<MergeTargets, GcpError> {
        let staging = TableRef::parse(
            project_id,
            self.dataset_id.as_str(),
            self.staging_table_id.as_str(),
        )?;
        let production = TableRef::new(
            project_id,
            staging.dataset_id.clone(),
            TableId::new(self.prod_table_id.as_str())?,
        );
        let key = ColumnName::new(self.unique_column.as_str())?;

        Ok(MergeTargets {
            staging,
            production,
            key,
        })
    }
}
