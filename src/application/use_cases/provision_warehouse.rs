//! # Provision Warehouse Use Case
//!
//! データセット・テーブルの作成（既に存在してもエラーにしない）

use std::sync::Arc;

use log::info;

use crate::domain::entities::identifiers::{DatasetId, TableId, TableRef};
use crate::domain::entities::schema::{FieldSchema, Provisioned};
use crate::domain::error::GcpError;
use crate::domain::repositories::warehouse_repository::WarehouseRepository;

pub const DEFAULT_LOCATION: &str = "US";

/// ウェアハウス準備ユースケース
pub struct ProvisionWarehouseUseCase<W: WarehouseRepository> {
    warehouse: Arc<W>,
}

impl<W: WarehouseRepository> ProvisionWarehouseUseCase<W> {
    pub fn new(warehouse: Arc<W>) -> Self {
        Self { warehouse }
    }

    /// データセットを作成
    ///
    /// # Arguments
    ///
    /// * `dataset_id` - データセットID
    /// * `location` - ロケーション（例: "US", "asia-northeast1"）
    pub async fn create_dataset(
        &self,
        dataset_id: &str,
        location: &str,
    ) -> Result<Provisioned, GcpError> {
        let dataset = DatasetId::new(dataset_id)?;
        let outcome = self.warehouse.create_dataset(&dataset, location).await?;

        match outcome {
            Provisioned::Created => info!("Dataset {} created in {}.", dataset, location),
            Provisioned::AlreadyExisted => info!("Dataset {} already exists.", dataset),
        }
        Ok(outcome)
    }

    /// テーブルを作成
    ///
    /// # Arguments
    ///
    /// * `dataset_id` - データセットID
    /// * `table_id` - テーブルID
    /// * `schema` - カラム定義
    pub async fn create_table(
        &self,
        dataset_id: &str,
        table_id: &str,
        schema: &[FieldSchema],
    ) -> Result<Provisioned, GcpError> {
        let table = TableRef::new(
            self.warehouse.project_id(),
            DatasetId::new(dataset_id)?,
            TableId::new(table_id)?,
        );
        let outcome = self.warehouse.create_table(&table, schema).await?;

        match outcome {
            Provisioned::Created => info!(
                "Table {} created in dataset {}.",
                table.table_id, table.dataset_id
            ),
            Provisioned::AlreadyExisted => info!(
                "Table {} already exists in dataset {}.",
                table.table_id, table.dataset_id
            ),
        }
        Ok(outcome)
    }

    /// テーブルの存在確認
    pub async fn table_exists(&self, dataset_id: &str, table_id: &str) -> Result<bool, GcpError> {
        let table = TableRef::new(
            self.warehouse.project_id(),
            DatasetId::new(dataset_id)?,
            TableId::new(table_id)?,
        );
        self.warehouse.table_exists(&table).await
    }
}
