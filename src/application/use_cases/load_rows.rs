//! # Load Rows Use Case
//!
//! JSON・表形式データのテーブルへの追記

use std::sync::Arc;

use log::info;
use serde_json::Value;

use crate::application::dto::tabular_data::TabularData;
use crate::domain::entities::identifiers::TableRef;
use crate::domain::entities::schema::FieldSchema;
use crate::domain::error::GcpError;
use crate::domain::repositories::warehouse_repository::WarehouseRepository;

/// 行ロードユースケース
///
/// ロードは常に追記（既存行は変更しない）
pub struct LoadRowsUseCase<W: WarehouseRepository> {
    warehouse: Arc<W>,
}

impl<W: WarehouseRepository> LoadRowsUseCase<W> {
    pub fn new(warehouse: Arc<W>) -> Self {
        Self { warehouse }
    }

    /// JSONオブジェクトの行をロード
    ///
    /// テーブルが無ければ `schema` で作成してから追記する
    ///
    /// # Returns
    ///
    /// ロードした行数
    ///
    /// # Errors
    ///
    /// オブジェクト以外の行があれば `InvalidInput`（何も書き込まない）
    pub async fn load_json(
        &self,
        table: &TableRef,
        rows: Vec<Value>,
        schema: &[FieldSchema],
    ) -> Result<usize, GcpError> {
        if let Some(index) = rows.iter().position(|row| !row.is_object()) {
            return Err(GcpError::InvalidInput(format!(
                "row {} is not a JSON object",
                index
            )));
        }

        self.warehouse.create_table(table, schema).await?;
        self.append(table, rows).await
    }

    /// 表形式データを既存テーブルへロード
    pub async fn load_tabular(
        &self,
        table: &TableRef,
        data: TabularData,
    ) -> Result<usize, GcpError> {
        let rows = data.into_json_rows()?;
        self.append(table, rows).await
    }

    async fn append(&self, table: &TableRef, rows: Vec<Value>) -> Result<usize, GcpError> {
        if rows.is_empty() {
            info!("No rows to load into {}", table);
            return Ok(0);
        }

        let loaded = self.warehouse.insert_rows(table, rows).await?;
        info!(
            "Loaded {} rows into {}:{}.",
            loaded, table.dataset_id, table.table_id
        );
        Ok(loaded)
    }
}
