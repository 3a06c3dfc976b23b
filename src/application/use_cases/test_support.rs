//! ユースケースのテスト用モックリポジトリ

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::identifiers::{DatasetId, TableRef};
use crate::domain::entities::job::{JobHandle, JobStatus};
use crate::domain::entities::schema::{FieldSchema, Provisioned};
use crate::domain::error::GcpError;
use crate::domain::repositories::warehouse_repository::WarehouseRepository;

pub const PROJECT: &str = "test-project";

/// 呼び出しを記録し、ジョブ状態をスクリプト通りに返すウェアハウス
#[derive(Default)]
pub struct MockWarehouse {
    pub tables: Mutex<HashSet<String>>,
    pub datasets: Mutex<HashSet<String>>,
    pub statuses: Mutex<VecDeque<Result<JobStatus, GcpError>>>,
    pub submitted: Mutex<Vec<String>>,
    pub cancelled: Mutex<Vec<String>>,
    pub inserted: Mutex<Vec<(String, Vec<Value>)>>,
    pub created_tables: Mutex<Vec<(String, Vec<FieldSchema>)>>,
    pub exists_error: Mutex<Option<GcpError>>,
    /// 応答の遅いサービスを模す
    pub submit_delay: Mutex<Option<Duration>>,
    pub status_delay: Mutex<Option<Duration>>,
}

impl MockWarehouse {
    pub fn with_tables(tables: &[&str]) -> Self {
        let mock = Self::default();
        {
            let mut set = mock.tables.lock().unwrap();
            for table in tables {
                set.insert(format!("{}.{}", PROJECT, table));
            }
        }
        mock
    }

    pub fn push_status(&self, status: Result<JobStatus, GcpError>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl WarehouseRepository for MockWarehouse {
    fn project_id(&self) -> &str {
        PROJECT
    }

    async fn table_exists(&self, table: &TableRef) -> Result<bool, GcpError> {
        if let Some(err) = self.exists_error.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.tables.lock().unwrap().contains(&table.to_string()))
    }

    async fn create_dataset(
        &self,
        dataset_id: &DatasetId,
        _location: &str,
    ) -> Result<Provisioned, GcpError> {
        if self
            .datasets
            .lock()
            .unwrap()
            .insert(dataset_id.to_string())
        {
            Ok(Provisioned::Created)
        } else {
            Ok(Provisioned::AlreadyExisted)
        }
    }

    async fn create_table(
        &self,
        table: &TableRef,
        schema: &[FieldSchema],
    ) -> Result<Provisioned, GcpError> {
        self.created_tables
            .lock()
            .unwrap()
            .push((table.to_string(), schema.to_vec()));
        if self.tables.lock().unwrap().insert(table.to_string()) {
            Ok(Provisioned::Created)
        } else {
            Ok(Provisioned::AlreadyExisted)
        }
    }

    async fn submit_query(&self, sql: &str) -> Result<JobHandle, GcpError> {
        let delay = *self.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(sql.to_string());
        Ok(JobHandle::new(PROJECT, format!("job_{}", submitted.len())))
    }

    async fn job_status(&self, _handle: &JobHandle) -> Result<JobStatus, GcpError> {
        let delay = *self.status_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobStatus::running()))
    }

    async fn cancel_job(&self, handle: &JobHandle) -> Result<(), GcpError> {
        self.cancelled.lock().unwrap().push(handle.job_id.clone());
        Ok(())
    }

    async fn insert_rows(&self, table: &TableRef, rows: Vec<Value>) -> Result<usize, GcpError> {
        let count = rows.len();
        self.inserted.lock().unwrap().push((table.to_string(), rows));
        Ok(count)
    }
}
