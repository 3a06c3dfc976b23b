//! BigQuery Warehouse Repository Implementation
//!
//! WarehouseRepositoryのBigQuery実装

use async_trait::async_trait;
use google_cloud_bigquery::http::dataset::{Dataset, DatasetReference};
use google_cloud_bigquery::http::job::cancel::CancelJobRequest;
use google_cloud_bigquery::http::job::get::GetJobRequest;
use google_cloud_bigquery::http::job::get_query_results::GetQueryResultsRequest;
use google_cloud_bigquery::http::job::query::QueryRequest;
use google_cloud_bigquery::http::job::JobState as BigQueryJobState;
use google_cloud_bigquery::http::table::{Table, TableReference};
use log::{debug, info};
use serde_json::Value;
use uuid::Uuid;

use crate::adapter::bigquery::client::{
    collect_job_errors, describe_error, map_bigquery_error, BigQueryClient,
};
use crate::adapter::bigquery::row_loader::{insert_rows_batched, INSERT_BATCH_SIZE};
use crate::adapter::bigquery::schema::to_table_schema;
use crate::adapter::retry::{with_retry, RetryPolicy};
use crate::domain::entities::identifiers::{DatasetId, TableRef};
use crate::domain::entities::job::{JobHandle, JobStatus};
use crate::domain::entities::schema::{FieldSchema, Provisioned};
use crate::domain::error::GcpError;
use crate::domain::repositories::warehouse_repository::WarehouseRepository;

/// GoogleSQL のクエリ要求（投入ごとに新しい request_id を付ける）
fn query_request(sql: &str) -> QueryRequest {
    QueryRequest {
        query: sql.to_string(),
        use_legacy_sql: false,
        request_id: Some(Uuid::new_v4().to_string()),
        ..Default::default()
    }
}

/// BigQuery ウェアハウス
///
/// 1つの `Client` を保持し、すべての操作で使い回す
pub struct BigQueryWarehouseRepository {
    client: BigQueryClient,
    project_id: String,
    location: Option<String>,
    retry: RetryPolicy,
}

impl BigQueryWarehouseRepository {
    pub fn new(client: BigQueryClient, project_id: impl Into<String>) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            location: None,
            retry: RetryPolicy::default(),
        }
    }

    /// ジョブ参照にロケーションが無いときに使うロケーション
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// DMLの影響行数を取得（取得できなければ None）
    #[cfg_attr(coverage_nightly, coverage(off))]
    async fn affected_rows(&self, handle: &JobHandle) -> Option<i64> {
        let request = GetQueryResultsRequest {
            location: handle.location.clone(),
            ..Default::default()
        };
        match self
            .client
            .inner()
            .job()
            .get_query_results(&handle.project_id, &handle.job_id, &request)
            .await
        {
            Ok(response) => response.num_dml_affected_rows,
            Err(e) => {
                debug!("Could not read results of job {}: {}", handle.job_id, e);
                None
            }
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl WarehouseRepository for BigQueryWarehouseRepository {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn table_exists(&self, table: &TableRef) -> Result<bool, GcpError> {
        let client = self.client.inner();
        let resource = table.to_string();
        let resource = resource.as_str();

        let result = with_retry(&self.retry, "get table", move || async move {
            client
                .table()
                .get(
                    &table.project_id,
                    table.dataset_id.as_str(),
                    table.table_id.as_str(),
                )
                .await
                .map_err(|e| map_bigquery_error(e, resource))
        })
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(GcpError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_dataset(
        &self,
        dataset_id: &DatasetId,
        location: &str,
    ) -> Result<Provisioned, GcpError> {
        let client = self.client.inner();
        let dataset = Dataset {
            dataset_reference: DatasetReference {
                dataset_id: dataset_id.to_string(),
                project_id: self.project_id.clone(),
            },
            location: location.to_string(),
            ..Default::default()
        };
        let dataset = &dataset;
        let resource = format!("{}.{}", self.project_id, dataset_id);
        let resource = resource.as_str();

        let result = with_retry(&self.retry, "create dataset", move || async move {
            client
                .dataset()
                .create(dataset)
                .await
                .map_err(|e| map_bigquery_error(e, resource))
        })
        .await;

        match result {
            Ok(_) => Ok(Provisioned::Created),
            Err(GcpError::AlreadyExists { .. }) => Ok(Provisioned::AlreadyExisted),
            Err(e) => Err(e),
        }
    }

    async fn create_table(
        &self,
        table: &TableRef,
        schema: &[FieldSchema],
    ) -> Result<Provisioned, GcpError> {
        let client = self.client.inner();
        let metadata = Table {
            table_reference: TableReference {
                project_id: table.project_id.clone(),
                dataset_id: table.dataset_id.to_string(),
                table_id: table.table_id.to_string(),
            },
            schema: Some(to_table_schema(schema)),
            ..Default::default()
        };
        let metadata = &metadata;
        let resource = table.to_string();
        let resource = resource.as_str();

        let result = with_retry(&self.retry, "create table", move || async move {
            client
                .table()
                .create(metadata)
                .await
                .map_err(|e| map_bigquery_error(e, resource))
        })
        .await;

        match result {
            Ok(_) => Ok(Provisioned::Created),
            Err(GcpError::AlreadyExists { .. }) => Ok(Provisioned::AlreadyExisted),
            Err(e) => Err(e),
        }
    }

    async fn submit_query(&self, sql: &str) -> Result<JobHandle, GcpError> {
        let client = self.client.inner();
        let project_id = self.project_id.as_str();
        // リトライ間で同じ request_id を使い、受理済みの投入を二重に実行しない
        let request = query_request(sql);
        let request = &request;

        let response = with_retry(&self.retry, "submit query", move || async move {
            client
                .job()
                .query(project_id, request)
                .await
                .map_err(|e| map_bigquery_error(e, project_id))
        })
        .await?;

        let reference = response.job_reference;
        let location = reference.location.or_else(|| self.location.clone());
        let mut handle = JobHandle::new(reference.project_id, reference.job_id);
        if let Some(location) = location {
            handle = handle.with_location(location);
        }

        info!("Submitted query job {}", handle.job_id);
        Ok(handle)
    }

    async fn job_status(&self, handle: &JobHandle) -> Result<JobStatus, GcpError> {
        let client = self.client.inner();
        let request = GetJobRequest {
            location: handle.location.clone(),
        };
        let request = &request;
        let resource = format!("job {}", handle.job_id);
        let resource = resource.as_str();

        let job = with_retry(&self.retry, "get job", move || async move {
            client
                .job()
                .get(&handle.project_id, &handle.job_id, request)
                .await
                .map_err(|e| map_bigquery_error(e, resource))
        })
        .await?;

        let status = job.status;
        match status.state {
            BigQueryJobState::Done => {
                let errors = status
                    .errors
                    .unwrap_or_default()
                    .iter()
                    .map(|e| describe_error(e.reason.as_deref(), e.message.as_deref()))
                    .collect();
                let error_result = status
                    .error_result
                    .as_ref()
                    .map(|e| describe_error(e.reason.as_deref(), e.message.as_deref()));
                let errors = collect_job_errors(errors, error_result);

                if !errors.is_empty() {
                    return Ok(JobStatus::failed(errors));
                }
                Ok(JobStatus::succeeded(self.affected_rows(handle).await))
            }
            BigQueryJobState::Running => Ok(JobStatus::running()),
            _ => Ok(JobStatus::pending()),
        }
    }

    async fn cancel_job(&self, handle: &JobHandle) -> Result<(), GcpError> {
        let request = CancelJobRequest {
            location: handle.location.clone(),
        };
        self.client
            .inner()
            .job()
            .cancel(&handle.project_id, &handle.job_id, &request)
            .await
            .map_err(|e| map_bigquery_error(e, &format!("job {}", handle.job_id)))?;

        info!("Requested cancellation of job {}", handle.job_id);
        Ok(())
    }

    async fn insert_rows(&self, table: &TableRef, rows: Vec<Value>) -> Result<usize, GcpError> {
        insert_rows_batched(&self.client, table, rows, INSERT_BATCH_SIZE, &self.retry).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_query_request_is_googlesql_with_request_id() {
        let request = query_request("SELECT 1");

        assert_eq!(request.query, "SELECT 1");
        assert!(!request.use_legacy_sql);
        let id = request.request_id.unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_each_submission_gets_new_request_id() {
        let first = query_request("SELECT 1").request_id;
        let second = query_request("SELECT 1").request_id;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_retried_submission_reuses_request_id() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 2,
        };
        let request = query_request("MERGE ...");
        let request = &request;
        let seen = Mutex::new(Vec::new());
        let seen_ref = &seen;

        let result = with_retry(&policy, "submit query", move || async move {
            let mut ids = seen_ref.lock().unwrap();
            ids.push(request.request_id.clone());
            if ids.len() < 3 {
                Err(GcpError::Transport("connection reset".to_string()))
            } else {
                Ok(())
            }
        })
        .await;

        assert!(result.is_ok());
        let ids = seen.into_inner().unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| *id == request.request_id));
    }
}
