//! BigQuery Client Abstractions
//!
//! クライアントの抽象化と実装

use async_trait::async_trait;
use google_cloud_bigquery::client::Client;
use google_cloud_bigquery::http::error::Error as BigQueryError;
use google_cloud_bigquery::http::tabledata::insert_all::{InsertAllRequest, InsertAllResponse};
use serde_json::Value;

#[cfg(test)]
use mockall::automock;

use crate::adapter::error::{classify_message, classify_status};
use crate::domain::entities::identifiers::TableRef;
use crate::domain::error::GcpError;

/// Trait for streaming insert operations
/// This enables mocking in tests while using the real client in production
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RowInserter: Send + Sync {
    /// Insert rows into a table
    async fn insert(
        &self,
        table: &TableRef,
        request: &InsertAllRequest<Value>,
    ) -> Result<InsertAllResponse, GcpError>;
}

/// BigQuery のエラーを `GcpError` に変換
pub fn map_bigquery_error(err: BigQueryError, resource: &str) -> GcpError {
    match err {
        BigQueryError::Response(response) => {
            classify_status(response.code, &response.message, resource)
        }
        other => classify_message(&other.to_string()),
    }
}

/// ジョブが報告したエラーを1つのリストにまとめる
///
/// `errors` が空で `error_result` だけがある場合はそれを使う
pub fn collect_job_errors(errors: Vec<String>, error_result: Option<String>) -> Vec<String> {
    if errors.is_empty() {
        error_result.into_iter().collect()
    } else {
        errors
    }
}

/// ErrorProto を1行のメッセージに整形
pub fn describe_error(reason: Option<&str>, message: Option<&str>) -> String {
    match (reason, message) {
        (Some(reason), Some(message)) => format!("{}: {}", reason, message),
        (None, Some(message)) => message.to_string(),
        (Some(reason), None) => reason.to_string(),
        (None, None) => "unknown error".to_string(),
    }
}

/// Client wrapper that owns the SDK `Client` instance
pub struct BigQueryClient {
    client: Client,
}

impl BigQueryClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl RowInserter for BigQueryClient {
    async fn insert(
        &self,
        table: &TableRef,
        request: &InsertAllRequest<Value>,
    ) -> Result<InsertAllResponse, GcpError> {
        self.client
            .tabledata()
            .insert(
                &table.project_id,
                table.dataset_id.as_str(),
                table.table_id.as_str(),
                request,
            )
            .await
            .map_err(|e| map_bigquery_error(e, &table.to_string()))
    }
}
