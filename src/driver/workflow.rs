//! Workflow Orchestration
//!
//! ワークフローのオーケストレーション

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::adapter::auth::gcp_auth::{create_bigquery_client, Credentials};
use crate::adapter::config::{Config, DEFAULT_CREDENTIALS_PATH};
use crate::adapter::repositories::bigquery_warehouse_repository::BigQueryWarehouseRepository;
use crate::application::dto::merge_request::MergeRequest;
use crate::application::dto::poll_policy::PollPolicy;
use crate::application::use_cases::merge_tables::MergeTablesUseCase;
use crate::domain::entities::job::JobResult;
use crate::domain::error::GcpError;
use crate::domain::repositories::warehouse_repository::WarehouseRepository;

use super::cli::Args;

/// Exit code for failures that carry no `GcpError`
pub const GENERIC_FAILURE_EXIT_CODE: i32 = 1;

/// Map an error to the process exit code
///
/// エラーチェーン中の最初の `GcpError` の種別で決まる
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<GcpError>())
        .map(GcpError::exit_code)
        .unwrap_or(GENERIC_FAILURE_EXIT_CODE)
}

/// 設定ファイルを読み込む（指定が無ければデフォルト）
pub fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).map_err(|e| {
            let message = format!("{:#}", e);
            anyhow::Error::new(GcpError::Config(message))
        }),
        None => Ok(Config::default()),
    }
}

/// CLI引数・環境変数・設定ファイルをまとめた実行設定
#[derive(Debug, Clone)]
pub struct MergeSettings {
    /// 未指定なら認証情報から判明したものを使う
    pub project_id: Option<String>,
    pub location: String,
    pub credentials: Credentials,
    pub poll: PollPolicy,
    pub request: MergeRequest,
}

impl MergeSettings {
    /// CLIの値を優先して設定ファイルの値とマージ
    pub fn resolve(args: &Args, config: Config) -> Self {
        let key_path = args
            .credentials_path
            .clone()
            .or(config.credentials_path)
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string());

        let mut poll = config.poll;
        if let Some(timeout_secs) = args.timeout_secs {
            poll.timeout_secs = timeout_secs;
        }

        Self {
            project_id: args.project_id.clone().or(config.project_id),
            location: args.location.clone().unwrap_or(config.location),
            credentials: Credentials::from_flags(args.local, &key_path),
            poll: poll.to_policy(),
            request: MergeRequest::new(
                args.dataset_id.as_str(),
                args.staging_table_id.as_str(),
                args.prod_table_id.as_str(),
            )
            .with_unique_column(args.unique_column.as_str()),
        }
    }
}

/// Staging to Production Merge Workflow
pub struct MergeWorkflow {
    settings: MergeSettings,
}

impl MergeWorkflow {
    pub fn new(settings: MergeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    /// Execute the merge against BigQuery
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn execute(&self, cancel: &CancellationToken) -> Result<JobResult> {
        info!("Starting staging to production merge...");

        let (client, discovered_project) = create_bigquery_client(&self.settings.credentials)
            .await
            .context("Failed to create BigQuery client")?;
        println!("✓ Created BigQuery client");

        let project_id = self
            .settings
            .project_id
            .clone()
            .or(discovered_project)
            .ok_or_else(|| {
                GcpError::Config(
                    "project id is required (--project_id, GCP_PROJECT_ID or config file)"
                        .to_string(),
                )
            })?;

        let warehouse = Arc::new(
            BigQueryWarehouseRepository::new(client, project_id)
                .with_location(self.settings.location.as_str()),
        );

        self.run_with(warehouse, cancel).await
    }

    /// Run the merge against any warehouse implementation
    pub async fn run_with<W: WarehouseRepository>(
        &self,
        warehouse: Arc<W>,
        cancel: &CancellationToken,
    ) -> Result<JobResult> {
        let request = &self.settings.request;

        println!("✓ Using configuration:");
        println!("  Project: {}", warehouse.project_id());
        println!("  Dataset: {}", request.dataset_id);
        println!("  Staging table: {}", request.staging_table_id);
        println!("  Production table: {}", request.prod_table_id);
        println!("  Unique column: {}", request.unique_column);

        let use_case = MergeTablesUseCase::new(warehouse, self.settings.poll);
        let result = use_case
            .execute(request, cancel)
            .await
            .context("Merge failed")?;

        info!("Merge job {} finished", result.job_id);
        match result.affected_rows {
            Some(rows) => println!("✓ Merge complete! {} new rows (job {})", rows, result.job_id),
            None => println!("✓ Merge complete! (job {})", result.job_id),
        }

        Ok(result)
    }
}
