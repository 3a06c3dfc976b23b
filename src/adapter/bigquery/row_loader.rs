//! BigQuery Streaming Insert Logic
//!
//! 行のバッチ投入ロジック（413 での自動分割とリトライ対応）

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use google_cloud_bigquery::http::tabledata::insert_all::{InsertAllRequest, Row};
use log::{info, warn};
use serde_json::Value;
use tokio::time::sleep;
use uuid::Uuid;

use super::client::RowInserter;
use crate::adapter::retry::{is_request_too_large_error, RetryPolicy, BATCH_DELAY_MS};
use crate::domain::entities::identifiers::TableRef;
use crate::domain::error::GcpError;

/// insertAll 1回あたりの行数
pub const INSERT_BATCH_SIZE: usize = 500;

/// 413 で分割する際の下限
pub const MIN_BATCH_SIZE: usize = 10;

/// Prepare rows for insertion
///
/// 各行にランダムな insert_id を付与する（リトライ時の重複排除用）
pub fn prepare_rows(rows: &[Value]) -> Vec<Row<Value>> {
    rows.iter()
        .map(|row| Row {
            insert_id: Some(Uuid::new_v4().to_string()),
            json: row.clone(),
        })
        .collect()
}

type InsertFuture<'a> = Pin<Box<dyn Future<Output = Result<(), GcpError>> + Send + 'a>>;

/// Insert a chunk with automatic splitting on 413 errors
///
/// 書き込めた行数は失敗時も含めて `committed` に加算する
fn insert_chunk_with_split<'a, T: RowInserter + ?Sized>(
    inserter: &'a T,
    table: &'a TableRef,
    chunk: &'a [Value],
    batch_num: usize,
    policy: &'a RetryPolicy,
    committed: &'a mut usize,
) -> InsertFuture<'a> {
    Box::pin(async move {
        let request = InsertAllRequest {
            rows: prepare_rows(chunk),
            skip_invalid_rows: None,
            ignore_unknown_values: None,
            template_suffix: None,
            trace_id: None,
        };

        let mut retry_count = 0;

        loop {
            match inserter.insert(table, &request).await {
                Ok(response) => {
                    if let Some(errors) = response.insert_errors {
                        let details: Vec<String> = errors
                            .iter()
                            .map(|error| format!("row {}: {:?}", error.index, error.errors))
                            .collect();
                        return Err(GcpError::InvalidInput(format!(
                            "batch {} rejected by {}: {}",
                            batch_num,
                            table,
                            details.join("; ")
                        )));
                    }
                    info!("Batch {} inserted ({} rows)", batch_num, chunk.len());
                    *committed += chunk.len();
                    return Ok(());
                }
                Err(e) if is_request_too_large_error(&e.to_string()) => {
                    if chunk.len() <= MIN_BATCH_SIZE {
                        warn!(
                            "Batch {} is too large even at minimum size ({})",
                            batch_num,
                            chunk.len()
                        );
                        return Err(e);
                    }

                    let mid = chunk.len() / 2;
                    warn!(
                        "Batch {} too large ({} rows), splitting into {} and {}...",
                        batch_num,
                        chunk.len(),
                        mid,
                        chunk.len() - mid
                    );

                    let (head, tail) = chunk.split_at(mid);
                    insert_chunk_with_split(inserter, table, head, batch_num, policy, &mut *committed)
                        .await?;
                    return insert_chunk_with_split(
                        inserter,
                        table,
                        tail,
                        batch_num,
                        policy,
                        &mut *committed,
                    )
                    .await;
                }
                Err(e) if e.is_retryable() && retry_count < policy.max_retries => {
                    retry_count += 1;
                    let delay = policy.delay_ms(retry_count);
                    warn!(
                        "Batch {} failed (attempt {}), retrying in {}ms: {}",
                        batch_num, retry_count, delay, e
                    );
                    sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => {
                    warn!(
                        "Failed to insert batch {} after {} retries: {}",
                        batch_num, retry_count, e
                    );
                    return Err(e);
                }
            }
        }
    })
}

/// Insert rows into a table in batches
///
/// # Returns
///
/// 投入した行数
///
/// # Errors
///
/// 途中のバッチで失敗した場合、書き込み済みの行は取り消せないため
/// 件数を `PartialLoad` に載せて返す。1行も書き込んでいなければ元のエラー。
pub async fn insert_rows_batched<T: RowInserter + ?Sized>(
    inserter: &T,
    table: &TableRef,
    rows: Vec<Value>,
    batch_size: usize,
    policy: &RetryPolicy,
) -> Result<usize, GcpError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let batch_size = batch_size.max(1);
    let total_batches = rows.len().div_ceil(batch_size);
    info!(
        "Inserting {} rows into {} in {} batches",
        rows.len(),
        table,
        total_batches
    );

    let mut inserted = 0;
    for (i, chunk) in rows.chunks(batch_size).enumerate() {
        if let Err(e) =
            insert_chunk_with_split(inserter, table, chunk, i + 1, policy, &mut inserted).await
        {
            if inserted == 0 {
                return Err(e);
            }
            warn!(
                "{} of {} rows were written to {} before batch {} failed",
                inserted,
                rows.len(),
                table,
                i + 1
            );
            return Err(GcpError::PartialLoad {
                loaded: inserted,
                source: Box::new(e),
            });
        }

        // Small delay between batches to avoid rate limiting
        if i + 1 < total_batches {
            sleep(Duration::from_millis(BATCH_DELAY_MS)).await;
        }
    }

    Ok(inserted)
}
