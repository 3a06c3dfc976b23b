//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **MergeTablesUseCase**: ステージング → 本番の重複排除マージ
//! - **ExecuteQueryUseCase**: クエリ投入と完了待ち
//! - **WaitForJobUseCase**: ジョブ完了待ち（バックオフ・タイムアウト・キャンセル）
//! - **ProvisionWarehouseUseCase**: データセット・テーブル作成
//! - **LoadRowsUseCase**: JSON・表形式データのロード
//! - **ManageBlobsUseCase**: バケット・オブジェクト操作
//! - **AccessSecretUseCase**: シークレット取得
//! - **WriteCloudLogUseCase**: クラウドログ書き込み

pub mod access_secret;
pub mod execute_query;
pub mod load_rows;
pub mod manage_blobs;
pub mod merge_tables;
pub mod provision_warehouse;
pub mod wait_for_job;
pub mod write_cloud_log;

#[cfg(test)]
pub(crate) mod test_support;
