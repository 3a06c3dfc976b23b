//! Repository Implementations
//!
//! Domain層のRepositoryトレイトの実装

pub mod bigquery_warehouse_repository;
pub mod cloud_log_sink_repository;
pub mod gcs_object_store_repository;
pub mod secret_manager_repository;
