//! BigQuery Adapter Modules
//!
//! BigQuery統合のためのアダプターモジュール

pub mod client;
pub mod row_loader;
pub mod schema;

pub use client::BigQueryClient;
