//! Adapter Layer
//!
//! 外部システム（BigQuery, Cloud Storage, Secret Manager, Cloud Logging）との統合

pub mod auth;
pub mod bigquery;
pub mod config;
pub mod error;
pub mod repositories;
pub mod retry;
