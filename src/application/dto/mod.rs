//! # Data Transfer Objects
//!
//! ユースケースの入力・設定

pub mod merge_request;
pub mod poll_policy;
pub mod tabular_data;
