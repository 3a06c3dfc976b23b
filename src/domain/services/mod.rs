//! # Domain Services
//!
//! エンティティに属さないビジネスルール
//!
//! - **merge_statement**: 重複排除MERGE文の組み立て
//! - **blob_filter**: オブジェクト名の除外フィルタ

pub mod blob_filter;
pub mod merge_statement;
