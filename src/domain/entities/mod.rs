//! # Domain Entities
//!
//! ビジネスエンティティとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **identifiers**: データセット・テーブル・カラム名と TableRef
//! - **schema**: テーブルスキーマ
//! - **job**: ジョブハンドルと状態
//! - **blob**: オブジェクトストレージのオブジェクト情報
//! - **severity**: Cloud Logging の重大度

pub mod blob;
pub mod identifiers;
pub mod job;
pub mod schema;
pub mod severity;
