//! # Domain Layer
//!
//! このモジュールはビジネスの核心的なルールとエンティティを定義します。
//!
//! ## 特徴
//!
//! - クラウドSDKに依存しない
//! - 各クラウドサービスは Repository trait として抽象化
//! - 純粋なビジネスロジック（MERGE文の組み立て、オブジェクト除外フィルタ）
//!
//! ## 構成要素
//!
//! - **entities**: 識別子、スキーマ、ジョブなどのバリューオブジェクト
//! - **error**: 型付きエラー
//! - **repositories**: Repository trait（インターフェース定義のみ）
//! - **services**: Domain Service（ビジネスルール）

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
