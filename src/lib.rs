//! # gcputils
//!
//! Google Cloud（BigQuery, Cloud Storage, Secret Manager, Cloud Logging）の
//! 便利ラッパーと、ステージングテーブルから本番テーブルへの重複排除マージツール
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: 識別子・エラー種別・リポジトリトレイト・MERGE文の生成（外部依存なし）
//! - **Application層**: ユースケース（マージ、ジョブ完了待ち、ロード、オブジェクト操作等）
//! - **Adapter層**: 各SDKを使ったリポジトリ実装、認証、設定
//! - **Driver層**: CLI、依存性注入

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
// カバレッジ計測時に外部サービス依存コードを除外するために使用
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
