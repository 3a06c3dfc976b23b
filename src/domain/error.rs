//! # Domain Errors
//!
//! クラウド操作のエラー種別
//!
//! 呼び出し側が「リソースが無い」「前提条件を満たさない」「通信・認証の失敗」
//! 「ジョブ自体の失敗」を区別できるよう、型付きのエラーとして返す。

use std::time::Duration;

use thiserror::Error;

/// マージ対象テーブルの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    Staging,
    Production,
}

impl std::fmt::Display for TableRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableRole::Staging => write!(f, "Staging"),
            TableRole::Production => write!(f, "Production"),
        }
    }
}

/// GCP操作のエラー
#[derive(Debug, Error)]
pub enum GcpError {
    /// テーブル・バケット・シークレット等が存在しない
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// 既に存在する（exists-ok な作成処理の内部でのみ使用）
    #[error("{resource} already exists")]
    AlreadyExists { resource: String },

    /// マージの前提条件（両テーブルの存在）を満たさない
    #[error("{role} table: {table} does not exist")]
    PreconditionFailed { role: TableRole, table: String },

    /// ネットワーク・サーバー側の一時的な障害
    #[error("transport error: {0}")]
    Transport(String),

    /// 認証・認可の失敗
    #[error("authentication error: {0}")]
    Auth(String),

    /// サービスが報告したジョブの失敗
    #[error("job {job_id} failed: {}", errors.join("; "))]
    JobFailed { job_id: String, errors: Vec<String> },

    /// 待機時間の上限超過（投入前に打ち切った場合 `job_id` は `None`）
    #[error("job {} did not finish within {waited:?}", job_label(.job_id))]
    Timeout {
        job_id: Option<String>,
        waited: Duration,
    },

    /// キャンセルされた（投入前に打ち切った場合 `job_id` は `None`）
    #[error("wait for job {} was cancelled", job_label(.job_id))]
    Cancelled { job_id: Option<String> },

    /// 不正な識別子（データセット・テーブル・カラム名）
    #[error("invalid {kind} identifier {value:?}: {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: String,
    },

    /// 分類できないサービス側の失敗（リトライしない）
    #[error("service error: {0}")]
    Service(String),

    /// 不正な入力（クエリ構文エラー、行データ不正など）
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 一部の行を書き込んだ後の失敗（書き込み済みの行は残る）
    #[error("{loaded} rows were written before the load failed: {source}")]
    PartialLoad {
        loaded: usize,
        source: Box<GcpError>,
    },

    /// 設定の不足・不正
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn job_label(job_id: &Option<String>) -> &str {
    job_id.as_deref().unwrap_or("(not submitted)")
}

impl GcpError {
    /// リトライで回復しうるエラーかどうか
    pub fn is_retryable(&self) -> bool {
        matches!(self, GcpError::Transport(_))
    }

    /// プロセスの終了コード
    ///
    /// エラー種別ごとに異なる非ゼロ値を返す
    pub fn exit_code(&self) -> i32 {
        match self {
            GcpError::InvalidIdentifier { .. } | GcpError::InvalidInput(_) | GcpError::Config(_) => {
                2
            }
            GcpError::NotFound { .. } | GcpError::AlreadyExists { .. } | GcpError::Io(_) => 3,
            GcpError::PreconditionFailed { .. } => 4,
            GcpError::Transport(_) => 5,
            GcpError::Auth(_) => 6,
            GcpError::JobFailed { .. } => 7,
            GcpError::Timeout { .. } => 8,
            GcpError::Service(_) => 9,
            GcpError::Cancelled { .. } => 130,
            GcpError::PartialLoad { source, .. } => source.exit_code(),
        }
    }
}
