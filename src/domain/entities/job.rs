//! # Job Model
//!
//! 非同期ジョブのハンドルと状態
//!
//! ジョブのライフサイクルはサービス側が所有し、クライアントはポーリングするだけ。

/// ジョブハンドル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub project_id: String,
    pub job_id: String,
    pub location: Option<String>,
}

impl JobHandle {
    pub fn new(project_id: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            job_id: job_id.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// サービスが報告するジョブの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Done,
}

/// ジョブのステータス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub state: JobState,
    /// サービスが報告したエラー（Done のときのみ意味を持つ）
    pub errors: Vec<String>,
    /// DMLの影響行数（サービスが報告した場合のみ）
    pub affected_rows: Option<i64>,
}

impl JobStatus {
    pub fn pending() -> Self {
        Self {
            state: JobState::Pending,
            errors: Vec::new(),
            affected_rows: None,
        }
    }

    pub fn running() -> Self {
        Self {
            state: JobState::Running,
            ..Self::pending()
        }
    }

    pub fn succeeded(affected_rows: Option<i64>) -> Self {
        Self {
            state: JobState::Done,
            errors: Vec::new(),
            affected_rows,
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            state: JobState::Done,
            errors,
            affected_rows: None,
        }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == JobState::Done
    }
}

/// 成功したジョブの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub job_id: String,
    pub affected_rows: Option<i64>,
}
