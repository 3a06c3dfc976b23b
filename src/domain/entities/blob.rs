//! # Blob
//!
//! オブジェクトストレージ上のオブジェクト情報

/// オブジェクト情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    pub bucket: String,
    pub name: String,
    pub size: i64,
    pub content_type: Option<String>,
}

/// 文字列アップロードの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(BlobInfo),
    /// 既存オブジェクトがあり、上書きが指定されなかった
    SkippedExisting,
}
