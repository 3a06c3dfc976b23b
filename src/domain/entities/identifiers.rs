//! # Warehouse Identifiers
//!
//! データセット・テーブル・カラム名のバリューオブジェクト
//!
//! SQLに埋め込む識別子は必ずここで検証し、バッククォートで囲んで出力する。

use std::fmt;

use crate::domain::error::GcpError;

const MAX_ID_LEN: usize = 1024;
const MAX_COLUMN_LEN: usize = 300;

fn validate(
    kind: &'static str,
    value: &str,
    max_len: usize,
    allow_dash: bool,
    allow_leading_digit: bool,
) -> Result<(), GcpError> {
    let invalid = |reason: &str| GcpError::InvalidIdentifier {
        kind,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value.len() > max_len {
        return Err(invalid(&format!("longer than {} characters", max_len)));
    }
    if !allow_leading_digit && value.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid("must not start with a digit"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || (allow_dash && *c == '-')))
    {
        return Err(invalid(&format!("character {:?} is not allowed", c)));
    }
    Ok(())
}

/// データセットID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(value: impl Into<String>) -> Result<Self, GcpError> {
        let value = value.into();
        validate("dataset", &value, MAX_ID_LEN, false, true)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// テーブルID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableId(String);

impl TableId {
    pub fn new(value: impl Into<String>) -> Result<Self, GcpError> {
        let value = value.into();
        validate("table", &value, MAX_ID_LEN, true, true)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// カラム名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnName(String);

impl ColumnName {
    pub fn new(value: impl Into<String>) -> Result<Self, GcpError> {
        let value = value.into();
        validate("column", &value, MAX_COLUMN_LEN, false, false)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// バッククォートで囲んだSQL表現
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl Default for ColumnName {
    fn default() -> Self {
        Self("id".to_string())
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// テーブル参照
///
/// (プロジェクト, データセット, テーブル) の組。存在確認は毎回サービスに問い合わせる。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: DatasetId,
    pub table_id: TableId,
}

impl TableRef {
    pub fn new(project_id: impl Into<String>, dataset_id: DatasetId, table_id: TableId) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id,
            table_id,
        }
    }

    /// 文字列から検証付きで作成
    pub fn parse(project_id: &str, dataset_id: &str, table_id: &str) -> Result<Self, GcpError> {
        if project_id.is_empty() || project_id.contains('`') {
            return Err(GcpError::InvalidIdentifier {
                kind: "project",
                value: project_id.to_string(),
                reason: "must be a non-empty project id".to_string(),
            });
        }
        Ok(Self::new(
            project_id,
            DatasetId::new(dataset_id)?,
            TableId::new(table_id)?,
        ))
    }

    /// バッククォートで囲んだ完全修飾名
    pub fn quoted(&self) -> String {
        format!("`{}`", self)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}
