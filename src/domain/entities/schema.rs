//! # Table Schema
//!
//! テーブルスキーマのバリューオブジェクト

/// カラムの型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Bytes,
    Integer,
    Float,
    Numeric,
    Boolean,
    Timestamp,
    Date,
    Time,
    Datetime,
    Json,
}

/// カラムのモード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

/// カラム定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
    pub mode: FieldMode,
}

impl FieldSchema {
    /// NULLABLEなカラムを作成
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: FieldMode::Nullable,
        }
    }

    pub fn with_mode(mut self, mode: FieldMode) -> Self {
        self.mode = mode;
        self
    }
}

/// exists-ok な作成処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyExisted,
}
