//! # Merge Statement Service
//!
//! ステージング → 本番のMERGE文を組み立てる
//!
//! 本番に同じキーが無い行だけをそのまま挿入する。一致した行は更新しない。

use crate::domain::entities::identifiers::{ColumnName, TableRef};

/// MERGE文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeStatement {
    pub target: TableRef,
    pub source: TableRef,
    pub key: ColumnName,
}

impl MergeStatement {
    pub fn new(target: TableRef, source: TableRef, key: ColumnName) -> Self {
        Self {
            target,
            source,
            key,
        }
    }

    /// GoogleSQL文字列へ変換
    ///
    /// 識別子は検証済みの値をバッククォートで囲んで埋め込む
    pub fn to_sql(&self) -> String {
        let key = self.key.quoted();
        format!(
            "MERGE {target} T\nUSING {source} S\nON T.{key} = S.{key}\nWHEN NOT MATCHED THEN\n  INSERT ROW",
            target = self.target.quoted(),
            source = self.source.quoted(),
            key = key,
        )
    }
}
