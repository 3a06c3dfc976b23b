//! # Tabular Data DTO
//!
//! 列名と行からなる表形式データ

use serde_json::{Map, Value};

use crate::domain::error::GcpError;

/// 表形式データ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TabularData {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 行をJSONオブジェクトへ変換
    ///
    /// # Errors
    ///
    /// 列数と一致しない行があれば `InvalidInput`
    pub fn into_json_rows(self) -> Result<Vec<Value>, GcpError> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                if row.len() != columns.len() {
                    return Err(GcpError::InvalidInput(format!(
                        "row {} has {} cells but there are {} columns",
                        index,
                        row.len(),
                        columns.len()
                    )));
                }
                let object: Map<String, Value> = columns.iter().cloned().zip(row).collect();
                Ok(Value::Object(object))
            })
            .collect()
    }
}
