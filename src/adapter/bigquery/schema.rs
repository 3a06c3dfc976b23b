//! BigQuery Schema Conversion
//!
//! ドメインのカラム定義を BigQuery API の型へ変換

use google_cloud_bigquery::http::table::{
    TableFieldMode, TableFieldSchema, TableFieldType, TableSchema,
};

use crate::domain::entities::schema::{FieldMode, FieldSchema, FieldType};

fn to_field_type(field_type: FieldType) -> TableFieldType {
    match field_type {
        FieldType::String => TableFieldType::String,
        FieldType::Bytes => TableFieldType::Bytes,
        FieldType::Integer => TableFieldType::Integer,
        FieldType::Float => TableFieldType::Float,
        FieldType::Numeric => TableFieldType::Numeric,
        FieldType::Boolean => TableFieldType::Boolean,
        FieldType::Timestamp => TableFieldType::Timestamp,
        FieldType::Date => TableFieldType::Date,
        FieldType::Time => TableFieldType::Time,
        FieldType::Datetime => TableFieldType::Datetime,
        FieldType::Json => TableFieldType::Json,
    }
}

fn to_field_mode(mode: FieldMode) -> TableFieldMode {
    match mode {
        FieldMode::Nullable => TableFieldMode::Nullable,
        FieldMode::Required => TableFieldMode::Required,
        FieldMode::Repeated => TableFieldMode::Repeated,
    }
}

/// Convert column definitions into a BigQuery table schema
pub fn to_table_schema(fields: &[FieldSchema]) -> TableSchema {
    TableSchema {
        fields: fields
            .iter()
            .map(|field| TableFieldSchema {
                name: field.name.clone(),
                data_type: to_field_type(field.field_type),
                mode: Some(to_field_mode(field.mode)),
                ..Default::default()
            })
            .collect(),
    }
}
