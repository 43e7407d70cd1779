// 型マッピング
//
// 論理型（LogicalType）からSQL型文字列への変換を一元管理します。
// `type:` アノテーションによる上書きは常にマッピングより優先されます。

use crate::core::schema::{FieldSchema, LogicalType};
use std::fmt;

/// SQLiteのストレージ型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteType {
    Text,
    Integer,
    Real,
}

impl fmt::Display for SqliteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqliteType::Text => write!(f, "TEXT"),
            SqliteType::Integer => write!(f, "INTEGER"),
            SqliteType::Real => write!(f, "REAL"),
        }
    }
}

/// 型マッピングインターフェース
pub trait TypeMapper: Send + Sync {
    /// 論理型をSQL型文字列に変換
    fn format_sql_type(&self, logical_type: &LogicalType) -> String;

    /// フィールドのSQL型を決定（上書き指定が優先）
    fn resolve_field_type(&self, field: &FieldSchema) -> String {
        match &field.sql_type_override {
            Some(sql_type) => sql_type.clone(),
            None => self.format_sql_type(&field.logical_type),
        }
    }
}

/// SQLite用型マッパー
#[derive(Debug, Clone, Default)]
pub struct SqliteTypeMapper;

impl SqliteTypeMapper {
    pub fn new() -> Self {
        Self
    }

    /// 論理型をSQLiteのストレージ型に分類
    ///
    /// 時刻・識別子・列・マップなどの型は TEXT にフォールバックします。
    pub fn storage_type(&self, logical_type: &LogicalType) -> SqliteType {
        let LogicalType::Named(name) = logical_type else {
            return SqliteType::Text;
        };

        match name.as_str() {
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
            | "uint32" | "uint64" | "uintptr" | "byte" | "rune" => SqliteType::Integer,
            "float32" | "float64" => SqliteType::Real,
            // SQLiteには真偽値型がないため 0/1 で保存
            "bool" | "boolean" => SqliteType::Integer,
            _ => SqliteType::Text,
        }
    }
}

impl TypeMapper for SqliteTypeMapper {
    fn format_sql_type(&self, logical_type: &LogicalType) -> String {
        self.storage_type(logical_type).to_string()
    }
}
