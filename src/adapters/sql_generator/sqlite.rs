// SQLite用SQLジェネレーター
//
// ModelSchema からSQLite用のDDL文を生成します。
// テーブルごとに CREATE TABLE IF NOT EXISTS と、索引・一意制約用の
// CREATE [UNIQUE] INDEX IF NOT EXISTS を出力するため、再実行しても結果は変わりません。

use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::type_mapping::{SqliteTypeMapper, TypeMapper};
use crate::core::config::DatabaseEngine;
use crate::core::schema::{FieldSchema, ModelSchema};

/// カラム定義のインデント
const INDENT: &str = "    ";

/// SQLite用SQLジェネレーター
#[derive(Debug, Clone)]
pub struct SqliteSqlGenerator {
    type_mapper: SqliteTypeMapper,
}

impl SqliteSqlGenerator {
    /// 新しいSqliteSqlGeneratorを作成
    pub fn new() -> Self {
        Self {
            type_mapper: SqliteTypeMapper::new(),
        }
    }

    /// 1モデル分のDDLを生成
    pub fn generate_model(&self, model: &ModelSchema) -> String {
        let mut sql = String::new();

        sql.push_str(&format!("-- Migration for table: {}\n", model.table_name));
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} (\n",
            model.table_name
        ));

        let mut clauses: Vec<String> = model
            .fields
            .iter()
            .map(|field| format!("{}{}", INDENT, self.generate_column_definition(field)))
            .collect();

        let primary_keys: Vec<&str> = model
            .primary_key_fields()
            .iter()
            .map(|field| field.name.as_str())
            .collect();
        if !primary_keys.is_empty() {
            clauses.push(format!(
                "{}PRIMARY KEY ({})",
                INDENT,
                primary_keys.join(", ")
            ));
        }

        sql.push_str(&clauses.join(",\n"));
        sql.push_str("\n);\n\n");

        for index_sql in self.generate_indexes(model) {
            sql.push_str(&index_sql);
            sql.push('\n');
        }

        sql.push('\n');
        sql
    }

    /// カラム定義のSQL文字列を生成
    ///
    /// プライマリキーのカラムには NOT NULL と DEFAULT を付けません。
    fn generate_column_definition(&self, field: &FieldSchema) -> String {
        let mut parts = vec![
            format!("\"{}\"", field.column_name()),
            self.type_mapper.resolve_field_type(field),
        ];

        if field.is_primary_key {
            parts.push("PRIMARY KEY".to_string());
        } else {
            if field.is_not_null {
                parts.push("NOT NULL".to_string());
            }
            if let Some(default_value) = &field.default_value {
                parts.push(format!("DEFAULT {}", default_value));
            }
        }

        parts.join(" ")
    }

    /// インデックス文を宣言順に生成（フィールドごとに通常インデックス、一意インデックスの順）
    fn generate_indexes(&self, model: &ModelSchema) -> Vec<String> {
        let mut indexes = Vec::new();

        for field in model.fields.iter().filter(|f| !f.is_primary_key) {
            if field.is_index {
                indexes.push(format!(
                    "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {} ({});",
                    model.table_name,
                    field.column_name(),
                    model.table_name,
                    field.name
                ));
            }

            if field.is_unique {
                indexes.push(format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_{}_{}_unique ON {} ({});",
                    model.table_name,
                    field.column_name(),
                    model.table_name,
                    field.name
                ));
            }
        }

        indexes
    }
}

impl Default for SqliteSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for SqliteSqlGenerator {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::SQLite
    }

    fn generate(&self, models: &[ModelSchema]) -> String {
        models
            .iter()
            .map(|model| self.generate_model(model))
            .collect()
    }
}
