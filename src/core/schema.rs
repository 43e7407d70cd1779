// スキーマドメインモデル
//
// モデル定義から導出されるスキーマを表現する型システム。
// ModelSchema, FieldSchema, LogicalType を提供します。
// これらは生成のたびに作り直される一時的な値です。

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 論理型
///
/// モデル定義で宣言されたフィールドの型を、SQL型へ写像する前の形で保持します。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// 名前付き型（修飾名を含む。例: `string`, `time.Time`）
    Named(String),
    /// 列型 `[]T`
    Sequence(Box<LogicalType>),
    /// マップ型 `map[K]V`
    Map(Box<LogicalType>, Box<LogicalType>),
    /// ポインタ・チャネル・関数など、スキーマとして扱わない型
    Unsupported,
}

impl LogicalType {
    pub fn named(name: impl Into<String>) -> Self {
        LogicalType::Named(name.into())
    }

    pub fn sequence(element: LogicalType) -> Self {
        LogicalType::Sequence(Box::new(element))
    }

    pub fn map(key: LogicalType, value: LogicalType) -> Self {
        LogicalType::Map(Box::new(key), Box::new(value))
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Named(name) => write!(f, "{}", name),
            LogicalType::Sequence(element) => write!(f, "[]{}", element),
            LogicalType::Map(key, value) => write!(f, "map[{}]{}", key, value),
            LogicalType::Unsupported => write!(f, "unknown"),
        }
    }
}

impl Serialize for LogicalType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// フィールド定義
///
/// モデル内の単一フィールドと、そのカラムとしての属性を表現します。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    /// 宣言されたフィールド名
    pub name: String,

    /// 論理型
    pub logical_type: LogicalType,

    /// `type:` アノテーションによるSQL型の上書き
    pub sql_type_override: Option<String>,

    pub is_primary_key: bool,

    /// 既定では true（宣言されたフィールドはすべて NOT NULL）
    pub is_not_null: bool,

    pub is_unique: bool,

    pub is_index: bool,

    /// DEFAULT 句に出力するリテラル
    pub default_value: Option<String>,

    /// 解析済みのアノテーション（キー -> 値）
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl FieldSchema {
    /// 新しいフィールドを作成
    pub fn new(name: String, logical_type: LogicalType) -> Self {
        Self {
            name,
            logical_type,
            sql_type_override: None,
            is_primary_key: false,
            is_not_null: true,
            is_unique: false,
            is_index: false,
            default_value: None,
            tags: BTreeMap::new(),
        }
    }

    /// カラム名（フィールド名の小文字化）
    pub fn column_name(&self) -> String {
        self.name.to_lowercase()
    }
}

/// モデル定義
///
/// 単一の集約型宣言と、それに対応するテーブルを表現します。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSchema {
    /// 宣言名
    pub name: String,

    /// テーブル名
    pub table_name: String,

    /// 宣言順のフィールド
    pub fields: Vec<FieldSchema>,
}

impl ModelSchema {
    /// 新しいモデルを作成（テーブル名は宣言名から導出）
    pub fn new(name: String) -> Self {
        let table_name = table_name_for(&name);
        Self {
            name,
            table_name,
            fields: Vec::new(),
        }
    }

    /// フィールドを追加
    pub fn add_field(&mut self, field: FieldSchema) {
        self.fields.push(field);
    }

    /// プライマリキーのフィールドを宣言順で取得
    pub fn primary_key_fields(&self) -> Vec<&FieldSchema> {
        self.fields.iter().filter(|f| f.is_primary_key).collect()
    }

    /// 指定されたフィールドを取得
    pub fn get_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// 宣言名からテーブル名を導出
///
/// 小文字化して `s` を付けるだけの単純な規則です。不規則な複数形には対応しません
/// （`Person` は `persons` になります）。
pub fn table_name_for(model_name: &str) -> String {
    format!("{}s", model_name.to_lowercase())
}
