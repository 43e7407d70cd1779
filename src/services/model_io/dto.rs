// モデル定義DTO
//
// YAML構造と内部モデルを分離するためのDTO層。
// 1ファイルに複数の型宣言を並べられます。

use serde::Deserialize;

/// モデル定義ファイル用DTO
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFileDto {
    /// 型宣言のリスト（省略時は空）
    #[serde(default)]
    pub models: Vec<DeclarationDto>,
}

/// 型宣言の種別
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// フィールドを持つ集約型（テーブルになる）
    #[default]
    Aggregate,
    /// 別名（テーブルにならない）
    Alias,
}

/// 型宣言DTO
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationDto {
    /// 宣言名
    pub name: String,

    #[serde(default)]
    pub kind: DeclarationKind,

    /// 集約型のフィールド
    #[serde(default)]
    pub fields: Option<Vec<FieldDto>>,

    /// 別名の参照先
    #[serde(default)]
    pub target: Option<String>,
}

/// フィールドDTO
///
/// `name` が無いフィールドは埋め込みフィールドとして扱われ、カラムにはなりません。
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDto {
    #[serde(default)]
    pub name: Option<String>,

    /// 型式（例: `string`, `[]string`, `map[string]int64`, `time.Time`）
    #[serde(rename = "type")]
    pub type_expr: String,

    /// アノテーション文字列（例: `json:"id" gorm:"primaryKey"`）
    #[serde(default)]
    pub tag: Option<String>,
}

impl FieldDto {
    /// 埋め込みフィールドかどうか
    pub fn is_embedded(&self) -> bool {
        self.name.as_deref().is_none_or(str::is_empty)
    }
}
