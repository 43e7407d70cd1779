// モデル定義の入出力
//
// YAMLで宣言されたモデル定義ファイルを読み込み、ModelSchema に変換します。

pub mod annotation;
pub mod dto;
pub mod dto_converter;
pub mod type_expr;
