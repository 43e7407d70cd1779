// SQL生成アダプター
//
// ModelSchema のリストから対象エンジン用のDDL文を生成するアダプター層。

pub mod sqlite;

use crate::core::config::DatabaseEngine;
use crate::core::schema::ModelSchema;

/// SQLジェネレータートレイト
///
/// 各データベースエンジン用のSQLジェネレーターが実装すべきインターフェース。
/// 同じ入力に対しては常にバイト単位で同一の出力を返します。
pub trait SqlGenerator {
    /// 対象とするデータベースエンジン
    fn engine(&self) -> DatabaseEngine;

    /// モデルのリストからマイグレーションSQLを生成
    ///
    /// # Arguments
    ///
    /// * `models` - 宣言順のモデルのリスト
    ///
    /// # Returns
    ///
    /// マイグレーションファイルにそのまま書き込めるSQL文字列
    fn generate(&self, models: &[ModelSchema]) -> String;
}
