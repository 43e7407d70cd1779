// データベース設定の解決サービス
//
// コマンドライン引数と環境変数からデータベースファイルの場所を決定する。
// coreは純粋な構造体に保つ。

use crate::core::config::DatabaseConfig;
use crate::core::naming::DATABASE_DIR;
use std::path::{Path, PathBuf};

/// データベースファイルのパスを指定する環境変数
pub const DATABASE_ENV: &str = "GAVER_DATABASE";

/// データベース名を指定する環境変数
pub const DB_NAME_ENV: &str = "DB_NAME";

/// DB_NAME 未指定時のデータベース名
pub const DEFAULT_DB_NAME: &str = "app";

/// データベース設定の解決ユーティリティ
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfigResolver;

impl DatabaseConfigResolver {
    /// データベース設定を解決
    ///
    /// 優先順位: `--database` 引数 > `GAVER_DATABASE` > `internal/database/<DB_NAME>.db`。
    /// 相対パスはプロジェクトルートからの相対として扱います。
    pub fn resolve(
        project_root: &Path,
        database: Option<&Path>,
        timeout: Option<u64>,
    ) -> DatabaseConfig {
        let path = database
            .map(Path::to_path_buf)
            .or_else(|| non_empty_env(DATABASE_ENV).map(PathBuf::from))
            .unwrap_or_else(Self::default_database_path);

        let path = if path.is_absolute() {
            path
        } else {
            project_root.join(path)
        };

        let mut config = DatabaseConfig::new(path);
        config.timeout = timeout;
        config
    }

    /// 既定のデータベースファイルパス（プロジェクトルートからの相対）
    pub fn default_database_path() -> PathBuf {
        let db_name = non_empty_env(DB_NAME_ENV).unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        Path::new(DATABASE_DIR).join(format!("{}.db", db_name))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
