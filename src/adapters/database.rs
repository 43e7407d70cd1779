// データベース接続アダプター
//
// SQLxを使用したSQLiteデータベース接続の管理を行います。
// マイグレーションは単一の接続で逐次実行します。

use crate::core::config::DatabaseConfig;
use crate::core::error::DatabaseError;
use crate::services::migration_executor::StatementExecutor;
use async_trait::async_trait;
use sqlx::pool::PoolOptions;
use sqlx::{Any, AnyPool};
use std::fs;
use std::time::Duration;
use tracing::debug;

/// 接続取得タイムアウトの既定値（秒）
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// データベース接続サービス
///
/// データベース接続プールの初期化と管理を行います。
#[derive(Debug, Clone)]
pub struct DatabaseConnectionService {}

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// データベース接続プールを作成
    ///
    /// データベースファイルの親ディレクトリが無い場合は作成します。
    ///
    /// # Arguments
    ///
    /// * `config` - データベース設定
    ///
    /// # Returns
    ///
    /// 接続プールまたはエラー
    pub async fn create_pool(&self, config: &DatabaseConfig) -> Result<AnyPool, DatabaseError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DatabaseError::Connection {
                    message: format!(
                        "Failed to create database directory: {}",
                        parent.display()
                    ),
                    cause: e.to_string(),
                })?;
            }
        }

        let connection_string = config.to_connection_string()?;
        debug!(database = %config.path.display(), "Connecting to database");

        self.create_pool_options(config.timeout)
            .connect(&connection_string)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!(
                    "Failed to open SQLite database: {}",
                    config.path.display()
                ),
                cause: e.to_string(),
            })
    }

    /// 接続テストを実行
    pub async fn test_connection(&self, pool: &AnyPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Connection {
                message: "Database connection test failed".to_string(),
                cause: e.to_string(),
            })
    }

    /// プールオプションを作成
    ///
    /// ステートメントを逐次実行するため、接続数は1に固定します。
    pub fn create_pool_options(&self, timeout_secs: Option<u64>) -> PoolOptions<Any> {
        let timeout = timeout_secs.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS);
        PoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(timeout))
    }

    /// 接続プールを閉じる
    pub async fn close_pool(&self, pool: AnyPool) {
        pool.close().await;
    }
}

impl Default for DatabaseConnectionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatementExecutor for AnyPool {
    async fn execute_statement(&self, sql: &str) -> Result<(), DatabaseError> {
        sqlx::query(sql)
            .execute(self)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Query {
                message: e.to_string(),
                sql: Some(sql.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;
    use tempfile::TempDir;

    #[test]
    fn test_new_service() {
        let service = DatabaseConnectionService::new();
        assert!(format!("{:?}", service).contains("DatabaseConnectionService"));
    }

    #[tokio::test]
    async fn test_create_pool_creates_database_file() {
        sqlx::any::install_default_drivers();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("internal/database/app.db");
        let config = DatabaseConfig::new(path.clone());

        let service = DatabaseConnectionService::new();
        let pool = service.create_pool(&config).await.unwrap();
        service.test_connection(&pool).await.unwrap();

        assert!(path.exists());
        service.close_pool(pool).await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_create_pool_with_url_characters_in_path() {
        sqlx::any::install_default_drivers();
        let temp_dir = TempDir::new().unwrap();
        let service = DatabaseConnectionService::new();

        for dir in ["p%20q", "q?x", "with space#hash"] {
            let path = temp_dir.path().join(dir).join("app.db");
            let pool = service
                .create_pool(&DatabaseConfig::new(path.clone()))
                .await
                .unwrap();
            pool.execute_statement("CREATE TABLE IF NOT EXISTS notes (\"body\" TEXT);")
                .await
                .unwrap();
            service.close_pool(pool).await;

            // エンコードされた名前ではなく指定したパスにファイルができる
            assert!(path.is_file(), "missing database file in {:?}", dir);
        }
    }

    #[tokio::test]
    async fn test_execute_statement_on_pool() {
        sqlx::any::install_default_drivers();
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig::new(temp_dir.path().join("test.db"));

        let service = DatabaseConnectionService::new();
        let pool = service.create_pool(&config).await.unwrap();

        pool.execute_statement("CREATE TABLE notes (\"body\" TEXT NOT NULL);")
            .await
            .unwrap();
        pool.execute_statement("INSERT INTO notes (body) VALUES ('hello');")
            .await
            .unwrap();

        let row = sqlx::query("SELECT COUNT(*) AS count FROM notes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<i64, _>("count"), 1);

        let err = pool
            .execute_statement("INSERT INTO missing VALUES (1);")
            .await
            .unwrap_err();
        assert!(err.is_query());

        service.close_pool(pool).await;
    }
}
