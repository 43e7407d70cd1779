// マイグレーション実行サービス
//
// 未適用のマイグレーションファイルを昇順に読み込み、ステートメントを順番に実行します。
// 1ファイルのすべてのステートメントが成功した直後にタグを進め、
// 最初の失敗で処理全体を中断します（実行済みの文は巻き戻しません）。

use crate::core::config::DatabaseEngine;
use crate::core::error::{DatabaseError, MigrationError};
use crate::core::migration::{AppliedMigration, MigrationFile};
use crate::services::migration_store::MigrationFileStore;
use crate::services::migration_tag_tracker::MigrationTagTracker;
use crate::services::sql_parser::split_sql_statements;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use std::path::Path;
use tracing::{debug, info};

/// ステートメント実行インターフェース
///
/// 1つのSQL文を実行します。本番実装は adapters::database の AnyPool 実装です。
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute_statement(&self, sql: &str) -> Result<(), DatabaseError>;
}

/// 未適用のマイグレーション
///
/// ファイルと、そこから分割したステートメントの組です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMigration {
    pub file: MigrationFile,
    pub statements: Vec<String>,
}

/// 実行結果レポート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// 実行前のタグ
    pub initial_tag: u32,
    /// 実行後のタグ
    pub final_tag: u32,
    /// 今回適用したマイグレーション（適用順）
    pub applied: Vec<AppliedMigration>,
}

impl ExecutionReport {
    /// 適用対象が無かったかどうか
    pub fn is_nothing_to_do(&self) -> bool {
        self.applied.is_empty()
    }
}

/// マイグレーション実行サービス
#[derive(Debug, Clone)]
pub struct MigrationExecutorService {
    store: MigrationFileStore,
}

impl MigrationExecutorService {
    /// 新しいMigrationExecutorServiceを作成
    pub fn new() -> Self {
        Self {
            store: MigrationFileStore::new(),
        }
    }

    /// 未適用のマイグレーションを読み込み、ステートメントに分割する
    ///
    /// データベースにもタグにも触れません（dry-run や status 用）。
    pub fn plan(&self, migrations_dir: &Path, current_tag: u32) -> Result<Vec<PendingMigration>> {
        self.store
            .list(migrations_dir, current_tag)?
            .into_iter()
            .map(|file| -> Result<PendingMigration> {
                let statements = split_sql_statements(&self.store.read(&file)?);
                Ok(PendingMigration { file, statements })
            })
            .collect()
    }

    /// 未適用のマイグレーションをすべて適用する
    ///
    /// # Arguments
    ///
    /// * `executor` - ステートメントの実行先
    /// * `engine` - 実行先が対応するデータベースエンジン
    /// * `migrations_dir` - マイグレーションディレクトリ
    /// * `tracker` - タグの読み書きを行うトラッカー
    ///
    /// # Errors
    ///
    /// - プロジェクトのエンジンが `engine` と一致しない場合（ファイルを処理する前に検証）
    /// - ステートメントの実行に失敗した場合（失敗したファイルのタグは進めない）
    pub async fn run<E>(
        &self,
        executor: &E,
        engine: DatabaseEngine,
        migrations_dir: &Path,
        tracker: &MigrationTagTracker,
    ) -> Result<ExecutionReport>
    where
        E: StatementExecutor + ?Sized,
    {
        let metadata = tracker.load()?;
        metadata.ensure_engine(engine)?;

        let initial_tag = metadata.migration_tag;
        let mut report = ExecutionReport {
            initial_tag,
            final_tag: initial_tag,
            applied: Vec::new(),
        };

        let pending = self.store.list(migrations_dir, initial_tag)?;
        if pending.is_empty() {
            info!(migration_tag = initial_tag, "No pending migrations");
            return Ok(report);
        }

        for file in pending {
            let applied = self.apply_file(executor, &file).await?;

            // すべての文が成功したファイルのみタグを進める
            tracker.advance_to(file.sequence_number)?;
            report.final_tag = file.sequence_number;

            info!(
                migration = %file.full_name,
                statements = applied.statement_count,
                "Applied migration"
            );
            report.applied.push(applied);
        }

        Ok(report)
    }

    async fn apply_file<E>(&self, executor: &E, file: &MigrationFile) -> Result<AppliedMigration>
    where
        E: StatementExecutor + ?Sized,
    {
        let start_time = Local::now();
        let content = self
            .store
            .read(file)
            .map_err(|e| MigrationError::new(file.full_name.clone(), format!("{:#}", e)))?;
        let statements = split_sql_statements(&content);

        for statement in &statements {
            debug!(migration = %file.full_name, sql = %statement, "Executing statement");

            executor.execute_statement(statement).await.map_err(|e| {
                MigrationError::with_sql(file.full_name.clone(), e.to_string(), statement.clone())
            })?;
        }

        let end_time = Local::now();
        let duration = end_time.signed_duration_since(start_time);

        Ok(AppliedMigration::new(
            file,
            statements.len(),
            end_time,
            duration,
        ))
    }
}

impl Default for MigrationExecutorService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ProjectMetadata;
    use crate::core::error::ConfigError;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// 実行したSQLを記録し、指定した文字列を含む文で失敗するモック
    #[derive(Default)]
    struct RecordingExecutor {
        executed: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingExecutor {
        fn failing_on(pattern: &'static str) -> Self {
            Self {
                executed: Mutex::new(Vec::new()),
                fail_on: Some(pattern),
            }
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatementExecutor for RecordingExecutor {
        async fn execute_statement(&self, sql: &str) -> Result<(), DatabaseError> {
            if self.fail_on.is_some_and(|pattern| sql.contains(pattern)) {
                return Err(DatabaseError::Query {
                    message: "no such table: missing".to_string(),
                    sql: Some(sql.to_string()),
                });
            }
            self.executed.lock().unwrap().push(sql.to_string());
            Ok(())
        }
    }

    struct Project {
        _temp_dir: TempDir,
        migrations_dir: std::path::PathBuf,
        tracker: MigrationTagTracker,
    }

    fn project(migration_tag: u32, engine: &str, files: &[(&str, &str)]) -> Project {
        let temp_dir = TempDir::new().unwrap();
        let migrations_dir = temp_dir.path().join("migrations");
        fs::create_dir_all(&migrations_dir).unwrap();
        for (name, content) in files {
            fs::write(migrations_dir.join(name), content).unwrap();
        }

        let tracker = MigrationTagTracker::new(temp_dir.path().join("gaverModule.json"));
        let mut metadata = ProjectMetadata::new("shop".to_string(), DatabaseEngine::SQLite);
        metadata.project_database_type = engine.to_string();
        metadata.migration_tag = migration_tag;
        tracker.save(&metadata).unwrap();

        Project {
            _temp_dir: temp_dir,
            migrations_dir,
            tracker,
        }
    }

    #[tokio::test]
    async fn test_applies_pending_files_in_order() {
        let project = project(
            1,
            "sqlite",
            &[
                ("0001_users.sql", "CREATE TABLE users (id INTEGER);"),
                ("0003_comments.sql", "CREATE TABLE comments (id INTEGER);"),
                (
                    "0002_posts.sql",
                    "-- Migration for table: posts\nCREATE TABLE posts (\n  id INTEGER\n);\nCREATE INDEX idx ON posts (id);",
                ),
            ],
        );
        let executor = RecordingExecutor::default();
        let service = MigrationExecutorService::new();

        let report = service
            .run(
                &executor,
                DatabaseEngine::SQLite,
                &project.migrations_dir,
                &project.tracker,
            )
            .await
            .unwrap();

        assert_eq!(
            executor.executed(),
            vec![
                "CREATE TABLE posts ( id INTEGER );",
                "CREATE INDEX idx ON posts (id);",
                "CREATE TABLE comments (id INTEGER);",
            ]
        );
        assert_eq!(report.initial_tag, 1);
        assert_eq!(report.final_tag, 3);
        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.applied[0].statement_count, 2);
        assert_eq!(project.tracker.current_tag().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_failure_stops_run_and_keeps_last_successful_tag() {
        let project = project(
            1,
            "sqlite",
            &[
                ("0002_posts.sql", "CREATE TABLE posts (id INTEGER);"),
                (
                    "0003_broken.sql",
                    "CREATE TABLE ok (id INTEGER);\nINSERT INTO missing VALUES (1);\nCREATE TABLE never (id INTEGER);",
                ),
                ("0004_later.sql", "CREATE TABLE later (id INTEGER);"),
            ],
        );
        let executor = RecordingExecutor::failing_on("missing");
        let service = MigrationExecutorService::new();

        let err = service
            .run(
                &executor,
                DatabaseEngine::SQLite,
                &project.migrations_dir,
                &project.tracker,
            )
            .await
            .unwrap_err();

        let migration_error = err.downcast_ref::<MigrationError>().unwrap();
        assert_eq!(migration_error.migration(), "0003_broken.sql");
        assert_eq!(
            migration_error.sql_statement.as_deref(),
            Some("INSERT INTO missing VALUES (1);")
        );

        // 失敗前の文は実行済みのまま、後続は実行されない
        assert_eq!(
            executor.executed(),
            vec!["CREATE TABLE posts (id INTEGER);", "CREATE TABLE ok (id INTEGER);"]
        );
        assert_eq!(project.tracker.current_tag().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_file_reports_migration_name() {
        let project = project(
            0,
            "sqlite",
            &[("0001_users.sql", "CREATE TABLE users (id INTEGER);")],
        );
        // UTF-8として読めないファイル
        fs::write(project.migrations_dir.join("0002_binary.sql"), [0xff, 0xfe, 0xfd]).unwrap();
        let executor = RecordingExecutor::default();

        let err = MigrationExecutorService::new()
            .run(
                &executor,
                DatabaseEngine::SQLite,
                &project.migrations_dir,
                &project.tracker,
            )
            .await
            .unwrap_err();

        let migration_error = err.downcast_ref::<MigrationError>().unwrap();
        assert_eq!(migration_error.migration(), "0002_binary.sql");
        assert!(!migration_error.has_sql_statement());
        assert!(migration_error.error.contains("0002_binary.sql"));
        assert_eq!(project.tracker.current_tag().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_engine_mismatch_is_checked_before_any_file() {
        let project = project(
            0,
            "postgres",
            &[("0001_users.sql", "CREATE TABLE users (id INTEGER);")],
        );
        let executor = RecordingExecutor::default();
        let service = MigrationExecutorService::new();

        let err = service
            .run(
                &executor,
                DatabaseEngine::SQLite,
                &project.migrations_dir,
                &project.tracker,
            )
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<ConfigError>().unwrap().is_engine_mismatch());
        assert!(executor.executed().is_empty());
        assert_eq!(project.tracker.current_tag().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_nothing_to_do() {
        let project = project(
            2,
            "sqlite",
            &[
                ("0001_users.sql", "CREATE TABLE users (id INTEGER);"),
                ("0002_posts.sql", "CREATE TABLE posts (id INTEGER);"),
            ],
        );
        let executor = RecordingExecutor::default();
        let service = MigrationExecutorService::new();

        let report = service
            .run(
                &executor,
                DatabaseEngine::SQLite,
                &project.migrations_dir,
                &project.tracker,
            )
            .await
            .unwrap();

        assert!(report.is_nothing_to_do());
        assert_eq!(report.final_tag, 2);
        assert!(executor.executed().is_empty());
    }

    #[tokio::test]
    async fn test_empty_file_still_advances_tag() {
        let project = project(0, "sqlite", &[("0001_empty.sql", "")]);
        let executor = RecordingExecutor::default();

        let report = MigrationExecutorService::new()
            .run(
                &executor,
                DatabaseEngine::SQLite,
                &project.migrations_dir,
                &project.tracker,
            )
            .await
            .unwrap();

        assert_eq!(report.applied[0].statement_count, 0);
        assert_eq!(project.tracker.current_tag().unwrap(), 1);
    }

    #[test]
    fn test_plan_splits_pending_files() {
        let project = project(
            0,
            "sqlite",
            &[("0001_users.sql", "SELECT 1;\n-- c\nSELECT 2")],
        );

        let plan = MigrationExecutorService::new()
            .plan(&project.migrations_dir, 0)
            .unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].file.full_name, "0001_users.sql");
        assert_eq!(plan[0].statements, vec!["SELECT 1;", "SELECT 2;"]);
    }
}
