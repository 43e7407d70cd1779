// applyコマンドハンドラー
//
// 未適用のマイグレーションを適用します。
// - メタデータからマイグレーションタグを取得
// - タグより新しいファイルを昇順に実行
// - ファイルごとにタグを更新
// - dry-runモード（データベースに接続せずSQLを表示）

use crate::adapters::sql_generator::sqlite::SqliteSqlGenerator;
use crate::adapters::sql_generator::SqlGenerator;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::services::migration_executor::{MigrationExecutorService, PendingMigration};
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// applyコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ApplyCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタムメタデータファイルパス
    pub metadata_path: Option<PathBuf>,
    /// dry-runモード
    pub dry_run: bool,
    /// データベースファイルのパス
    pub database: Option<PathBuf>,
    /// 接続取得のタイムアウト（秒）
    pub timeout: Option<u64>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// applyコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutput {
    pub dry_run: bool,
    /// 適用先データベース（dry-runではNone）
    pub database: Option<String>,
    pub initial_tag: u32,
    pub final_tag: u32,
    /// 適用した（dry-runでは適用予定の）マイグレーション
    pub migrations: Vec<ApplyEntry>,
}

/// マイグレーション1件分の出力
#[derive(Debug, Clone, Serialize)]
pub struct ApplyEntry {
    pub file: String,
    pub statement_count: usize,
    /// 実行時間（dry-runではNone）
    pub duration_ms: Option<i64>,
    /// 実行予定のステートメント（dry-runのみ）
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<String>,
}

impl CommandOutput for ApplyOutput {
    fn to_text(&self) -> String {
        if self.migrations.is_empty() {
            return format!(
                "No pending migrations. Nothing to do (migration tag: {}).",
                self.initial_tag
            );
        }

        let mut lines = Vec::new();

        if self.dry_run {
            lines.push(format!(
                "{} {} pending migration(s) would be applied:",
                "[dry-run]".cyan().bold(),
                self.migrations.len()
            ));
            for entry in &self.migrations {
                lines.push(String::new());
                lines.push(format!("-- {}", entry.file.bold()));
                lines.extend(entry.statements.iter().cloned());
            }
            return lines.join("\n");
        }

        for entry in &self.migrations {
            lines.push(format!(
                "{} Applied {} ({} statement(s), {} ms)",
                "✓".green().bold(),
                entry.file,
                entry.statement_count,
                entry.duration_ms.unwrap_or(0)
            ));
        }
        lines.push(format!(
            "Migration tag: {} -> {}",
            self.initial_tag, self.final_tag
        ));

        lines.join("\n")
    }
}

/// applyコマンドハンドラー
#[derive(Debug, Clone)]
pub struct ApplyCommandHandler {
    executor: MigrationExecutorService,
    generator: SqliteSqlGenerator,
}

impl ApplyCommandHandler {
    /// 新しいApplyCommandHandlerを作成
    pub fn new() -> Self {
        Self {
            executor: MigrationExecutorService::new(),
            generator: SqliteSqlGenerator::new(),
        }
    }

    /// applyコマンドを実行
    ///
    /// 失敗したマイグレーションのタグは進めず、それより前に適用したファイルの分だけタグが進みます。
    pub async fn execute(&self, command: &ApplyCommand) -> Result<String> {
        let context = CommandContext::load_with_metadata(
            command.project_path.clone(),
            command.metadata_path.clone(),
        )?;
        let engine = self.generator.engine();
        context.metadata.ensure_engine(engine)?;

        let migrations_dir = context.migrations_dir();
        let current_tag = context.metadata.migration_tag;

        if command.dry_run {
            let pending = self.executor.plan(&migrations_dir, current_tag)?;
            debug!(pending = pending.len(), "Planned pending migrations");
            let output = self.dry_run_output(current_tag, pending);
            return render_output(&output, &command.format);
        }

        let db_config = context.database_config(command.database.as_deref(), command.timeout);
        let pool = context.connect_pool(&db_config).await?;

        let result = self
            .executor
            .run(&pool, engine, &migrations_dir, &context.tracker())
            .await;
        pool.close().await;
        let report = result?;

        let output = ApplyOutput {
            dry_run: false,
            database: Some(db_config.path.display().to_string()),
            initial_tag: report.initial_tag,
            final_tag: report.final_tag,
            migrations: report
                .applied
                .iter()
                .map(|applied| ApplyEntry {
                    file: applied.full_name.clone(),
                    statement_count: applied.statement_count,
                    duration_ms: Some(applied.duration.num_milliseconds()),
                    statements: Vec::new(),
                })
                .collect(),
        };
        render_output(&output, &command.format)
    }

    fn dry_run_output(&self, current_tag: u32, pending: Vec<PendingMigration>) -> ApplyOutput {
        let final_tag = pending
            .last()
            .map_or(current_tag, |migration| migration.file.sequence_number);

        ApplyOutput {
            dry_run: true,
            database: None,
            initial_tag: current_tag,
            final_tag,
            migrations: pending
                .into_iter()
                .map(|migration| ApplyEntry {
                    file: migration.file.full_name,
                    statement_count: migration.statements.len(),
                    duration_ms: None,
                    statements: migration.statements,
                })
                .collect(),
        }
    }
}

impl Default for ApplyCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
