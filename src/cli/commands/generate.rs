// generateコマンドハンドラー
//
// モデル定義からマイグレーションファイルを生成します。
// - modules/<module>/models 配下のモデル定義を走査
// - SQLite用DDLを生成
// - 次のシーケンス番号でマイグレーションファイルを書き込み
// データベースとマイグレーションタグには触れません。

use crate::adapters::sql_generator::sqlite::SqliteSqlGenerator;
use crate::adapters::sql_generator::SqlGenerator;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::migration::MigrationFile;
use crate::services::migration_store::MigrationFileStore;
use crate::services::model_introspector::ModelIntrospectorService;
use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// generateコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct GenerateCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタムメタデータファイルパス
    pub metadata_path: Option<PathBuf>,
    /// SQLを表示するだけでファイルを書き込まない
    pub dry_run: bool,
    /// モデルが無くても空のマイグレーションを書き込む
    pub empty: bool,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// generateコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutput {
    /// 生成した（dry-runでは生成予定の）ファイル名
    pub migration_file: Option<String>,
    /// 発見したモデル名
    pub models: Vec<String>,
    /// 生成したSQL
    pub sql: String,
    pub dry_run: bool,
    pub warnings: Vec<String>,
}

impl CommandOutput for GenerateOutput {
    fn to_text(&self) -> String {
        let mut lines = Vec::new();

        for warning in &self.warnings {
            lines.push(format!("{} {}", "Warning:".yellow().bold(), warning));
        }

        match &self.migration_file {
            None => lines.push("No models found. Nothing to migrate.".to_string()),
            Some(file_name) if self.dry_run => {
                lines.push(format!(
                    "{} Would create migration: {}",
                    "[dry-run]".cyan().bold(),
                    file_name
                ));
                lines.push(String::new());
                lines.push(self.sql.trim_end().to_string());
            }
            Some(file_name) => {
                lines.push(format!(
                    "{} Created migration: {}",
                    "✓".green().bold(),
                    file_name
                ));
                for model in &self.models {
                    lines.push(format!("  - {}", model));
                }
            }
        }

        lines.join("\n")
    }
}

/// generateコマンドハンドラー
#[derive(Debug, Clone)]
pub struct GenerateCommandHandler {
    introspector: ModelIntrospectorService,
    store: MigrationFileStore,
    generator: SqliteSqlGenerator,
}

impl GenerateCommandHandler {
    /// 新しいGenerateCommandHandlerを作成
    pub fn new() -> Self {
        Self {
            introspector: ModelIntrospectorService::new(),
            store: MigrationFileStore::new(),
            generator: SqliteSqlGenerator::new(),
        }
    }

    /// generateコマンドを実行
    ///
    /// モデルの走査・SQL生成に失敗した場合、ファイルは一切書き込まれません。
    pub fn execute(&self, command: &GenerateCommand) -> Result<String> {
        let context = CommandContext::load_with_metadata(
            command.project_path.clone(),
            command.metadata_path.clone(),
        )?;
        context.metadata.ensure_engine(self.generator.engine())?;

        let warnings = self.undeclared_module_warnings(&context)?;

        let model_dirs = self
            .introspector
            .find_model_directories(&context.modules_dir())?;
        let models = self
            .introspector
            .scan_directories(&model_dirs)
            .with_context(|| "Failed to read model declarations")?;
        debug!(count = models.len(), "Discovered models");

        let model_names: Vec<String> = models.iter().map(|m| m.name.clone()).collect();

        if models.is_empty() && !command.empty {
            let output = GenerateOutput {
                migration_file: None,
                models: model_names,
                sql: String::new(),
                dry_run: command.dry_run,
                warnings,
            };
            return render_output(&output, &command.format);
        }

        let sql = self.generator.generate(&models);
        let slug = self.store.generate_slug(&models, Local::now());
        let migrations_dir = context.migrations_dir();
        let current_tag = context.metadata.migration_tag;

        let file = if command.dry_run {
            MigrationFile::new(
                &migrations_dir,
                context.metadata.next_sequence_number()?,
                &slug,
            )
        } else {
            self.store
                .write_new(&migrations_dir, current_tag, &slug, &sql)
                .with_context(|| "Failed to write migration file")?
        };

        let output = GenerateOutput {
            migration_file: Some(file.full_name),
            models: model_names,
            sql,
            dry_run: command.dry_run,
            warnings,
        };
        render_output(&output, &command.format)
    }

    fn undeclared_module_warnings(&self, context: &CommandContext) -> Result<Vec<String>> {
        let undeclared = context.undeclared_modules()?;
        Ok(undeclared
            .into_iter()
            .map(|module| {
                warn!(module = %module, "Module is not listed in projectModules");
                format!(
                    "Module '{}' is not listed in projectModules of {}",
                    module,
                    context.metadata_path.display()
                )
            })
            .collect())
    }
}

impl Default for GenerateCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
