// initコマンドハンドラー
//
// プロジェクトの初期化処理を実装します。
// - ディレクトリ構造の作成（modules/, migrations/）
// - プロジェクトメタデータの生成（gaverModule.json）
// - 初期化済みプロジェクトの検出

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::config::{DatabaseEngine, ProjectMetadata};
use crate::core::naming::{DefaultNamingPolicy, NamingPolicy};
use crate::services::migration_tag_tracker::MigrationTagTracker;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// initコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct InitCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタムメタデータファイルパス
    pub metadata_path: Option<PathBuf>,
    /// プロジェクト名（省略時はディレクトリ名）
    pub project_name: Option<String>,
    /// 強制的に初期化（既存のメタデータを上書き）
    pub force: bool,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// initコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct InitOutput {
    pub project_name: String,
    pub metadata_path: String,
    pub database_type: String,
}

impl CommandOutput for InitOutput {
    fn to_text(&self) -> String {
        format!(
            "{} Initialized project '{}' ({})\n  metadata: {}",
            "✓".green().bold(),
            self.project_name,
            self.database_type,
            self.metadata_path
        )
    }
}

/// initコマンドハンドラー
#[derive(Debug, Clone)]
pub struct InitCommandHandler {}

impl InitCommandHandler {
    /// 新しいInitCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// initコマンドを実行
    pub fn execute(&self, command: &InitCommand) -> Result<String> {
        let metadata_path = CommandContext::resolve_metadata_path(
            &command.project_path,
            command.metadata_path.clone(),
        );

        if metadata_path.exists() && !command.force {
            return Err(anyhow!(
                "Project is already initialized ({}). Use --force option to force re-initialization.",
                metadata_path.display()
            ));
        }

        self.create_directory_structure(&command.project_path)?;

        let project_name = command
            .project_name
            .clone()
            .unwrap_or_else(|| self.default_project_name(&command.project_path));
        let metadata = ProjectMetadata::new(project_name, DatabaseEngine::SQLite);

        if let Some(parent) = metadata_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        MigrationTagTracker::new(&metadata_path).save(&metadata)?;

        info!(project = %metadata.project_name, "Initialized project");

        let output = InitOutput {
            project_name: metadata.project_name.clone(),
            metadata_path: metadata_path.display().to_string(),
            database_type: metadata.project_database_type.clone(),
        };
        render_output(&output, &command.format)
    }

    /// ディレクトリ構造を作成
    pub fn create_directory_structure(&self, project_path: &Path) -> Result<()> {
        let naming = DefaultNamingPolicy::current();

        for dir_name in [&naming.modules_dir, &naming.migrations_dir] {
            let dir = project_path.join(dir_name);
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}/ directory: {:?}", dir_name, dir))?;
        }

        Ok(())
    }

    /// ディレクトリ名からプロジェクト名を決める
    fn default_project_name(&self, project_path: &Path) -> String {
        project_path
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("app")
            .to_string()
    }
}

impl Default for InitCommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
