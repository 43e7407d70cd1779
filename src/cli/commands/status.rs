// statusコマンドハンドラー
//
// マイグレーション状態の確認機能を実装します。
// データベースには接続せず、メタデータのタグとマイグレーションファイルを照合します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::services::migration_store::MigrationFileStore;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// statusコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct StatusCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタムメタデータファイルパス
    pub metadata_path: Option<PathBuf>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// マイグレーションのステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatusValue {
    Applied,
    Pending,
}

/// マイグレーションステータスエントリ
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatusEntry {
    pub sequence_number: u32,
    pub file: String,
    pub status: MigrationStatusValue,
}

/// statusコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    pub project_name: String,
    pub database_type: String,
    pub migration_tag: u32,
    /// 4桁の範囲を使い切っている場合はNone
    pub next_sequence_number: Option<u32>,
    pub migrations: Vec<MigrationStatusEntry>,
}

impl StatusOutput {
    fn pending_count(&self) -> usize {
        self.migrations
            .iter()
            .filter(|m| m.status == MigrationStatusValue::Pending)
            .count()
    }
}

impl CommandOutput for StatusOutput {
    fn to_text(&self) -> String {
        let mut lines = vec![
            format!("Project:        {} ({})", self.project_name, self.database_type),
            format!("Migration tag:  {}", self.migration_tag),
            match self.next_sequence_number {
                Some(next) => format!("Next sequence:  {:04}", next),
                None => format!("Next sequence:  {}", "exhausted".red()),
            },
        ];

        if self.migrations.is_empty() {
            lines.push("No migration files found.".to_string());
            return lines.join("\n");
        }

        lines.push(String::new());
        for entry in &self.migrations {
            let status = match entry.status {
                MigrationStatusValue::Applied => "applied".green(),
                MigrationStatusValue::Pending => "pending".yellow(),
            };
            lines.push(format!("  {:<8} {}", status, entry.file));
        }

        lines.push(String::new());
        lines.push(format!("{} pending migration(s)", self.pending_count()));
        lines.join("\n")
    }
}

/// statusコマンドハンドラー
#[derive(Debug, Default)]
pub struct StatusCommandHandler {
    store: MigrationFileStore,
}

impl StatusCommandHandler {
    /// 新しいStatusCommandHandlerを作成
    pub fn new() -> Self {
        Self {
            store: MigrationFileStore::new(),
        }
    }

    /// statusコマンドを実行
    pub fn execute(&self, command: &StatusCommand) -> Result<String> {
        let context = CommandContext::load_with_metadata(
            command.project_path.clone(),
            command.metadata_path.clone(),
        )?;
        let migration_tag = context.metadata.migration_tag;

        let files = self.store.list_all(&context.migrations_dir())?;
        debug!(count = files.len(), "Loaded local migrations");

        let migrations = files
            .into_iter()
            .map(|file| MigrationStatusEntry {
                sequence_number: file.sequence_number,
                status: if file.sequence_number <= migration_tag {
                    MigrationStatusValue::Applied
                } else {
                    MigrationStatusValue::Pending
                },
                file: file.full_name,
            })
            .collect();

        let output = StatusOutput {
            project_name: context.metadata.project_name.clone(),
            database_type: context.metadata.project_database_type.clone(),
            migration_tag,
            next_sequence_number: context.metadata.next_sequence_number().ok(),
            migrations,
        };
        render_output(&output, &command.format)
    }
}
