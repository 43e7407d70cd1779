// 統合テスト共通ヘルパー
//
// テスト全体で共有されるユーティリティ関数を集約する。
// テストファイルから `mod common;` で利用可能。

use anyhow::Result;
use gaver::cli::commands::init::{InitCommand, InitCommandHandler};
use gaver::cli::OutputFormat;
use gaver::services::migration_tag_tracker::MigrationTagTracker;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 主キーを持たないユーザーモデル（SQLiteへそのまま適用できる）
#[allow(dead_code)]
pub const USER_MODEL: &str = r#"
models:
  - name: User
    fields:
      - name: Email
        type: string
        tag: 'json:"email" gorm:"uniqueIndex;not null"'
      - name: Age
        type: int
        tag: 'gorm:"index;default:0"'
      - name: Tags
        type: "[]string"
      - type: Timestamps
"#;

/// 主キーを持たない投稿モデル
#[allow(dead_code)]
pub const POST_MODEL: &str = r#"
models:
  - name: Post
    fields:
      - name: Title
        type: string
      - name: Score
        type: float64
      - name: Published
        type: bool
        tag: 'gorm:"default:0"'
  - name: PostID
    kind: alias
    target: uint
"#;

/// テスト用のプロジェクトを初期化
///
/// `modules` を projectModules に登録し、各モジュールの models ディレクトリを作成します。
pub fn setup_project(modules: &[&str]) -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let project_path = temp_dir.path().to_path_buf();

    InitCommandHandler::new().execute(&InitCommand {
        project_path: project_path.clone(),
        metadata_path: None,
        project_name: Some("shop".to_string()),
        force: false,
        format: OutputFormat::Text,
    })?;

    tracker(&project_path).update(|metadata| {
        metadata.project_modules = modules.iter().map(|m| m.to_string()).collect();
        Ok(())
    })?;

    for module in modules {
        fs::create_dir_all(models_dir(&project_path, module))?;
    }

    Ok((temp_dir, project_path))
}

/// モジュールの models ディレクトリ
pub fn models_dir(project_path: &Path, module: &str) -> PathBuf {
    project_path.join("modules").join(module).join("models")
}

/// モデル定義ファイルを書き込む
#[allow(dead_code)]
pub fn write_model(project_path: &Path, module: &str, file_name: &str, content: &str) {
    let dir = models_dir(project_path, module);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name), content).unwrap();
}

/// マイグレーションファイルを直接書き込む
#[allow(dead_code)]
pub fn write_migration(project_path: &Path, file_name: &str, content: &str) {
    let dir = project_path.join("migrations");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name), content).unwrap();
}

/// マイグレーションディレクトリ内のファイル名（昇順）
#[allow(dead_code)]
pub fn migration_file_names(project_path: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(project_path.join("migrations"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// プロジェクトのタグトラッカー
pub fn tracker(project_path: &Path) -> MigrationTagTracker {
    MigrationTagTracker::new(project_path.join("gaverModule.json"))
}
