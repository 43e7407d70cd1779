// コマンド共通コンテキスト
//
// メタデータ読み込みやパス解決の重複をCLI層で集約する。

use crate::adapters::database::DatabaseConnectionService;
use crate::core::config::{DatabaseConfig, ProjectMetadata};
use crate::core::naming::{DefaultNamingPolicy, NamingPolicy, NamingProfile};
use crate::services::database_config_resolver::DatabaseConfigResolver;
use crate::services::migration_tag_tracker::MigrationTagTracker;
use anyhow::{Context, Result};
use sqlx::AnyPool;
use std::fs;
use std::path::{Path, PathBuf};

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub metadata_path: PathBuf,
    pub metadata: ProjectMetadata,
    pub naming: NamingProfile,
}

impl CommandContext {
    /// カスタムメタデータファイルパスを指定してコンテキストを作成
    pub fn load_with_metadata(
        project_path: PathBuf,
        custom_metadata_path: Option<PathBuf>,
    ) -> Result<Self> {
        let naming = DefaultNamingPolicy::current();
        let metadata_path = Self::resolve_metadata_path(&project_path, custom_metadata_path);

        let metadata = MigrationTagTracker::new(&metadata_path).load()?;
        metadata
            .validate()
            .with_context(|| format!("Invalid project metadata: {}", metadata_path.display()))?;

        Ok(Self {
            project_path,
            metadata_path,
            metadata,
            naming,
        })
    }

    /// メタデータファイルのパスを解決（カスタム指定があれば優先）
    pub fn resolve_metadata_path(
        project_path: &Path,
        custom_metadata_path: Option<PathBuf>,
    ) -> PathBuf {
        match custom_metadata_path {
            Some(path) if path.is_absolute() => path,
            Some(path) => project_path.join(path),
            None => project_path.join(DefaultNamingPolicy::current().metadata_path),
        }
    }

    /// タグトラッカー
    pub fn tracker(&self) -> MigrationTagTracker {
        MigrationTagTracker::new(&self.metadata_path)
    }

    /// モジュールのルートディレクトリ
    pub fn modules_dir(&self) -> PathBuf {
        self.project_path.join(&self.naming.modules_dir)
    }

    /// マイグレーションディレクトリ
    pub fn migrations_dir(&self) -> PathBuf {
        self.project_path.join(&self.naming.migrations_dir)
    }

    /// ディスク上に存在するが projectModules に宣言されていないモジュール
    pub fn undeclared_modules(&self) -> Result<Vec<String>> {
        let modules_dir = self.modules_dir();
        if !modules_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut undeclared = Vec::new();
        let entries = fs::read_dir(&modules_dir)
            .with_context(|| format!("Failed to read modules directory: {:?}", modules_dir))?;

        for entry in entries {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !self.metadata.project_modules.iter().any(|m| m == name) {
                undeclared.push(name.to_string());
            }
        }

        undeclared.sort();
        Ok(undeclared)
    }

    /// データベース設定を解決
    pub fn database_config(
        &self,
        database: Option<&Path>,
        timeout: Option<u64>,
    ) -> DatabaseConfig {
        DatabaseConfigResolver::resolve(&self.project_path, database, timeout)
    }

    /// 接続プールを作成し、接続を確認する
    pub async fn connect_pool(&self, config: &DatabaseConfig) -> Result<AnyPool> {
        let db_service = DatabaseConnectionService::new();
        let pool = db_service
            .create_pool(config)
            .await
            .with_context(|| "Failed to connect to database")?;

        if let Err(e) = db_service.test_connection(&pool).await {
            db_service.close_pool(pool).await;
            return Err(e).with_context(|| "Failed to connect to database");
        }

        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DatabaseEngine;
    use tempfile::TempDir;

    fn init_project(temp_dir: &TempDir, modules: &[&str]) {
        let mut metadata = ProjectMetadata::new("shop".to_string(), DatabaseEngine::SQLite);
        metadata.project_modules = modules.iter().map(|m| m.to_string()).collect();
        MigrationTagTracker::new(temp_dir.path().join("gaverModule.json"))
            .save(&metadata)
            .unwrap();
    }

    #[test]
    fn test_load_requires_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let err =
            CommandContext::load_with_metadata(temp_dir.path().to_path_buf(), None).unwrap_err();
        assert!(err.to_string().contains("init"));
    }

    #[test]
    fn test_paths_are_relative_to_project() {
        let temp_dir = TempDir::new().unwrap();
        init_project(&temp_dir, &[]);

        let context =
            CommandContext::load_with_metadata(temp_dir.path().to_path_buf(), None).unwrap();
        assert_eq!(context.modules_dir(), temp_dir.path().join("modules"));
        assert_eq!(context.migrations_dir(), temp_dir.path().join("migrations"));
        assert_eq!(context.metadata.project_name, "shop");
    }

    #[test]
    fn test_custom_metadata_path() {
        let temp_dir = TempDir::new().unwrap();
        let custom = temp_dir.path().join("config/project.json");
        fs::create_dir_all(custom.parent().unwrap()).unwrap();
        let metadata = ProjectMetadata::new("custom".to_string(), DatabaseEngine::SQLite);
        MigrationTagTracker::new(&custom).save(&metadata).unwrap();

        let context = CommandContext::load_with_metadata(
            temp_dir.path().to_path_buf(),
            Some(PathBuf::from("config/project.json")),
        )
        .unwrap();
        assert_eq!(context.metadata_path, custom);
        assert_eq!(context.metadata.project_name, "custom");
    }

    #[test]
    fn test_undeclared_modules() {
        let temp_dir = TempDir::new().unwrap();
        init_project(&temp_dir, &["users"]);
        fs::create_dir_all(temp_dir.path().join("modules/users/models")).unwrap();
        fs::create_dir_all(temp_dir.path().join("modules/blog/models")).unwrap();

        let context =
            CommandContext::load_with_metadata(temp_dir.path().to_path_buf(), None).unwrap();
        assert_eq!(context.undeclared_modules().unwrap(), vec!["blog"]);
    }
}
