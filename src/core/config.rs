// プロジェクト設定
//
// プロジェクトメタデータ（gaverModule.json）と対象データベースエンジン、
// データベース接続設定を表現します。ファイルI/Oはサービス層に置きます。

use crate::core::error::{ConfigError, ConsistencyError, DatabaseError};
use crate::core::migration;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// データベースエンジン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    #[serde(rename = "sqlite")]
    SQLite,
}

impl std::fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseEngine::SQLite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for DatabaseEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite" => Ok(DatabaseEngine::SQLite),
            other => Err(anyhow!(
                "Unsupported database engine: {}. Only sqlite is supported.",
                other
            )),
        }
    }
}

/// プロジェクトメタデータ
///
/// プロジェクト全体で唯一の永続的な可変状態です。
/// 更新は常にレコード全体の書き換えで行います。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// ドキュメント種別
    #[serde(rename = "type", default = "default_metadata_type")]
    pub kind: String,

    /// プロジェクト名
    pub project_name: String,

    /// プロジェクトのバージョン
    #[serde(default)]
    pub project_version: String,

    /// 宣言済みモジュール（順序付き）
    #[serde(default)]
    pub project_modules: Vec<String>,

    /// 対象データベースエンジン（未対応の値も検出できるよう文字列で保持）
    pub project_database_type: String,

    /// 最後に適用が完了したマイグレーションのシーケンス番号
    #[serde(default)]
    pub migration_tag: u32,
}

fn default_metadata_type() -> String {
    "project".to_string()
}

impl ProjectMetadata {
    /// 新しいプロジェクトメタデータを作成
    pub fn new(project_name: String, engine: DatabaseEngine) -> Self {
        Self {
            kind: default_metadata_type(),
            project_name,
            project_version: "0.1.0".to_string(),
            project_modules: Vec::new(),
            project_database_type: engine.to_string(),
            migration_tag: 0,
        }
    }

    /// 次に生成・適用されるシーケンス番号
    pub fn next_sequence_number(&self) -> Result<u32, ConsistencyError> {
        migration::next_sequence_number(self.migration_tag)
    }

    /// 宣言されたエンジンが指定エンジンと一致することを検証
    pub fn ensure_engine(&self, expected: DatabaseEngine) -> Result<(), ConfigError> {
        if self.project_database_type == expected.to_string() {
            Ok(())
        } else {
            Err(ConfigError::EngineMismatch {
                expected: expected.to_string(),
                actual: self.project_database_type.clone(),
            })
        }
    }

    /// メタデータの妥当性を検証
    pub fn validate(&self) -> Result<()> {
        if self.project_name.is_empty() {
            return Err(anyhow!("Project name is not specified"));
        }

        if self.project_database_type.is_empty() {
            return Err(anyhow!("Project database type is not specified"));
        }

        Ok(())
    }
}

/// std::str::FromStrトレイトの実装
impl FromStr for ProjectMetadata {
    type Err = anyhow::Error;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(json).with_context(|| "Failed to parse project metadata")
    }
}

/// データベース接続設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// SQLiteデータベースファイルのパス
    pub path: PathBuf,

    /// 接続取得タイムアウト（秒）
    pub timeout: Option<u64>,
}

impl DatabaseConfig {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            timeout: None,
        }
    }

    /// 接続文字列を構築（ファイルが無ければ作成する）
    ///
    /// パスは絶対パスにしてからパーセントエンコードするため、
    /// `%` や `?` を含むディレクトリ名でもそのまま開けます。
    pub fn to_connection_string(&self) -> Result<String, DatabaseError> {
        let invalid_path = |cause: String| DatabaseError::Connection {
            message: format!("Invalid database path: {}", self.path.display()),
            cause,
        };

        let absolute = std::path::absolute(&self.path).map_err(|e| invalid_path(e.to_string()))?;
        let file_url = Url::from_file_path(&absolute)
            .map_err(|_| invalid_path("path cannot be expressed as a URL".to_string()))?;

        Ok(format!("sqlite://{}?mode=rwc", file_url.path()))
    }
}
