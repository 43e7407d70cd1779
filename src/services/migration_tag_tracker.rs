// マイグレーションタグトラッカー
//
// プロジェクトメタデータ（gaverModule.json）に保存された migrationTag を読み書きします。
// 更新は常にレコード全体の読み込み・変更・書き戻しで行い、
// 書き戻しは同じディレクトリの一時ファイルからのリネームで置き換えます。

use crate::core::config::ProjectMetadata;
use crate::core::error::{ConfigError, ConsistencyError, IoError};
use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// マイグレーションタグトラッカー
#[derive(Debug, Clone)]
pub struct MigrationTagTracker {
    metadata_path: PathBuf,
}

impl MigrationTagTracker {
    /// 指定されたメタデータファイルを対象とするトラッカーを作成
    pub fn new(metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            metadata_path: metadata_path.into(),
        }
    }

    /// メタデータファイルのパス
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// メタデータを読み込む
    ///
    /// # Errors
    ///
    /// - ファイルが存在しない場合は ConfigError::MetadataNotFound
    /// - JSONとして解釈できない場合は IoError::MalformedMetadata
    pub fn load(&self) -> Result<ProjectMetadata> {
        if !self.metadata_path.exists() {
            return Err(ConfigError::MetadataNotFound {
                path: self.metadata_path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(&self.metadata_path).map_err(|e| IoError::FileRead {
            path: self.metadata_path.display().to_string(),
            cause: e.to_string(),
        })?;

        let metadata: ProjectMetadata =
            serde_json::from_str(&content).map_err(|e| IoError::MalformedMetadata {
                path: self.metadata_path.display().to_string(),
                cause: e.to_string(),
            })?;

        Ok(metadata)
    }

    /// メタデータ全体を書き戻す
    pub fn save(&self, metadata: &ProjectMetadata) -> Result<()> {
        let content = encode_metadata(metadata)?;
        let write_error = |cause: String| IoError::FileWrite {
            path: self.metadata_path.display().to_string(),
            cause,
        };

        let parent = match self.metadata_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp_file =
            NamedTempFile::new_in(&parent).map_err(|e| write_error(e.to_string()))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| write_error(e.to_string()))?;
        temp_file
            .persist(&self.metadata_path)
            .map_err(|e| write_error(e.error.to_string()))?;

        debug!(
            path = %self.metadata_path.display(),
            migration_tag = metadata.migration_tag,
            "Saved project metadata"
        );
        Ok(())
    }

    /// 現在のタグを取得
    pub fn current_tag(&self) -> Result<u32> {
        Ok(self.load()?.migration_tag)
    }

    /// 読み込み・変更・書き戻しを1回で行う
    pub fn update<F>(&self, mutate: F) -> Result<ProjectMetadata>
    where
        F: FnOnce(&mut ProjectMetadata) -> Result<()>,
    {
        let mut metadata = self.load()?;
        mutate(&mut metadata)?;
        self.save(&metadata)?;
        Ok(metadata)
    }

    /// タグを指定したシーケンス番号まで進める
    ///
    /// タグを後退させる要求は ConsistencyError::TagRegression になります。
    pub fn advance_to(&self, sequence_number: u32) -> Result<ProjectMetadata> {
        self.update(|metadata| {
            if sequence_number < metadata.migration_tag {
                return Err(ConsistencyError::TagRegression {
                    current: metadata.migration_tag,
                    requested: sequence_number,
                }
                .into());
            }
            metadata.migration_tag = sequence_number;
            Ok(())
        })
    }
}

/// メタデータを4スペースインデントのJSONに変換（末尾改行付き）
pub fn encode_metadata(metadata: &ProjectMetadata) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    metadata.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DatabaseEngine;
    use tempfile::TempDir;

    fn tracker_with(temp_dir: &TempDir, migration_tag: u32) -> MigrationTagTracker {
        let tracker = MigrationTagTracker::new(temp_dir.path().join("gaverModule.json"));
        let mut metadata = ProjectMetadata::new("shop".to_string(), DatabaseEngine::SQLite);
        metadata.migration_tag = migration_tag;
        tracker.save(&metadata).unwrap();
        tracker
    }

    #[test]
    fn test_save_writes_four_space_indent() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_with(&temp_dir, 0);

        let content = fs::read_to_string(tracker.metadata_path()).unwrap();
        assert!(content.starts_with("{\n    \"type\": \"project\",\n    \"projectName\": \"shop\""));
        assert!(content.contains("\n    \"migrationTag\": 0\n}"));
        assert!(content.ends_with("}\n"));
    }

    #[test]
    fn test_load_missing_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = MigrationTagTracker::new(temp_dir.path().join("gaverModule.json"));

        let err = tracker.load().unwrap_err();
        assert!(err
            .downcast_ref::<ConfigError>()
            .unwrap()
            .is_metadata_not_found());
    }

    #[test]
    fn test_load_malformed_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gaverModule.json");
        fs::write(&path, "{ not json").unwrap();

        let err = MigrationTagTracker::new(&path).load().unwrap_err();
        assert!(err.downcast_ref::<IoError>().unwrap().is_malformed_metadata());
    }

    #[test]
    fn test_advance_to_persists_whole_record() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_with(&temp_dir, 1);

        tracker.advance_to(3).unwrap();

        let metadata = tracker.load().unwrap();
        assert_eq!(metadata.migration_tag, 3);
        assert_eq!(metadata.project_name, "shop");
        assert_eq!(tracker.current_tag().unwrap(), 3);
    }

    #[test]
    fn test_advance_to_refuses_regression() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_with(&temp_dir, 5);

        let err = tracker.advance_to(2).unwrap_err();
        assert!(err
            .downcast_ref::<ConsistencyError>()
            .unwrap()
            .is_tag_regression());
        assert_eq!(tracker.current_tag().unwrap(), 5);
    }

    #[test]
    fn test_update_preserves_unrelated_fields() {
        let temp_dir = TempDir::new().unwrap();
        let tracker = tracker_with(&temp_dir, 0);

        tracker
            .update(|metadata| {
                metadata.project_modules.push("users".to_string());
                Ok(())
            })
            .unwrap();

        let metadata = tracker.load().unwrap();
        assert_eq!(metadata.project_modules, vec!["users"]);
        assert_eq!(metadata.project_database_type, "sqlite");
    }
}
