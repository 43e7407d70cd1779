// マイグレーションファイルストア
//
// migrations ディレクトリ上のマイグレーションファイルの命名、列挙、書き込みを行います。
// ファイル名は `NNNN_slug.sql` 形式で、シーケンス番号の昇順が適用順です。

use crate::core::error::{ConsistencyError, IoError};
use crate::core::migration::{next_sequence_number, MigrationFile};
use crate::core::schema::ModelSchema;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// モデルが無い場合のスラッグ
pub const EMPTY_SLUG: &str = "empty";

/// マイグレーションファイルストア
#[derive(Debug, Clone)]
pub struct MigrationFileStore {}

impl MigrationFileStore {
    /// 新しいMigrationFileStoreを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 現在のタグより新しいマイグレーションファイルを昇順で列挙する
    ///
    /// # Arguments
    ///
    /// * `dir` - マイグレーションディレクトリ
    /// * `current_tag` - 適用済みの最大シーケンス番号
    ///
    /// # Returns
    ///
    /// シーケンス番号が `current_tag` より大きいファイルのリスト（昇順）。
    /// ディレクトリが存在しない場合は空のリストを返します。
    ///
    /// # Errors
    ///
    /// 同じシーケンス番号を持つファイルが複数ある場合は ConsistencyError を返します。
    pub fn list(&self, dir: &Path, current_tag: u32) -> Result<Vec<MigrationFile>> {
        let files = self.list_all(dir)?;
        let pending: Vec<MigrationFile> = files
            .into_iter()
            .filter(|file| file.sequence_number > current_tag)
            .collect();

        debug!(
            dir = %dir.display(),
            current_tag,
            pending = pending.len(),
            "Listed pending migrations"
        );
        Ok(pending)
    }

    /// ディレクトリ内のすべてのマイグレーションファイルを昇順で列挙する
    pub fn list_all(&self, dir: &Path) -> Result<Vec<MigrationFile>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(dir).map_err(|e| IoError::FileRead {
            path: dir.display().to_string(),
            cause: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| IoError::FileRead {
                path: dir.display().to_string(),
                cause: e.to_string(),
            })?;

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if let Some(file) = MigrationFile::from_file_name(dir, file_name) {
                files.push(file);
            }
        }

        files.sort_by(|a, b| {
            a.sequence_number
                .cmp(&b.sequence_number)
                .then_with(|| a.full_name.cmp(&b.full_name))
        });

        // 重複シーケンス番号の検出
        for window in files.windows(2) {
            if window[0].sequence_number == window[1].sequence_number {
                return Err(ConsistencyError::DuplicateSequence {
                    sequence: window[0].sequence_number,
                    first: window[0].full_name.clone(),
                    second: window[1].full_name.clone(),
                }
                .into());
            }
        }

        Ok(files)
    }

    /// 発見されたモデルからスラッグを決定する
    ///
    /// - モデルなし: `empty`
    /// - 1モデル: テーブル名の小文字
    /// - 2モデル以上: `multiple_YYYYMMDD_HHMMSS`
    pub fn generate_slug(&self, models: &[ModelSchema], now: DateTime<Local>) -> String {
        match models {
            [] => EMPTY_SLUG.to_string(),
            [model] => model.table_name.to_lowercase(),
            _ => format!("multiple_{}", now.format("%Y%m%d_%H%M%S")),
        }
    }

    /// 次のシーケンス番号で新しいマイグレーションファイルを書き込む
    ///
    /// 一時ファイルに書き込んでから上書きせずに配置するため、
    /// 書きかけのファイルが残ることはありません。
    ///
    /// # Errors
    ///
    /// - 同じシーケンス番号のファイルが既に存在する場合（未適用のマイグレーション）
    /// - シーケンス番号が4桁を超える場合
    pub fn write_new(
        &self,
        dir: &Path,
        current_tag: u32,
        slug: &str,
        sql: &str,
    ) -> Result<MigrationFile> {
        let sequence_number = next_sequence_number(current_tag)?;

        if let Some(existing) = self
            .list_all(dir)?
            .into_iter()
            .find(|file| file.sequence_number == sequence_number)
        {
            return Err(anyhow!(
                "Migration {} already exists and has not been applied yet. Apply it before generating a new migration.",
                existing.full_name
            ));
        }

        fs::create_dir_all(dir).map_err(|e| IoError::DirectoryCreate {
            path: dir.display().to_string(),
            cause: e.to_string(),
        })?;

        let file = MigrationFile::new(dir, sequence_number, slug);
        let write_error = |cause: String| IoError::FileWrite {
            path: file.path.display().to_string(),
            cause,
        };

        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| write_error(e.to_string()))?;
        temp_file
            .write_all(sql.as_bytes())
            .map_err(|e| write_error(e.to_string()))?;
        temp_file
            .persist_noclobber(&file.path)
            .map_err(|e| write_error(e.error.to_string()))?;

        debug!(file = %file.full_name, "Wrote migration file");
        Ok(file)
    }

    /// マイグレーションファイルの内容を読み込む（前後の空白は除去）
    pub fn read(&self, file: &MigrationFile) -> Result<String> {
        let content = fs::read_to_string(&file.path).map_err(|e| {
            let path = file.path.display().to_string();
            if e.kind() == ErrorKind::NotFound {
                IoError::FileNotFound { path }
            } else {
                IoError::FileRead {
                    path,
                    cause: e.to_string(),
                }
            }
        })?;
        Ok(content.trim().to_string())
    }
}

impl Default for MigrationFileStore {
    fn default() -> Self {
        Self::new()
    }
}
