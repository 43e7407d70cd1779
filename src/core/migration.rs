// マイグレーションドメインモデル
//
// マイグレーションファイルと適用結果を表現する型。
// ファイル名規則 `NNNN_slug.sql` の組み立てと解析もここに置きます。

use crate::core::error::ConsistencyError;
use chrono::{DateTime, Duration, Local};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// シーケンス番号の桁数
pub const SEQUENCE_WIDTH: usize = 4;

/// 4桁で表現できる最大のシーケンス番号
pub const MAX_SEQUENCE_NUMBER: u32 = 9999;

/// マイグレーションファイル名のパターン
pub static MIGRATION_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})_(.+)\.sql$").expect("valid migration file regex"));

/// マイグレーションファイル
///
/// 生成時に一度だけ作られ、以後は変更されません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFile {
    /// シーケンス番号
    pub sequence_number: u32,
    /// スラッグ（ファイル名の可読部分）
    pub slug: String,
    /// ファイルパス
    pub path: PathBuf,
    /// ファイル名
    pub full_name: String,
}

impl MigrationFile {
    /// ディレクトリ、シーケンス番号、スラッグからマイグレーションファイルを作成
    pub fn new(dir: &Path, sequence_number: u32, slug: &str) -> Self {
        let full_name = migration_file_name(sequence_number, slug);
        Self {
            sequence_number,
            slug: slug.to_string(),
            path: dir.join(&full_name),
            full_name,
        }
    }

    /// ファイル名を解析してマイグレーションファイルを作成
    ///
    /// 命名規則に合わない場合はNoneを返します。
    pub fn from_file_name(dir: &Path, file_name: &str) -> Option<Self> {
        let captures = MIGRATION_FILE_REGEX.captures(file_name)?;
        let sequence_number = captures[1].parse::<u32>().ok()?;

        Some(Self {
            sequence_number,
            slug: captures[2].to_string(),
            path: dir.join(file_name),
            full_name: file_name.to_string(),
        })
    }
}

/// マイグレーションファイル名を組み立てる
pub fn migration_file_name(sequence_number: u32, slug: &str) -> String {
    format!(
        "{:0width$}_{}.sql",
        sequence_number,
        slug,
        width = SEQUENCE_WIDTH
    )
}

/// 現在のタグに続くシーケンス番号
///
/// 4桁に収まらない場合（u32 の上限を含む）はエラーを返します。
pub fn next_sequence_number(current_tag: u32) -> Result<u32, ConsistencyError> {
    current_tag
        .checked_add(1)
        .filter(|next| *next <= MAX_SEQUENCE_NUMBER)
        .ok_or(ConsistencyError::SequenceExhausted { current_tag })
}

/// 適用済みマイグレーション
///
/// 1ファイル分の適用結果を表現します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    /// シーケンス番号
    pub sequence_number: u32,
    /// ファイル名
    pub full_name: String,
    /// 実行したSQL文の数
    pub statement_count: usize,
    /// 適用完了日時
    pub applied_at: DateTime<Local>,
    /// 実行時間
    pub duration: Duration,
}

impl AppliedMigration {
    /// 新しい適用済みマイグレーションを作成
    pub fn new(
        file: &MigrationFile,
        statement_count: usize,
        applied_at: DateTime<Local>,
        duration: Duration,
    ) -> Self {
        Self {
            sequence_number: file.sequence_number,
            full_name: file.full_name.clone(),
            statement_count,
            applied_at,
            duration,
        }
    }
}
