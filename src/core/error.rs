// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、IoError, ParseError, ConfigError, DatabaseError,
// MigrationError, ConsistencyError を定義します。

use thiserror::Error;

/// I/Oエラー
///
/// ファイル操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// File read error
    #[error("Failed to read file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// File write error
    #[error("Failed to write file: {path} (cause: {cause})")]
    FileWrite {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Directory creation error
    #[error("Failed to create directory: {path} (cause: {cause})")]
    DirectoryCreate {
        /// ディレクトリパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Malformed metadata document
    #[error("Malformed project metadata: {path} (cause: {cause})")]
    MalformedMetadata {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

impl IoError {
    /// ファイルが見つからないエラーかどうか
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, IoError::FileNotFound { .. })
    }

    /// ファイル読み込みエラーかどうか
    pub fn is_file_read(&self) -> bool {
        matches!(self, IoError::FileRead { .. })
    }

    /// ファイル書き込みエラーかどうか
    pub fn is_file_write(&self) -> bool {
        matches!(self, IoError::FileWrite { .. })
    }

    /// ディレクトリ作成エラーかどうか
    pub fn is_directory_create(&self) -> bool {
        matches!(self, IoError::DirectoryCreate { .. })
    }

    /// メタデータ破損エラーかどうか
    pub fn is_malformed_metadata(&self) -> bool {
        matches!(self, IoError::MalformedMetadata { .. })
    }
}

/// モデル定義の解析エラー
///
/// 解析に失敗したファイルのパスを必ず保持します。
#[derive(Debug, Clone, Error)]
#[error("Failed to parse model file {path}: {message}")]
pub struct ParseError {
    /// 対象ファイルパス
    pub path: String,
    /// エラーメッセージ
    pub message: String,
}

impl ParseError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// 設定エラー
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Target engine mismatch
    #[error("Unsupported database engine: expected '{expected}', found '{actual}'")]
    EngineMismatch {
        /// このツールが対応するエンジン
        expected: String,
        /// プロジェクトに宣言されたエンジン
        actual: String,
    },

    /// Project metadata missing
    #[error(
        "Project metadata not found: {path}. Please initialize the project first with the `init` command."
    )]
    MetadataNotFound {
        /// メタデータファイルパス
        path: String,
    },
}

impl ConfigError {
    /// エンジン不一致エラーかどうか
    pub fn is_engine_mismatch(&self) -> bool {
        matches!(self, ConfigError::EngineMismatch { .. })
    }

    /// メタデータ未検出エラーかどうか
    pub fn is_metadata_not_found(&self) -> bool {
        matches!(self, ConfigError::MetadataNotFound { .. })
    }
}

/// データベースエラー
///
/// データベース操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Query execution error
    #[error("Query execution error: {message}")]
    Query {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
    },
}

impl DatabaseError {
    /// 接続エラーかどうか
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }

    /// クエリエラーかどうか
    pub fn is_query(&self) -> bool {
        matches!(self, DatabaseError::Query { .. })
    }
}

/// マイグレーションエラー
///
/// マイグレーション適用時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
#[error("Migration {migration} failed: {error}{}", format_sql_opt(.sql_statement))]
pub struct MigrationError {
    /// マイグレーションファイル名
    pub migration: String,
    /// エラーメッセージ
    pub error: String,
    /// 失敗したSQL文
    pub sql_statement: Option<String>,
}

impl MigrationError {
    /// 新しいマイグレーションエラーを作成
    pub fn new(migration: String, error: String) -> Self {
        Self {
            migration,
            error,
            sql_statement: None,
        }
    }

    /// SQL文を指定してマイグレーションエラーを作成
    pub fn with_sql(migration: String, error: String, sql_statement: String) -> Self {
        Self {
            migration,
            error,
            sql_statement: Some(sql_statement),
        }
    }

    /// マイグレーションファイル名を取得
    pub fn migration(&self) -> &str {
        &self.migration
    }

    /// SQL文が含まれているかどうか
    pub fn has_sql_statement(&self) -> bool {
        self.sql_statement.is_some()
    }
}

fn format_sql_opt(sql: &Option<String>) -> String {
    sql.as_ref()
        .map_or(String::new(), |statement| format!("\nSQL: {}", statement))
}

/// 整合性エラー
///
/// モデル定義やマイグレーションディレクトリの形状が想定外の場合に発生します。
#[derive(Debug, Clone, Error)]
pub enum ConsistencyError {
    /// Declaration shape error
    #[error("Unexpected declaration shape for '{name}' in {path}: {reason}")]
    DeclarationShape {
        /// 宣言名
        name: String,
        /// 対象ファイルパス
        path: String,
        /// 理由
        reason: String,
    },

    /// Duplicate column in one model
    #[error("Duplicate column '{column}' in model '{model}' ({path})")]
    DuplicateColumn {
        /// モデル名
        model: String,
        /// カラム名（小文字化済み）
        column: String,
        /// 対象ファイルパス
        path: String,
    },

    /// Duplicate migration sequence number
    #[error("Duplicate migration sequence number {sequence:04}: '{first}' and '{second}'")]
    DuplicateSequence {
        /// シーケンス番号
        sequence: u32,
        /// 一つ目のファイル名
        first: String,
        /// 二つ目のファイル名
        second: String,
    },

    /// Tag regression
    #[error("Migration tag cannot move backwards: current {current}, requested {requested}")]
    TagRegression {
        /// 現在のタグ
        current: u32,
        /// 要求されたタグ
        requested: u32,
    },

    /// No sequence number left after the current tag
    #[error(
        "Migration tag {current_tag} leaves no room for another sequence number (maximum {max})",
        max = crate::core::migration::MAX_SEQUENCE_NUMBER
    )]
    SequenceExhausted {
        /// 現在のタグ
        current_tag: u32,
    },
}

impl ConsistencyError {
    /// 宣言形状エラーかどうか
    pub fn is_declaration_shape(&self) -> bool {
        matches!(self, ConsistencyError::DeclarationShape { .. })
    }

    /// カラム重複エラーかどうか
    pub fn is_duplicate_column(&self) -> bool {
        matches!(self, ConsistencyError::DuplicateColumn { .. })
    }

    /// シーケンス番号重複エラーかどうか
    pub fn is_duplicate_sequence(&self) -> bool {
        matches!(self, ConsistencyError::DuplicateSequence { .. })
    }

    /// タグ後退エラーかどうか
    pub fn is_tag_regression(&self) -> bool {
        matches!(self, ConsistencyError::TagRegression { .. })
    }

    /// シーケンス番号枯渇エラーかどうか
    pub fn is_sequence_exhausted(&self) -> bool {
        matches!(self, ConsistencyError::SequenceExhausted { .. })
    }
}
