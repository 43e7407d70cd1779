// 命名ポリシー
//
// アプリケーション名と関連パスの単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "gaver";

/// プロジェクトメタデータファイル名
pub const METADATA_FILE: &str = "gaverModule.json";

/// モジュールのルートディレクトリ
pub const MODULES_DIR: &str = "modules";

/// 各モジュール配下のモデル定義ディレクトリ
pub const MODELS_DIR: &str = "models";

/// マイグレーションディレクトリ
pub const MIGRATIONS_DIR: &str = "migrations";

/// 既定のデータベースファイル配置ディレクトリ
pub const DATABASE_DIR: &str = "internal/database";

/// 命名プロファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingProfile {
    pub app_name: String,
    pub metadata_path: String,
    pub modules_dir: String,
    pub migrations_dir: String,
}

/// 命名ポリシー
pub trait NamingPolicy {
    fn current() -> NamingProfile;
}

/// 既定の命名ポリシー
pub struct DefaultNamingPolicy;

impl NamingPolicy for DefaultNamingPolicy {
    fn current() -> NamingProfile {
        NamingProfile {
            app_name: APP_NAME.to_string(),
            metadata_path: METADATA_FILE.to_string(),
            modules_dir: MODULES_DIR.to_string(),
            migrations_dir: MIGRATIONS_DIR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_naming_profile() {
        let profile = DefaultNamingPolicy::current();

        assert_eq!(profile.app_name, "gaver");
        assert_eq!(profile.metadata_path, "gaverModule.json");
        assert_eq!(profile.modules_dir, "modules");
        assert_eq!(profile.migrations_dir, "migrations");
    }
}
