// モデルイントロスペクターサービス
//
// モジュールディレクトリ配下のモデル定義ファイルを走査し、
// ModelSchema のリストを生成するサービス。

use crate::core::error::{IoError, ParseError};
use crate::core::naming::MODELS_DIR;
use crate::core::schema::ModelSchema;
use crate::services::model_io::dto::ModelFileDto;
use crate::services::model_io::dto_converter::DtoConverterService;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// モデルイントロスペクターサービス
#[derive(Debug, Clone)]
pub struct ModelIntrospectorService {
    converter: DtoConverterService,
}

impl ModelIntrospectorService {
    /// 新しいModelIntrospectorServiceを作成
    pub fn new() -> Self {
        Self {
            converter: DtoConverterService::new(),
        }
    }

    /// モジュールルート直下から `models` ディレクトリを持つモジュールを探す
    ///
    /// # Arguments
    ///
    /// * `modules_root` - モジュールのルートディレクトリ
    ///
    /// # Returns
    ///
    /// `<modules_root>/<module>/models` のパスのリスト（モジュール名順）。
    /// ルートディレクトリが存在しない場合は空のリストを返します。
    pub fn find_model_directories(&self, modules_root: &Path) -> Result<Vec<PathBuf>> {
        if !modules_root.is_dir() {
            debug!(root = %modules_root.display(), "Modules directory not found");
            return Ok(Vec::new());
        }

        let model_dirs: Vec<PathBuf> = read_dir_sorted(modules_root)?
            .into_iter()
            .filter(|path| path.is_dir())
            .map(|module_dir| module_dir.join(MODELS_DIR))
            .filter(|models_dir| models_dir.is_dir())
            .collect();

        debug!(count = model_dirs.len(), "Discovered model directories");
        Ok(model_dirs)
    }

    /// 複数のディレクトリを走査してモデルを収集する
    ///
    /// いずれかのファイルの解析に失敗した時点で全体を中断し、部分的な結果は返しません。
    pub fn scan_directories(&self, dirs: &[PathBuf]) -> Result<Vec<ModelSchema>> {
        let mut models = Vec::new();
        for dir in dirs {
            models.extend(self.scan_directory(dir)?);
        }
        Ok(models)
    }

    /// 単一ディレクトリ配下（再帰）のモデル定義ファイルを解析する
    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<ModelSchema>> {
        let mut models = Vec::new();

        for file_path in self.collect_model_files(dir)? {
            models.extend(self.parse_model_file(&file_path)?);
        }

        Ok(models)
    }

    /// 単一のモデル定義ファイルを解析する
    ///
    /// 空のファイルはモデルを含まないものとして扱います。
    pub fn parse_model_file(&self, file_path: &Path) -> Result<Vec<ModelSchema>> {
        debug!(file = %file_path.display(), "Parsing model file");

        let content = fs::read_to_string(file_path).map_err(|e| IoError::FileRead {
            path: file_path.display().to_string(),
            cause: e.to_string(),
        })?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let dto: ModelFileDto = serde_saphyr::from_str(&content)
            .map_err(|e| ParseError::new(file_path.display().to_string(), e.to_string()))?;

        let models = self.converter.dto_to_models(file_path, &dto)?;
        for model in &models {
            debug!(
                model = %model.name,
                table = %model.table_name,
                fields = model.fields.len(),
                "Discovered model"
            );
        }

        Ok(models)
    }

    /// ディレクトリを再帰的に走査し、.yaml / .yml ファイルをパス順に収集
    ///
    /// シンボリックリンクのディレクトリは辿りません。
    fn collect_model_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in read_dir_sorted(dir)? {
            let is_symlink = fs::symlink_metadata(&path)
                .map_err(|e| IoError::FileRead {
                    path: path.display().to_string(),
                    cause: e.to_string(),
                })?
                .file_type()
                .is_symlink();

            if is_symlink && path.is_dir() {
                debug!(path = %path.display(), "Skipping symlinked directory");
                continue;
            }

            if path.is_dir() {
                files.extend(self.collect_model_files(&path)?);
            } else if path.is_file() && is_model_file(&path) {
                files.push(path);
            }
        }

        Ok(files)
    }
}

impl Default for ModelIntrospectorService {
    fn default() -> Self {
        Self::new()
    }
}

fn is_model_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension == "yaml" || extension == "yml")
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let entries = fs::read_dir(dir).map_err(|e| IoError::FileRead {
        path: dir.display().to_string(),
        cause: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::FileRead {
            path: dir.display().to_string(),
            cause: e.to_string(),
        })?;
        paths.push(entry.path());
    }

    // ファイル名でソート（順序の一貫性を保証）
    paths.sort();
    Ok(paths)
}
