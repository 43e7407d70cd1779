// DTO変換サービス
//
// ModelFileDto → ModelSchema の変換を一元管理するサービス。
// 型式とアノテーションの解析結果をフィールドに集約します。

use crate::core::error::{ConsistencyError, ParseError};
use crate::core::schema::{FieldSchema, ModelSchema};
use crate::services::model_io::annotation::{apply_schema_flags, parse_tag, schema_flags};
use crate::services::model_io::dto::{DeclarationDto, DeclarationKind, FieldDto, ModelFileDto};
use crate::services::model_io::type_expr::parse_type_expr;
use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

/// DTO変換サービス
#[derive(Debug, Clone, Default)]
pub struct DtoConverterService;

impl DtoConverterService {
    /// 新しいDtoConverterServiceを作成
    pub fn new() -> Self {
        Self
    }

    /// ModelFileDto → ModelSchema のリスト
    ///
    /// 宣言順を保ち、フィールドを1つも持たない集約型と別名宣言は除外します。
    /// `source` はエラーメッセージに含めるファイルパスです。
    pub fn dto_to_models(&self, source: &Path, dto: &ModelFileDto) -> Result<Vec<ModelSchema>> {
        let mut models = Vec::new();

        for declaration in &dto.models {
            self.check_declaration_shape(source, declaration)?;

            if declaration.kind == DeclarationKind::Alias {
                continue;
            }

            let model = self.dto_to_model(source, declaration)?;
            if !model.fields.is_empty() {
                models.push(model);
            }
        }

        Ok(models)
    }

    /// DeclarationDto → ModelSchema 変換
    pub fn dto_to_model(&self, source: &Path, declaration: &DeclarationDto) -> Result<ModelSchema> {
        let mut model = ModelSchema::new(declaration.name.clone());
        let mut columns = HashSet::new();

        for field_dto in declaration.fields.iter().flatten() {
            let Some(field) = self.dto_to_field(source, &declaration.name, field_dto)? else {
                continue;
            };

            if !columns.insert(field.column_name()) {
                return Err(ConsistencyError::DuplicateColumn {
                    model: declaration.name.clone(),
                    column: field.column_name(),
                    path: source.display().to_string(),
                }
                .into());
            }

            model.add_field(field);
        }

        Ok(model)
    }

    /// FieldDto → FieldSchema 変換
    ///
    /// 埋め込みフィールドはNoneを返します。
    pub fn dto_to_field(
        &self,
        source: &Path,
        model_name: &str,
        dto: &FieldDto,
    ) -> Result<Option<FieldSchema>> {
        let Some(name) = dto.name.as_deref().filter(|_| !dto.is_embedded()) else {
            return Ok(None);
        };

        let logical_type = parse_type_expr(&dto.type_expr).map_err(|message| {
            ParseError::new(
                source.display().to_string(),
                format!("{}.{}: {}", model_name, name, message),
            )
        })?;

        let mut field = FieldSchema::new(name.to_string(), logical_type);

        if let Some(tag) = dto.tag.as_deref() {
            field.tags = parse_tag(tag);
            if let Some(flags) = schema_flags(&field.tags).map(str::to_string) {
                apply_schema_flags(&flags, &mut field);
            }
        }

        Ok(Some(field))
    }

    /// 宣言の形状が種別と矛盾していないかを検証
    fn check_declaration_shape(
        &self,
        source: &Path,
        declaration: &DeclarationDto,
    ) -> Result<(), ConsistencyError> {
        let reason = match declaration.kind {
            DeclarationKind::Alias if declaration.fields.is_some() => {
                Some("alias declarations cannot declare fields")
            }
            DeclarationKind::Alias if declaration.target.is_none() => {
                Some("alias declarations require a target type")
            }
            DeclarationKind::Aggregate if declaration.target.is_some() => {
                Some("aggregate declarations cannot declare a target type")
            }
            _ => None,
        };

        match reason {
            Some(reason) => Err(ConsistencyError::DeclarationShape {
                name: declaration.name.clone(),
                path: source.display().to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::LogicalType;

    fn parse(yaml: &str) -> Result<Vec<ModelSchema>> {
        let dto: ModelFileDto = serde_saphyr::from_str(yaml).unwrap();
        DtoConverterService::new().dto_to_models(Path::new("models/user.yaml"), &dto)
    }

    #[test]
    fn test_converts_fields_in_declaration_order() {
        let models = parse(
            r#"
models:
  - name: User
    fields:
      - name: ID
        type: uint
        tag: 'json:"id" gorm:"primaryKey"'
      - name: Email
        type: string
        tag: 'gorm:"uniqueIndex;type:VARCHAR(255)"'
      - name: Tags
        type: "[]string"
      - type: Timestamps
"#,
        )
        .unwrap();

        assert_eq!(models.len(), 1);
        let user = &models[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.table_name, "users");

        let names: Vec<&str> = user.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ID", "Email", "Tags"]);

        assert!(user.fields[0].is_primary_key);
        assert_eq!(user.fields[0].tags.get("json").map(String::as_str), Some("id"));
        assert!(user.fields[1].is_unique);
        assert_eq!(user.fields[1].sql_type_override.as_deref(), Some("VARCHAR(255)"));
        assert_eq!(
            user.fields[2].logical_type,
            LogicalType::sequence(LogicalType::named("string"))
        );
    }

    #[test]
    fn test_skips_aliases_and_fieldless_aggregates() {
        let models = parse(
            r#"
models:
  - name: UserID
    kind: alias
    target: uint
  - name: Marker
  - name: Base
    fields:
      - type: Timestamps
  - name: Post
    fields:
      - name: Title
        type: string
"#,
        )
        .unwrap();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "Post");
    }

    #[test]
    fn test_invalid_type_expression_reports_path() {
        let err = parse(
            r#"
models:
  - name: User
    fields:
      - name: Email
        type: "map[string"
"#,
        )
        .unwrap_err();

        let parse_error = err.downcast_ref::<ParseError>().unwrap();
        assert_eq!(parse_error.path, "models/user.yaml");
        assert!(parse_error.message.contains("User.Email"));
    }

    #[test]
    fn test_alias_with_fields_is_consistency_error() {
        let err = parse(
            r#"
models:
  - name: UserID
    kind: alias
    target: uint
    fields:
      - name: ID
        type: uint
"#,
        )
        .unwrap_err();

        let consistency = err.downcast_ref::<ConsistencyError>().unwrap();
        assert!(consistency.is_declaration_shape());
    }

    #[test]
    fn test_aggregate_with_target_is_consistency_error() {
        let err = parse(
            r#"
models:
  - name: User
    target: uint
    fields:
      - name: ID
        type: uint
"#,
        )
        .unwrap_err();

        assert!(err
            .downcast_ref::<ConsistencyError>()
            .unwrap()
            .is_declaration_shape());
    }

    #[test]
    fn test_duplicate_column_names_are_rejected() {
        let err = parse(
            r#"
models:
  - name: User
    fields:
      - name: Email
        type: string
      - name: email
        type: string
"#,
        )
        .unwrap_err();

        let consistency = err.downcast_ref::<ConsistencyError>().unwrap();
        assert!(consistency.is_duplicate_column());
        assert!(err.to_string().contains("email"));
    }
}
