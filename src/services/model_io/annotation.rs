// アノテーションパーサー
//
// フィールドに付与されたアノテーション文字列（`key:"value"` の空白区切り）を解析し、
// スキーマ系キーの値をセミコロン区切りのフラグとして FieldSchema に反映します。

use crate::core::schema::FieldSchema;
use std::collections::BTreeMap;

/// スキーマフラグを読み取るキー（先頭ほど優先）
pub const SCHEMA_TAG_KEYS: &[&str] = &["schema", "gorm"];

/// アノテーション文字列を `キー -> 値` のマップに分解する
///
/// 値はダブルクォートで囲むことができ、その場合は空白や `\"` を含められます。
/// `:` を含まないトークンは無視します。同じキーが複数回現れた場合は後勝ちです。
pub fn parse_tag(tag: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    let mut chars = tag.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != ':' && !c.is_whitespace()) {
            key.push(c);
        }

        if chars.next_if_eq(&':').is_none() {
            // `key:value` 形式でないトークン
            continue;
        }

        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => break,
                    _ => value.push(c),
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                value.push(c);
            }
        }

        if !key.is_empty() {
            tags.insert(key, value);
        }
    }

    tags
}

/// 解析済みアノテーションからスキーマ系キーの値を取り出す
pub fn schema_flags(tags: &BTreeMap<String, String>) -> Option<&str> {
    SCHEMA_TAG_KEYS
        .iter()
        .find_map(|key| tags.get(*key))
        .map(String::as_str)
}

/// セミコロン区切りのスキーマフラグをフィールドに反映する
///
/// 認識しないフラグは無視します。
pub fn apply_schema_flags(flags: &str, field: &mut FieldSchema) {
    for part in flags.split(';') {
        let part = part.trim();

        match part {
            "primary_key" | "primaryKey" => field.is_primary_key = true,
            "not null" | "notnull" => field.is_not_null = true,
            "index" => field.is_index = true,
            _ => {}
        }

        // unique, uniqueIndex, unique_index:idx_name などはすべて一意制約として扱う
        if part.starts_with("unique") {
            field.is_unique = true;
        }

        if let Some(sql_type) = part.strip_prefix("type:") {
            field.sql_type_override = non_empty(sql_type);
        }

        if let Some(default_value) = part.strip_prefix("default:") {
            field.default_value = non_empty(default_value);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
