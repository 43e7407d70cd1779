// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod apply;
pub mod generate;
pub mod init;
pub mod status;

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::Serialize;

/// コマンド出力の共通インターフェース
///
/// テキスト表示用の文字列化を提供し、JSON表示は Serialize 実装を使います。
pub trait CommandOutput: Serialize {
    fn to_text(&self) -> String;
}

/// 出力フォーマットに応じてコマンド出力を文字列化
pub fn render_output<T: CommandOutput>(output: &T, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(output.to_text()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).with_context(|| "Failed to serialize output")
        }
    }
}
