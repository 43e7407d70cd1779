use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use gaver::cli::commands::apply::{ApplyCommand, ApplyCommandHandler};
use gaver::cli::commands::generate::{GenerateCommand, GenerateCommandHandler};
use gaver::cli::commands::init::{InitCommand, InitCommandHandler};
use gaver::cli::commands::status::{StatusCommand, StatusCommandHandler};
use gaver::cli::{Cli, Commands};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    sqlx::any::install_default_drivers();

    // CLIをパースして実行
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// トレーシングを初期化する
///
/// RUST_LOG が優先され、未指定時は --verbose で debug、それ以外は warn を出力します。
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "gaver=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;
    let metadata_path = cli.metadata;
    let format = cli.format;

    match cli.command {
        Commands::Init { name, force } => {
            let handler = InitCommandHandler::new();
            let command = InitCommand {
                project_path,
                metadata_path,
                project_name: name,
                force,
                format,
            };
            handler.execute(&command)
        }

        Commands::Generate { dry_run, empty } => {
            let handler = GenerateCommandHandler::new();
            let command = GenerateCommand {
                project_path,
                metadata_path,
                dry_run,
                empty,
                format,
            };
            handler.execute(&command)
        }

        Commands::Apply {
            dry_run,
            database,
            timeout,
        } => {
            let handler = ApplyCommandHandler::new();
            let command = ApplyCommand {
                project_path,
                metadata_path,
                dry_run,
                database,
                timeout,
                format,
            };
            handler.execute(&command).await
        }

        Commands::Status => {
            let handler = StatusCommandHandler::new();
            let command = StatusCommand {
                project_path,
                metadata_path,
                format,
            };
            handler.execute(&command)
        }
    }
}
