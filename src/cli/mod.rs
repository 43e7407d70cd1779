// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// Gaver - Schema Migration CLI
///
/// Generates versioned SQL migrations from declarative model definitions
/// and applies them to a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "gaver")]
#[command(author = "Gaver Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Schema migration tool for declarative models")]
#[command(long_about = "Gaver - Schema Migration CLI

Reads model declarations from modules/<module>/models/*.yaml,
generates numbered SQL migration files (migrations/NNNN_slug.sql)
and applies pending migrations in order, tracking the last applied
migration in gaverModule.json.

Supported databases: SQLite")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Initialize a new project:     gaver init --name shop
  2. Declare your models:           Edit modules/<module>/models/*.yaml
  3. Generate a migration:          gaver generate
  4. Apply migrations:              gaver apply
  5. Check migration status:        gaver status

For detailed help on each command, use: gaver <command> --help")]
pub struct Cli {
    /// Path to the project metadata file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new project
    ///
    /// Writes gaverModule.json and creates the modules/ and migrations/
    /// directories.
    ///
    /// EXAMPLES:
    ///   # Initialize in the current directory
    ///   gaver init --name shop
    ///
    ///   # Overwrite existing metadata
    ///   gaver init --force
    Init {
        /// Project name (defaults to the directory name)
        #[arg(short, long, value_name = "NAME")]
        name: Option<String>,

        /// Overwrite existing project metadata
        #[arg(short, long)]
        force: bool,
    },

    /// Generate a migration file from model declarations
    ///
    /// Scans every modules/<module>/models directory and writes the
    /// DDL for all discovered models to the next numbered migration file.
    ///
    /// EXAMPLES:
    ///   # Generate the next migration
    ///   gaver generate
    ///
    ///   # Preview SQL without writing a file
    ///   gaver generate --dry-run
    ///
    ///   # Write an empty placeholder migration
    ///   gaver generate --empty
    #[command(alias = "makemigrations")]
    Generate {
        /// Dry run - show SQL without creating files
        #[arg(long)]
        dry_run: bool,

        /// Write an empty migration when no models are found
        #[arg(long)]
        empty: bool,
    },

    /// Apply pending migrations to the database
    ///
    /// Executes every migration newer than the migration tag in order,
    /// advancing the tag after each file succeeds.
    ///
    /// EXAMPLES:
    ///   # Apply to the default database
    ///   gaver apply
    ///
    ///   # Dry run to preview SQL
    ///   gaver apply --dry-run
    ///
    ///   # Apply to a specific database file
    ///   gaver apply --database ./data/dev.db --timeout 10
    #[command(alias = "migrate")]
    Apply {
        /// Dry run - show SQL without executing
        #[arg(long)]
        dry_run: bool,

        /// Path to the SQLite database file
        #[arg(short, long, value_name = "PATH")]
        database: Option<PathBuf>,

        /// Timeout for acquiring the database connection (in seconds)
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// Show migration status
    ///
    /// Displays the current migration tag and the pending migration files.
    ///
    /// EXAMPLES:
    ///   gaver status
    ///   gaver status --format json
    Status,
}
