mod check;
mod gen;
mod split;

use crate::config::Config;
use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use indicatif::ProgressStyle;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "sheetgen")]
#[command(version)]
#[command(about = "Generate dummy CSV spreadsheets, count their rows and split them under a row limit", long_about = None)]
pub struct Cli {
    /// YAML config file (output_dir, max_rows_per_file, write_batch_size, seed, fields)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose diagnostic logging on stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a CSV file with random data
    #[command(arg_required_else_help = true)]
    Gen {
        /// A name for the generated file, e.g. `test` writes test.csv
        #[arg(short, long)]
        name: String,

        /// Number of rows, header row included
        #[arg(short, long, default_value_t = 2_000_000)]
        rows: u64,

        /// Output directory [default: output]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rotate to {name}_N.csv files holding at most this many data rows each
        #[arg(long, alias = "max_rows_per_file")]
        max_rows_per_file: Option<u64>,

        /// Random seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,

        /// Show progress while generating
        #[arg(short, long)]
        progress: bool,

        /// Output a JSON summary instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Count the rows of a CSV file, header included
    #[command(arg_required_else_help = true)]
    Check {
        /// CSV file to count
        file: PathBuf,

        /// Output a JSON summary instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Split a CSV file into multiple files which won't exceed a row limit
    #[command(arg_required_else_help = true)]
    Split {
        /// CSV file to split
        file: PathBuf,

        /// Maximum rows per file [default: 1048576]
        #[arg(short, long, alias = "max_rows_per_file")]
        max_rows_per_file: Option<u64>,

        /// Output directory for split files [default: output]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview without writing files (dry run)
        #[arg(long)]
        dry_run: bool,

        /// Show progress during splitting
        #[arg(short, long)]
        progress: bool,

        /// Output a JSON summary instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_optional(cli.config.as_deref())?;

    match cli.command {
        Commands::Gen {
            name,
            rows,
            output,
            max_rows_per_file,
            seed,
            progress,
            json,
        } => gen::run(
            &config,
            name,
            rows,
            output,
            max_rows_per_file,
            seed,
            progress,
            json,
        ),
        Commands::Check { file, json } => check::run(file, json),
        Commands::Split {
            file,
            max_rows_per_file,
            output,
            dry_run,
            progress,
            json,
        } => split::run(
            &config,
            file,
            max_rows_per_file,
            output,
            dry_run,
            progress,
            json,
        ),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sheetgen", &mut io::stdout());
            Ok(())
        }
    }
}

/// Create the output directory (and parents) if it does not exist yet.
pub(crate) fn ensure_output_dir(dir: &Path) -> anyhow::Result<()> {
    if !dir.exists() {
        info!(dir = %dir.display(), "creating output directory");
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    }
    Ok(())
}

pub(crate) fn progress_bar_style(template: &str) -> anyhow::Result<ProgressStyle> {
    Ok(ProgressStyle::with_template(template)?
        .progress_chars("█▓▒░  ")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
}
