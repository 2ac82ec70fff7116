//! cotahist CLI — fetch and decode B3 COTAHIST historical quote files.
//!
//! Commands:
//! - `fetch` — download the archives a date expression expands to
//! - `decode` — decode a downloaded archive and print rows
//! - `expand` — print the dates a date expression expands to

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cotahist_core::config::Config;
use cotahist_core::data::{
    read_archive, Fetcher, FieldValue, RecordLayout, ReqwestTransport, StdoutProgress,
};
use cotahist_core::dates;

#[derive(Parser)]
#[command(
    name = "cotahist",
    about = "Fetch and decode B3 COTAHIST historical quote files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the archives a date expression expands to.
    Fetch {
        /// Date expression: YYYY, YYYY-MM, YYYY-MM-DD, today, yesterday,
        /// or a start:end range at one granularity.
        dates: String,

        /// Output directory. Defaults to the configured data dir.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decode a downloaded archive and print quote records.
    Decode {
        /// Path to a cached .zip archive.
        file: PathBuf,

        /// Print at most this many rows.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the dates a date expression expands to.
    Expand {
        /// Date expression (see `fetch`).
        dates: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            dates,
            output,
            config,
        } => run_fetch(&dates, output, config),
        Commands::Decode { file, limit } => run_decode(&file, limit),
        Commands::Expand { dates } => run_expand(&dates),
    }
}

fn run_fetch(dates: &str, output: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::from_file(&path)?,
        None => Config::from_env(),
    };
    if let Some(dir) = output {
        config.data_dir = dir;
    }

    let expanded = dates::expand(dates).context("invalid date expression")?;

    let transport = ReqwestTransport::new(&config.user_agent);
    let fetcher = Fetcher::new(transport, config);
    let summary = fetcher.fetch_all(&expanded, &StdoutProgress);

    if !summary.all_succeeded() {
        for (date, err) in &summary.errors {
            eprintln!("Error for {date}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Columns shown by `decode`; the full record has 26.
const DISPLAY_COLUMNS: [&str; 7] = [
    "data",
    "simbolo",
    "preco_abertura",
    "preco_maximo",
    "preco_minimo",
    "preco_ultimo_negocio",
    "quantidade_negocios",
];

fn run_decode(file: &PathBuf, limit: Option<usize>) -> Result<()> {
    let rows = read_archive(file, RecordLayout::quote())
        .with_context(|| format!("failed to decode {}", file.display()))?;

    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    for name in DISPLAY_COLUMNS {
        print!("{name:<22}");
    }
    println!();

    for row in rows.iter().take(shown) {
        for name in DISPLAY_COLUMNS {
            let value = row
                .get(name)
                .map(FieldValue::to_string)
                .unwrap_or_default();
            print!("{value:<22}");
        }
        println!();
    }

    println!("\n{} of {} rows", shown, rows.len());
    Ok(())
}

fn run_expand(dates: &str) -> Result<()> {
    let expanded = dates::expand(dates).context("invalid date expression")?;
    for date in &expanded {
        println!("{date}");
    }
    println!("{} date(s)", expanded.len());
    Ok(())
}
