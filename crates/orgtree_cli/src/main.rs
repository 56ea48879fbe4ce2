//! Console entry point: import a company-units JSON file, then serve
//! interactive family lookups.
//!
//! # Responsibility
//! - Parse arguments, load configuration, bootstrap logging and the
//!   database, run the import, hand control to the menu loop.
//!
//! # Invariants
//! - `--help` exits 0; argument errors exit 1.
//! - Configuration and import failures are fatal with a readable
//!   message and exit code 1; the table stays unchanged on import
//!   failure.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use orgtree_core::db::open_db;
use orgtree_core::{
    default_log_level, init_logging, FamilyService, ImportService, SqliteUnitRepository,
};

mod config;
mod menu;

#[derive(Debug, Parser)]
#[command(name = "orgtree", about = "Company units importer and family viewer")]
struct Cli {
    /// JSON file with the company-units payload.
    filename: PathBuf,

    /// Delete all existing units before importing.
    #[arg(short, long)]
    clear: bool,

    /// Path to the YAML configuration file.
    #[arg(long, default_value = "orgtree.yaml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            // Argument errors exit 1, not clap's default 2.
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_config(&cli.config)?;

    if let Some(logging) = &config.logging {
        let level = logging.level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &logging.dir.to_string_lossy()).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&config.sqlite.path).with_context(|| {
        format!("cannot open database `{}`", config.sqlite.path.display())
    })?;

    let importer = ImportService::new(SqliteUnitRepository::try_new(&conn)?);
    let count = importer
        .import_file(&cli.filename, cli.clear)
        .with_context(|| format!("import of `{}` failed", cli.filename.display()))?;
    println!("File imported successfully ({count} rows).");

    let family = FamilyService::new(SqliteUnitRepository::try_new(&conn)?);
    let stdin = io::stdin();
    let stdout = io::stdout();
    menu::run_menu(&family, &mut stdin.lock(), &mut stdout.lock())?;

    Ok(())
}
