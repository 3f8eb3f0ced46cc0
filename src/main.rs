use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use roster_tally::config::{AppConfig, DEFAULT_NAMESPACE, DEFAULT_STORE_PATH, SyncSettings};
use roster_tally::model::Persistence;
use roster_tally::sync::SyncEngine;
use roster_tally::{Result, SyncError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|_| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| SyncError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(&cli.config)?;
    ensure_parent_dir(&cli.db)?;
    let mut engine = SyncEngine::new(config, SyncSettings::new(cli.db, cli.namespace));
    let report = engine.start();
    warn_if_skipped(&report.persistence);

    match cli.command {
        Command::Import { input } => {
            let summary = engine.import_workbook(&input)?;
            println!("{summary}");
            warn_if_skipped(&summary.persistence);
        }
        Command::Delete { ids } => {
            let summary = engine.delete(&ids)?;
            println!("Removed: {}", summary.removed.len());
            warn_if_skipped(&summary.persistence);
        }
        Command::Show { id } => match engine.get(&id) {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record.fields)?),
            None => println!("no record with identity '{id}'"),
        },
        Command::List => {
            for record in engine.records() {
                println!("{}\t{}", record.id, serde_json::to_string(&record.fields)?);
            }
        }
        Command::Stats { output } => match output {
            Some(path) => engine.export_stats(&path)?,
            None => print_stats(&engine),
        },
        Command::Export { output, ids } => {
            let ids = if ids.is_empty() {
                engine.ids().cloned().collect()
            } else {
                ids
            };
            let written = engine.export_workbook(&output, &ids)?;
            println!("Exported: {written}");
        }
        Command::Template { output } => engine.export_template(&output)?,
    }
    Ok(())
}

fn print_stats(engine: &SyncEngine<AppConfig>) {
    let header = roster_tally::aggregate::stats_header(&engine.schema().stats_columns);
    println!("{}", header.join("\t"));
    for stat in engine.stats() {
        let counts: Vec<String> = stat
            .counts
            .iter()
            .map(|entry| entry.count.to_string())
            .collect();
        println!("{}\t{}\t{}", stat.region, counts.join("\t"), stat.total);
    }
}

fn warn_if_skipped(persistence: &Persistence) {
    if let Persistence::Skipped { reason } = persistence {
        eprintln!("warning: changes are not saved to disk: {reason}");
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Import, store, and summarise region records."
)]
struct Cli {
    /// JSON document describing columns, regions and categories.
    #[arg(long)]
    config: PathBuf,

    /// Record database file.
    #[arg(long, env = "ROSTER_TALLY_DB", default_value = DEFAULT_STORE_PATH)]
    db: PathBuf,

    /// Table holding the record collection inside the database.
    #[arg(long, env = "ROSTER_TALLY_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge the first worksheet of a workbook into the record store.
    Import {
        #[arg(long)]
        input: PathBuf,
    },
    /// Delete records by identity.
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Print a single record.
    Show { id: String },
    /// Print every record.
    List,
    /// Print the per-region summary, or write it to a workbook.
    Stats {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write records to a workbook; all records when no identity is given.
    Export {
        #[arg(long)]
        output: PathBuf,
        ids: Vec<String>,
    },
    /// Write an empty workbook with the import headers.
    Template {
        #[arg(long)]
        output: PathBuf,
    },
}
