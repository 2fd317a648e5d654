//! Command-line front end for the survey core.
//!
//! # Responsibility
//! - Open the on-device stores from a data directory and run one command.
//! - Print storage warnings on stderr without failing the command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pser_core::{
    core_version, init_logging, CoreConfig, LocalSurveyService, SharedPhraseConfirmation,
    StorageWarning, SurveyQuery,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "pser",
    disable_help_subcommand = true,
    about = "Inspect, export and restore PSER household survey records"
)]
struct Cli {
    #[arg(
        long,
        value_name = "DIR",
        default_value = "pser-data",
        help = "Directory holding the survey database, fallback copy and pser.toml"
    )]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every record.
    List,
    /// Filter records by house number and/or CNIC digits.
    Search {
        #[arg(long)]
        house: Option<i64>,
        #[arg(long, value_name = "DIGITS")]
        cnic: Option<String>,
    },
    /// Print aggregate totals.
    Summary,
    /// Write all records as CSV.
    ExportCsv { output: PathBuf },
    /// Write a JSON backup of all records.
    Backup { output: PathBuf },
    /// Replace all records with a JSON backup.
    Restore { input: PathBuf },
    /// Delete every record.
    Clear {
        #[arg(long, value_name = "PHRASE")]
        confirm: String,
    },
    /// Print the core version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if matches!(cli.command, Command::Version) {
        println!("pser_core version={}", core_version());
        return Ok(());
    }

    std::fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("creating {}", cli.data_dir.display()))?;
    let data_dir = cli
        .data_dir
        .canonicalize()
        .with_context(|| format!("resolving {}", cli.data_dir.display()))?;
    let config = CoreConfig::load(&data_dir)?;
    init_logging(&config.log_level, config.resolved_log_dir())?;

    let mut service = LocalSurveyService::open(&config);
    if !service.repository().primary_available() {
        eprintln!("warning: database unavailable, using fallback copy only");
    }

    match cli.command {
        Command::List => {
            for record in service.records() {
                println!(
                    "{}\thouse={}\tmembers={}\t{}",
                    record.id,
                    record.house_number,
                    record.total,
                    record.timestamp.to_rfc3339()
                );
            }
        }
        Command::Search { house, cnic } => {
            let mut query = SurveyQuery::new();
            if let Some(house) = house {
                query = query.with_house_number(house);
            }
            if let Some(cnic) = cnic.as_deref() {
                query = query.with_cnic(cnic);
            }
            for record in service.search(&query) {
                println!("{}\thouse={}", record.id, record.house_number);
            }
        }
        Command::Summary => {
            let summary = service.summary();
            println!("records={}", summary.records);
            println!("families={}", summary.families);
            println!(
                "members={} male={} female={} others={}",
                summary.total_members, summary.male, summary.female, summary.others
            );
            println!(
                "with_location={} with_photo={} with_signature={}",
                summary.with_location, summary.with_photo, summary.with_signature
            );
        }
        Command::ExportCsv { output } => {
            std::fs::write(&output, service.export_csv())
                .with_context(|| format!("writing {}", output.display()))?;
            println!("exported {} records to {}", service.records().len(), output.display());
        }
        Command::Backup { output } => {
            let json = service.export_backup()?;
            std::fs::write(&output, json)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("backed up {} records to {}", service.records().len(), output.display());
        }
        Command::Restore { input } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let outcome = service.restore_backup(&text)?;
            report_warning(outcome.warning.as_ref());
            println!("restored {} records", outcome.restored);
        }
        Command::Clear { confirm } => {
            let policy = SharedPhraseConfirmation::new(config.clear_phrase.as_str());
            let warning = service.clear_all(&policy, &confirm)?;
            report_warning(warning.as_ref());
            println!("all records cleared");
        }
        Command::Version => println!("pser_core version={}", core_version()),
    }

    Ok(())
}

fn report_warning(warning: Option<&StorageWarning>) {
    if let Some(warning) = warning {
        eprintln!("warning: {warning}");
    }
}
