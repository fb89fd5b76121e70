//! tenreg-import - Bulk container import for the tenure registry
//!
//! Loads a field-collected container, validates and stages every
//! record, reports the validation summary, and optionally commits the
//! eligible records with one audit-history row for the run.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tenreg_import::{ContainerReader, ImportService, SourceReader, SyntheticReader};

#[derive(Parser, Debug)]
#[command(name = "tenreg-import", about = "Import a field-collected container")]
struct Args {
    /// Container file to import (.trc)
    file: PathBuf,

    /// Operator recorded in the audit history
    #[arg(long, default_value = "system")]
    operator: String,

    /// Commit eligible records after validation
    #[arg(long)]
    commit: bool,

    /// Generate N synthetic records instead of reading the file
    #[arg(long, value_name = "N")]
    synthetic: Option<usize>,

    /// Seed for the synthetic generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Data folder override (defaults to TENREG_DATA or the platform dir)
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting tenreg-import");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let data_folder = tenreg_common::config::resolve_data_folder(args.data_dir.as_deref());
    let db_path = tenreg_common::config::database_path(&data_folder);
    info!("Database: {}", db_path.display());

    let pool = tenreg_common::db::init_database(&db_path).await?;
    let settings = tenreg_common::config::load_import_settings(&data_folder)?;

    let reader: Arc<dyn SourceReader> = match args.synthetic {
        Some(count) => Arc::new(SyntheticReader::new(args.seed, count)),
        None => Arc::new(ContainerReader::new()),
    };

    let mut service = ImportService::new(pool, reader, settings, &args.operator);

    let summary = service.load_file(&args.file).await?;
    println!(
        "Loaded {} ({} declared records)",
        summary.file_name, summary.declared_record_count
    );

    service
        .validate_all(|current, total| {
            if current % 100 == 0 || current == total {
                info!("Validated {}/{}", current, total);
            }
        })
        .await?;

    let counts = service.get_validation_summary();
    println!(
        "Validation: {} total, {} valid, {} warnings, {} errors, {} duplicates",
        counts.total, counts.valid, counts.warnings, counts.errors, counts.duplicates
    );

    if !args.commit {
        println!("Dry run only; pass --commit to write eligible records");
        return Ok(());
    }

    let report = service
        .commit(|current, total| {
            if current % 100 == 0 || current == total {
                info!("Committed {}/{}", current, total);
            }
        })
        .await?;

    println!(
        "{}: {} imported, {} failed, {} skipped, {} with warnings",
        report.import_id, report.imported, report.failed, report.skipped, report.warnings
    );
    for error in &report.errors {
        println!("  error: {}", error);
    }
    if report.failed > report.errors.len() {
        println!("  ... and more; see the audit history");
    }

    Ok(())
}
