use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use taxcalc_data::TaxRateLoader;
use taxcalc_db_sqlite::SqliteRateRepository;
use tracing_subscriber::EnvFilter;

/// Load tax rates from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - tax_year: The tax year (e.g., 2025-26)
/// - category: vat, income_tax, national_insurance or corporation_tax
/// - name: The rate name within the category (e.g., personal_allowance)
/// - rate_type: threshold or rate
/// - value: Pounds for thresholds (12570.00), percent for rates (20)
/// - effective_from, effective_to: Optional; default to the tax year bounds
///
/// The whole file is inserted in one transaction. If any row already
/// exists, nothing is written.
#[derive(Parser, Debug)]
#[command(name = "taxcalc-rates-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing tax rate data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:taxcalc.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:taxcalc.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let repo = SqliteRateRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    println!("Loading tax rates from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = TaxRateLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let inserted = TaxRateLoader::load(&repo, &records)
        .await
        .context("Failed to load tax rates into database")?;

    println!("Successfully loaded {} tax rates into the database.", inserted);

    Ok(())
}
