use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use taxcalc_server::{AppConfig, build_state, logging, router};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// UK tax and payroll calculation service.
///
/// Settings come from the optional TOML file first; flags given here
/// override them.
#[derive(Debug, Parser)]
#[command(name = "taxcalc-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. `0.0.0.0:8080`.
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Database backend to use (`sqlite` or `memory`).
    #[arg(long)]
    backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `rates.db`) or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    /// Ledger CSV feeding VAT returns and the turnover monitor.
    #[arg(long)]
    transactions: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `info,taxcalc_core=trace`.
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(backend) = self.backend {
            config.database.backend = backend;
        }
        if let Some(db) = self.db {
            config.database.connection_string = db;
        }
        if let Some(path) = self.transactions {
            config.vat.transactions_csv = Some(path);
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(path) = self.log_file {
            config.logging.file = Some(path);
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    logging::init(&config.logging.level, config.logging.file.as_deref())?;

    let state = build_state(&config).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Listening on {}", config.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
