//! Server configuration, read from an optional TOML file.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "rates.db"
//!
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [vat]
//! approaching_basis_points = 9000
//! transactions_csv = "ledger.csv"
//!
//! [logging]
//! level = "info"
//! file = "taxcalc.log"
//!
//! [payroll.profiles.E042]
//! personalAllowance = 0
//! niExempt = true
//! ```
//!
//! Every section and key is optional.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use taxcalc_core::EmployeeProfile;
use taxcalc_core::calculations::ThresholdTiers;
use taxcalc_core::db::DbConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub server: ServerConfig,
    pub vat: VatConfig,
    pub logging: LoggingConfig,
    pub payroll: PayrollConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VatConfig {
    #[serde(flatten)]
    pub tiers: ThresholdTiers,
    /// Ledger export feeding returns and the rolling turnover. With no
    /// file the ledger is empty.
    pub transactions_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Employee overrides, keyed by employee id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    pub profiles: HashMap<String, EmployeeProfile>,
}

impl AppConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }
}
