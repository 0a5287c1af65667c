//! Configuration for the dashboard core

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Seed data configuration
    pub seed: SeedConfig,

    /// Invoicing configuration
    pub invoicing: InvoicingConfig,

    /// Session persistence configuration
    pub session: SessionConfig,

    /// Presentation configuration
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "erp-dashboard".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            seed: SeedConfig::default(),
            invoicing: InvoicingConfig::default(),
            session: SessionConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

/// Seed data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// RNG seed; `None` seeds from entropy
    pub rng_seed: Option<u64>,

    /// Number of customers
    pub customers: usize,

    /// Number of orders
    pub orders: usize,

    /// Fraction of orders that get an invoice
    pub invoiced_ratio: f64,

    /// Number of support tickets
    pub tickets: usize,

    /// Number of ledger entries
    pub ledger_entries: usize,

    /// Number of audit entries
    pub audit_entries: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            customers: 50,
            orders: 100,
            invoiced_ratio: 0.8,
            tickets: 30,
            ledger_entries: 200,
            audit_entries: 100,
        }
    }
}

/// Invoicing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoicingConfig {
    /// Days from generation until an invoice is due
    pub due_days: i64,
}

/// Longest accepted invoice term
pub const MAX_DUE_DAYS: i64 = 36_500;

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self { due_days: 30 }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// File holding the cached user identity
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/erp_user.json"),
        }
    }
}

/// Presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Rows shown per table page
    pub page_size: usize,

    /// Simulated latency before an audit hash verification answers (ms)
    pub verify_latency_ms: u64,

    /// Simulated latency for settings saves (ms)
    pub save_latency_ms: u64,

    /// Command mailbox capacity
    pub mailbox_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            verify_latency_ms: 1500,
            save_latency_ms: 1000,
            mailbox_capacity: 256,
        }
    }
}

impl UiConfig {
    /// Verification latency as a duration
    pub fn verify_latency(&self) -> Duration {
        Duration::from_millis(self.verify_latency_ms)
    }

    /// Settings save latency as a duration
    pub fn save_latency(&self) -> Duration {
        Duration::from_millis(self.save_latency_ms)
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(path) = std::env::var("ERP_SESSION_PATH") {
            config.session.path = PathBuf::from(path);
        }

        if let Ok(seed) = std::env::var("ERP_RNG_SEED") {
            let seed = seed
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid ERP_RNG_SEED: {}", e)))?;
            config.seed.rng_seed = Some(seed);
        }

        if let Ok(size) = std::env::var("ERP_PAGE_SIZE") {
            config.ui.page_size = size
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid ERP_PAGE_SIZE: {}", e)))?;
        }

        if let Ok(ms) = std::env::var("ERP_VERIFY_LATENCY_MS") {
            config.ui.verify_latency_ms = ms.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid ERP_VERIFY_LATENCY_MS: {}", e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the store cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        if self.ui.page_size == 0 {
            return Err(crate::Error::Config("ui.page_size must be positive".to_string()));
        }
        if self.ui.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "ui.mailbox_capacity must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.seed.invoiced_ratio) {
            return Err(crate::Error::Config(
                "seed.invoiced_ratio must be within 0.0..=1.0".to_string(),
            ));
        }
        if !(0..=MAX_DUE_DAYS).contains(&self.invoicing.due_days) {
            return Err(crate::Error::Config(format!(
                "invoicing.due_days must be within 0..={}",
                MAX_DUE_DAYS
            )));
        }
        Ok(())
    }
}
