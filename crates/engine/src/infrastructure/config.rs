//! Engine configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::entities::IslandSettings;

/// Where island documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

/// Engine configuration loaded from environment
#[derive(Debug, Clone)]
pub struct IslandConfig {
    /// Island store backend: "sqlite" or "memory"
    pub store: StoreBackend,
    /// SQLite database path (if using sqlite backend)
    pub sqlite_path: String,
    /// Directory holding `<name>.skis` template worlds
    pub template_dir: PathBuf,
    /// Chunk radius cut from the template for a new island
    pub template_radius: u32,
    /// Vacancy sweep period
    pub sweep_interval: Duration,
    /// Upper bound on one island load
    pub load_timeout: Duration,
}

impl IslandConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let store = match var("ISLAND_STORE", "sqlite").to_ascii_lowercase().as_str() {
            "sqlite" => StoreBackend::Sqlite,
            "memory" => StoreBackend::Memory,
            other => bail!("ISLAND_STORE must be 'sqlite' or 'memory', got '{}'", other),
        };

        let sweep_interval_ms: u64 = var("ISLAND_SWEEP_INTERVAL_MS", "200")
            .parse()
            .context("ISLAND_SWEEP_INTERVAL_MS must be a number of milliseconds")?;
        if sweep_interval_ms == 0 {
            bail!("ISLAND_SWEEP_INTERVAL_MS must be greater than zero");
        }

        let load_timeout_secs: u64 = var("ISLAND_LOAD_TIMEOUT_SECS", "30")
            .parse()
            .context("ISLAND_LOAD_TIMEOUT_SECS must be a number of seconds")?;
        if load_timeout_secs == 0 {
            bail!("ISLAND_LOAD_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            store,
            sqlite_path: var("ISLAND_SQLITE_PATH", "./data/islands.db"),
            template_dir: PathBuf::from(var("ISLAND_TEMPLATE_DIR", "./data")),
            template_radius: var("ISLAND_TEMPLATE_RADIUS", "3")
                .parse()
                .context("ISLAND_TEMPLATE_RADIUS must be a non-negative integer")?,
            sweep_interval: Duration::from_millis(sweep_interval_ms),
            load_timeout: Duration::from_secs(load_timeout_secs),
        })
    }

    pub fn island_settings(&self) -> IslandSettings {
        IslandSettings {
            template_radius: self.template_radius,
            load_timeout: self.load_timeout,
        }
    }
}
