use anyhow::{bail, Context as _};
use cadence_core::config::{Config, WarnLevel};
use cadence_core::Tracker;
use chrono::{Local, NaiveDate};
use linear_client::LinearClient;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a subcommand needs from the global flags.
pub struct Context {
    pub config_path: PathBuf,
    api_key: Option<String>,
    pub json: bool,
}

impl Context {
    pub fn new(config_path: PathBuf, api_key: Option<String>, json: bool) -> Self {
        Self {
            config_path,
            api_key,
            json,
        }
    }

    /// Load and validate the config. Warnings go to stderr; errors abort.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let config = Config::load(&self.config_path).context("failed to load config")?;
        let warnings = config.validate();
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            eprintln!("[{prefix}] {}", w.message);
        }
        if warnings.iter().any(|w| w.level == WarnLevel::Error) {
            bail!(
                "config validation found errors in {}",
                self.config_path.display()
            );
        }
        Ok(config)
    }

    pub fn tracker(&self) -> anyhow::Result<Arc<dyn Tracker>> {
        let Some(key) = self.api_key.as_deref() else {
            bail!("no Linear API key: pass --api-key or set LINEAR_API_KEY (a .env file works)");
        };
        let client = LinearClient::new(key).context("failed to build Linear client")?;
        Ok(Arc::new(client))
    }
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

pub fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}
