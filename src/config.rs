use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::chart::ChartConfig;
use crate::records::{CsvRecordSource, RecordSource, RecordsClient, RecordsError};
use crate::supply::BuilderConfig;

pub const CONFIG_ENV: &str = "SUPPLY_CURVE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "supply-curve.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3044".to_string(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Csv {
        path: PathBuf,
    },
    Http {
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Csv {
            path: PathBuf::from("offer_curves.csv"),
        }
    }
}

impl SourceConfig {
    pub fn into_source(self) -> Result<RecordSource, RecordsError> {
        Ok(match self {
            Self::Csv { path } => RecordSource::Csv(CsvRecordSource::new(path)),
            Self::Http {
                base_url,
                timeout_secs,
            } => RecordSource::Http(RecordsClient::new(
                base_url,
                Duration::from_secs(timeout_secs),
            )?),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub builder: BuilderConfig,
    pub chart: ChartConfig,
}

impl AppConfig {
    /// Load from `$SUPPLY_CURVE_CONFIG` (or `supply-curve.toml`); defaults when the file is absent
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&path);

        if !path.exists() {
            info!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        Self::from_path(path)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}
