// ⚙️ Repository Configuration
// Defaults → feature_store.{yaml,toml,json} → BANKFS_* environment variables

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::datafiles::OutputFormat;
use crate::datasets::Dataset;

/// Seed used when none is configured, so repeated runs produce the same files
pub const DEFAULT_SEED: u64 = 42;

/// Longest event window a dataset may span
pub const MAX_WINDOW_DAYS: i64 = 3650;

// ============================================================================
// GENERATOR CONFIG
// ============================================================================

/// Record counts and time windows for the synthetic datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub customers: usize,
    pub transactions: usize,
    pub atm_usage: usize,
    pub branch_visits: usize,
    pub call_center: usize,

    /// RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,

    /// End of every event window; `None` means the time of the run
    pub anchor: Option<DateTime<Utc>>,

    pub transaction_window_days: i64,
    pub atm_window_days: i64,
    pub branch_window_days: i64,
    pub call_window_days: i64,

    /// Creation date of the first customer; each following customer is one day later
    pub customer_epoch: NaiveDate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            customers: 1000,
            transactions: 50_000,
            atm_usage: 15_000,
            branch_visits: 8_000,
            call_center: 12_000,
            seed: Some(DEFAULT_SEED),
            anchor: None,
            transaction_window_days: 90,
            atm_window_days: 60,
            branch_window_days: 120,
            call_window_days: 90,
            customer_epoch: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl GeneratorConfig {
    /// Small counts, handy for tests and quick demos
    pub fn small() -> Self {
        GeneratorConfig {
            customers: 50,
            transactions: 500,
            atm_usage: 200,
            branch_visits: 100,
            call_center: 150,
            ..GeneratorConfig::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn dependent_records(&self) -> usize {
        self.transactions + self.atm_usage + self.branch_visits + self.call_center
    }

    pub fn count(&self, dataset: Dataset) -> usize {
        match dataset {
            Dataset::Customers => self.customers,
            Dataset::Transactions => self.transactions,
            Dataset::AtmUsage => self.atm_usage,
            Dataset::BranchVisits => self.branch_visits,
            Dataset::CallCenter => self.call_center,
        }
    }

    /// Row counts a generation run with this config produces
    pub fn expected_counts(&self) -> BTreeMap<Dataset, usize> {
        Dataset::ALL.into_iter().map(|d| (d, self.count(d))).collect()
    }

    pub fn windows(&self) -> [(Dataset, i64); 4] {
        [
            (Dataset::Transactions, self.transaction_window_days),
            (Dataset::AtmUsage, self.atm_window_days),
            (Dataset::BranchVisits, self.branch_window_days),
            (Dataset::CallCenter, self.call_window_days),
        ]
    }

    /// Reject event windows that are empty, negative, or too long
    pub fn validate(&self) -> Result<()> {
        for (dataset, days) in self.windows() {
            check_window(days).with_context(|| format!("Invalid {} window", dataset))?;
        }
        Ok(())
    }
}

pub fn check_window(days: i64) -> Result<()> {
    if days <= 0 || days > MAX_WINDOW_DAYS {
        bail!(
            "window_days must be between 1 and {}, got {}",
            MAX_WINDOW_DAYS,
            days
        );
    }
    Ok(())
}

// ============================================================================
// SERVER CONFIG
// ============================================================================

/// Bind address of the catalog server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// REPO CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub project: String,
    pub data_dir: PathBuf,
    pub registry_path: PathBuf,
    pub output_format: OutputFormat,
    pub generator: GeneratorConfig,
    pub server: ServerConfig,
}

impl Default for RepoConfig {
    fn default() -> Self {
        RepoConfig {
            project: "banking_feature_store".to_string(),
            data_dir: PathBuf::from("data"),
            registry_path: PathBuf::from("data/registry.db"),
            output_format: OutputFormat::Parquet,
            generator: GeneratorConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl RepoConfig {
    /// Load from `feature_store.*` in the working directory plus environment
    pub fn load() -> Result<Self> {
        Self::load_from("feature_store")
    }

    /// Load from a config file base name (extension optional) plus environment.
    ///
    /// A missing file is fine; a malformed one is an error.
    pub fn load_from(base: &str) -> Result<Self> {
        // .env is optional
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(
                config::Environment::with_prefix("BANKFS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", base))?;

        let repo_config: RepoConfig = settings
            .try_deserialize()
            .context("Failed to parse repository configuration")?;
        repo_config.generator.validate()?;

        tracing::debug!(
            project = %repo_config.project,
            data_dir = %repo_config.data_dir.display(),
            "configuration loaded"
        );

        Ok(repo_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_documented_counts() {
        let config = GeneratorConfig::default();
        assert_eq!(config.customers, 1000);
        assert_eq!(config.transactions, 50_000);
        assert_eq!(config.atm_usage, 15_000);
        assert_eq!(config.branch_visits, 8_000);
        assert_eq!(config.call_center, 12_000);
        assert_eq!(config.seed, Some(DEFAULT_SEED));
        assert_eq!(config.customer_epoch, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.dependent_records(), 85_000);
        assert_eq!(config.expected_counts()[&Dataset::CallCenter], 12_000);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nothing_here");
        let config = RepoConfig::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(config.project, "banking_feature_store");
        assert_eq!(config.output_format, OutputFormat::Parquet);
        assert_eq!(config.server.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature_store.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "project: retail_demo").unwrap();
        writeln!(file, "output_format: csv").unwrap();
        writeln!(file, "generator:").unwrap();
        writeln!(file, "  customers: 25").unwrap();
        writeln!(file, "  seed: 7").unwrap();
        drop(file);

        let base = dir.path().join("feature_store");
        let config = RepoConfig::load_from(base.to_str().unwrap()).unwrap();

        assert_eq!(config.project, "retail_demo");
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert_eq!(config.generator.customers, 25);
        assert_eq!(config.generator.seed, Some(7));
        // untouched keys keep their defaults
        assert_eq!(config.generator.transactions, 50_000);
        assert_eq!(config.generator.anchor, None);
    }

    fn load_yaml(lines: &[&str]) -> Result<RepoConfig> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature_store.yaml");
        std::fs::write(&path, lines.join("\n")).unwrap();
        let base = dir.path().join("feature_store");
        RepoConfig::load_from(base.to_str().unwrap())
    }

    #[test]
    fn test_negative_window_is_rejected() {
        let err = load_yaml(&["generator:", "  atm_window_days: -30"]).unwrap_err();
        assert!(format!("{:#}", err).contains("atm_usage"), "{:#}", err);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let config = GeneratorConfig {
            call_window_days: 0,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_window_beyond_limit_is_rejected() {
        assert!(load_yaml(&["generator:", "  branch_window_days: 1000000000000"]).is_err());
        assert!(check_window(MAX_WINDOW_DAYS).is_ok());
        assert!(check_window(MAX_WINDOW_DAYS + 1).is_err());
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_anchor_is_read_from_file() {
        let config = load_yaml(&["generator:", "  anchor: \"2024-06-30T00:00:00Z\""]).unwrap();
        let expected = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 6, 30, 0, 0, 0).unwrap();
        assert_eq!(config.generator.anchor, Some(expected));
    }
}
