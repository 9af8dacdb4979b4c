//! Worker configuration loaded from TOML
//!
//! Every field has a default, so an empty or missing file behaves like the
//! built-in settings.

use std::fs;
use std::path::Path;

use anyhow::Context;
use quote_parser::{ExtractionConfig, QuoteParser, VenueCatalog};
use serde::{Deserialize, Serialize};

use crate::lease::DEFAULT_LEASE_MS;
use crate::upload::DEFAULT_UPLOAD_PREFIX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Lease length in milliseconds
    #[serde(default = "default_lease_ms")]
    pub lease_ms: i64,
    /// Only objects under this prefix are processed
    #[serde(default = "default_upload_prefix")]
    pub upload_prefix: String,
    /// Prefix of the per-run lease owner id
    #[serde(default = "default_owner_prefix")]
    pub owner_prefix: String,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Venue names recognized on top of the bundled list
    #[serde(default)]
    pub venues: Vec<String>,
}

fn default_lease_ms() -> i64 {
    DEFAULT_LEASE_MS
}

fn default_upload_prefix() -> String {
    DEFAULT_UPLOAD_PREFIX.to_string()
}

fn default_owner_prefix() -> String {
    "quote-worker".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            lease_ms: default_lease_ms(),
            upload_prefix: default_upload_prefix(),
            owner_prefix: default_owner_prefix(),
            extraction: ExtractionConfig::default(),
            venues: Vec::new(),
        }
    }
}

impl WorkerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Invalid worker configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.lease_ms > 0, "lease_ms must be positive");
        anyhow::ensure!(
            (-12..=14).contains(&self.extraction.utc_offset_hours),
            "extraction.utc_offset_hours must be between -12 and 14"
        );
        Ok(())
    }

    /// Parser with this configuration's heuristics and venue list
    pub fn build_parser(&self) -> QuoteParser {
        QuoteParser::new(
            self.extraction.clone(),
            VenueCatalog::with_defaults(self.venues.iter().cloned()),
        )
    }
}
