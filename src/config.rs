// ⚙️ Engine Configuration - settings as data
// Loaded once from JSON; every field has a default so an empty file is valid

use crate::entities::{AliasTable, CountryRegistry, FlagTable, IsoCountries, UNKNOWN_HOST};
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What the merger does with a repeated (nation, year, season) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the merge
    #[default]
    Reject,
    /// Keep every row and log a warning
    Keep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Replaces the embedded canonical-name alias table
    pub country_aliases: Option<PathBuf>,

    /// Replaces the embedded flag override table
    pub flag_overrides: Option<PathBuf>,

    pub duplicate_policy: DuplicatePolicy,

    /// City/country text for editions missing from host metadata
    pub host_placeholder: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            country_aliases: None,
            flag_overrides: None,
            duplicate_policy: DuplicatePolicy::Reject,
            host_placeholder: UNKNOWN_HOST.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: EngineConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// Build the country registry, honoring table overrides
    pub fn country_registry(&self) -> Result<CountryRegistry> {
        let aliases = match &self.country_aliases {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read alias table: {:?}", path))?;
                AliasTable::parse(&content)
                    .with_context(|| format!("Invalid alias table: {:?}", path))?
            }
            None => AliasTable::builtin().context("Invalid embedded alias table")?,
        };

        let flags = match &self.flag_overrides {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read flag overrides: {:?}", path))?;
                FlagTable::parse(&content)
                    .with_context(|| format!("Invalid flag overrides: {:?}", path))?
            }
            None => FlagTable::builtin().context("Invalid embedded flag overrides")?,
        };

        let iso = IsoCountries::builtin().context("Invalid embedded ISO country table")?;

        tracing::debug!(
            aliases = aliases.len(),
            flag_overrides = flags.len(),
            "country registry loaded"
        );

        Ok(CountryRegistry::new(aliases, flags, iso))
    }
}
