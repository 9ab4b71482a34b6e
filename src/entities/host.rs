// 🏟️ Host Editions - (season, year) → host city + country
//
// Only the sheet-partitioned recent source needs this; the historical table
// carries its own host columns. Missing entries never fail the merge.

use crate::error::{EngineError, Result};
use crate::record::{Edition, Season};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const UNKNOWN_HOST: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    #[serde(alias = "ville")]
    pub city: String,

    #[serde(alias = "pays")]
    pub country: String,
}

impl HostInfo {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        HostInfo {
            city: city.into(),
            country: country.into(),
        }
    }

    pub fn unknown() -> Self {
        HostInfo::new(UNKNOWN_HOST, UNKNOWN_HOST)
    }

    pub fn is_placeholder(&self, placeholder: &str) -> bool {
        self.city == placeholder && self.country == placeholder
    }
}

/// Immutable lookup of host metadata per edition
#[derive(Debug, Clone)]
pub struct HostRegistry {
    hosts: HashMap<Edition, HostInfo>,
    placeholder: String,
}

impl HostRegistry {
    pub fn new() -> Self {
        HostRegistry {
            hosts: HashMap::new(),
            placeholder: UNKNOWN_HOST.to_string(),
        }
    }

    /// Text used for both city and country when an edition is missing
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Parse the nested `{season: {year: {ville, pays}}}` document
    pub fn from_json(json: &str) -> Result<Self> {
        let nested: BTreeMap<String, BTreeMap<String, HostInfo>> = serde_json::from_str(json)?;
        let mut registry = HostRegistry::new();

        for (season_key, years) in nested {
            let season: Season = season_key.parse()?;
            for (year_key, info) in years {
                let year: i32 = year_key.trim().parse().map_err(|_| EngineError::InvalidHostYear {
                    season: season_key.clone(),
                    year: year_key.clone(),
                })?;
                registry.insert(Edition::new(year, season), info);
            }
        }

        Ok(registry)
    }

    pub fn insert(&mut self, edition: Edition, info: HostInfo) {
        self.hosts.insert(edition, info);
    }

    pub fn get(&self, edition: &Edition) -> Option<&HostInfo> {
        self.hosts.get(edition)
    }

    /// Host for an edition, or the placeholder pair when absent
    pub fn lookup(&self, season: Season, year: i32) -> HostInfo {
        match self.hosts.get(&Edition::new(year, season)) {
            Some(info) => info.clone(),
            None => HostInfo::new(self.placeholder.clone(), self.placeholder.clone()),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self::new()
    }
}
