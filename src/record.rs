// 🏅 Records - raw source rows, merged rows and ranked medal records

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SEASON / EDITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Season {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            _ => Err(EngineError::UnknownSeason(s.to_string())),
        }
    }
}

impl TryFrom<String> for Season {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One Olympic Games instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edition {
    pub year: i32,
    pub season: Season,
}

impl Edition {
    pub fn new(year: i32, season: Season) -> Self {
        Edition { year, season }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.year, self.season)
    }
}

// ============================================================================
// RAW SOURCE ROWS
// ============================================================================

/// Row of the historical table (also the shape of a flat recent table).
/// Columns not listed here (e.g. `athletes`) are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRow {
    pub country: String,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
    pub year: i32,
    pub games_type: Season,
    pub host_city: String,
    pub host_country: String,
}

/// Row of one sheet in a sheet-partitioned recent source.
/// `country` is `None` when the cell held something other than text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    pub country: Option<String>,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

/// Rows of one edition, keyed by sheet name ("2024_Summer")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub key: String,
    pub rows: Vec<SheetRow>,
}

/// Recent source: one flat table or a set of per-edition sheets
#[derive(Debug, Clone, PartialEq)]
pub enum RecentSource {
    Flat(Vec<HistoricalRow>),
    Sheets(Vec<Sheet>),
}

impl RecentSource {
    pub fn row_count(&self) -> usize {
        match self {
            RecentSource::Flat(rows) => rows.len(),
            RecentSource::Sheets(sheets) => sheets.iter().map(|s| s.rows.len()).sum(),
        }
    }
}

// ============================================================================
// MERGED / RANKED
// ============================================================================

/// Normalized row produced by the merger (fixed column set)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRow {
    pub nation: String,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
    pub year: i32,
    pub season: Season,
    pub host_city: String,
    pub host_country: String,
    /// Source cell held no country text; `nation` is a placeholder
    #[serde(default)]
    pub country_missing: bool,
}

impl MergedRow {
    pub fn edition(&self) -> Edition {
        Edition::new(self.year, self.season)
    }

    pub fn points(&self) -> u64 {
        medal_points(self.gold, self.silver, self.bronze)
    }

    pub fn total(&self) -> u64 {
        medal_total(self.gold, self.silver, self.bronze)
    }
}

/// 3 points per gold, 2 per silver, 1 per bronze
///
/// Widened to `u64`: the result is exact for every `u32` count.
pub fn medal_points(gold: u32, silver: u32, bronze: u32) -> u64 {
    u64::from(gold) * 3 + u64::from(silver) * 2 + u64::from(bronze)
}

pub fn medal_total(gold: u32, silver: u32, bronze: u32) -> u64 {
    u64::from(gold) + u64::from(silver) + u64::from(bronze)
}

/// One nation at one edition, with derived columns and official rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedalRecord {
    pub rank: u32,
    pub flag: String,
    pub nation: String,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
    pub total: u64,
    pub points: u64,
    pub year: i32,
    pub season: Season,
    pub host_city: String,
    pub host_country: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub country_missing: bool,
}

impl MedalRecord {
    pub fn edition(&self) -> Edition {
        Edition::new(self.year, self.season)
    }

    /// Key of the official medal table: gold, then silver, then bronze
    pub fn medal_key(&self) -> (u32, u32, u32) {
        (self.gold, self.silver, self.bronze)
    }

    /// Flag image URL in the format the dashboard renders
    pub fn flag_url(&self) -> String {
        format!("https://flagcdn.com/120x90/{}.png", self.flag)
    }
}
