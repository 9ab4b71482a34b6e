// 🔀 Merge Engine - historical + recent sources → one normalized stream
//
// Historical rows carry their own host columns; sheet-partitioned recent rows
// get host metadata from the HostRegistry keyed by the sheet's edition.
// The union is a plain concatenation: no matching of overlapping editions.

use crate::config::DuplicatePolicy;
use crate::entities::{CountryRegistry, HostRegistry, UNKNOWN_NATION};
use crate::error::{EngineError, Result};
use crate::record::{Edition, HistoricalRow, MergedRow, RecentSource, Season, Sheet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// SHEET KEYS
// ============================================================================

/// Split a sheet name into its edition
///
/// Accepts "2024_Summer" and "Summer_2024". Anything else is fatal: guessing
/// would silently drop or misfile an edition.
pub fn parse_sheet_key(key: &str) -> Result<Edition> {
    let malformed = || EngineError::MalformedSheetKey {
        key: key.to_string(),
    };

    let (left, right) = key.trim().split_once('_').ok_or_else(malformed)?;

    let (year, season) = match (left.trim().parse::<i32>(), right.trim().parse::<i32>()) {
        (Ok(year), Err(_)) => (year, right),
        (Err(_), Ok(year)) => (year, left),
        _ => return Err(malformed()),
    };

    let season: Season = season.parse().map_err(|_| malformed())?;
    Ok(Edition::new(year, season))
}

// ============================================================================
// MERGE REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub nation: String,
    pub year: i32,
    pub season: Season,
    pub count: usize,
}

/// Sheet row kept under the placeholder nation because its country cell was not text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCountryRow {
    pub sheet: String,
    pub edition: Edition,
    /// Spreadsheet line, header included
    pub row: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub historical_rows: usize,
    pub recent_rows: usize,
    pub sheets: usize,
    /// Editions whose host came from the placeholder
    pub hosts_defaulted: Vec<Edition>,
    /// Repeated triples kept under `DuplicatePolicy::Keep`
    pub duplicates: Vec<DuplicateKey>,
    pub missing_countries: Vec<MissingCountryRow>,
    pub merged_at: DateTime<Utc>,
}

impl MergeReport {
    pub fn total_rows(&self) -> usize {
        self.historical_rows + self.recent_rows
    }

    pub fn summary(&self) -> String {
        format!(
            "Merged {} rows ({} historical, {} recent from {} sheets), {} placeholder hosts, {} duplicate keys, {} rows without country",
            self.total_rows(),
            self.historical_rows,
            self.recent_rows,
            self.sheets,
            self.hosts_defaulted.len(),
            self.duplicates.len(),
            self.missing_countries.len()
        )
    }
}

/// Normalized recent rows plus what had to be filled in
#[derive(Debug, Clone, Default)]
pub struct RecentRows {
    pub rows: Vec<MergedRow>,
    pub hosts_defaulted: Vec<Edition>,
    pub missing_countries: Vec<MissingCountryRow>,
}

impl RecentRows {
    fn append(&mut self, other: RecentRows) {
        self.rows.extend(other.rows);
        self.hosts_defaulted.extend(other.hosts_defaulted);
        self.missing_countries.extend(other.missing_countries);
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub rows: Vec<MergedRow>,
    pub report: MergeReport,
}

// ============================================================================
// MERGE ENGINE
// ============================================================================

pub struct MergeEngine {
    pub duplicate_policy: DuplicatePolicy,
}

impl MergeEngine {
    pub fn new() -> Self {
        MergeEngine {
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }

    pub fn with_policy(duplicate_policy: DuplicatePolicy) -> Self {
        MergeEngine { duplicate_policy }
    }

    /// Normalize both sources and concatenate them (historical first)
    pub fn merge(
        &self,
        registry: &CountryRegistry,
        hosts: &HostRegistry,
        historical: &[HistoricalRow],
        recent: &RecentSource,
    ) -> Result<MergeOutcome> {
        let mut rows = self.normalize_historical(registry, historical);
        let historical_rows = rows.len();

        let recent_rows = self.normalize_recent(registry, hosts, recent)?;
        let recent_count = recent_rows.rows.len();
        rows.extend(recent_rows.rows);

        let duplicates = self.check_duplicates(&rows)?;

        let sheets = match recent {
            RecentSource::Flat(_) => 0,
            RecentSource::Sheets(sheets) => sheets.len(),
        };

        let report = MergeReport {
            historical_rows,
            recent_rows: recent_count,
            sheets,
            hosts_defaulted: recent_rows.hosts_defaulted,
            duplicates,
            missing_countries: recent_rows.missing_countries,
            merged_at: Utc::now(),
        };

        tracing::info!("{}", report.summary());

        Ok(MergeOutcome { rows, report })
    }

    /// Historical path: trim + canonical alias, host columns carried over
    pub fn normalize_historical(
        &self,
        registry: &CountryRegistry,
        rows: &[HistoricalRow],
    ) -> Vec<MergedRow> {
        rows.iter()
            .map(|row| MergedRow {
                nation: registry.canonical_name(&row.country),
                gold: row.gold,
                silver: row.silver,
                bronze: row.bronze,
                year: row.year,
                season: row.games_type,
                host_city: row.host_city.trim().to_string(),
                host_country: row.host_country.trim().to_string(),
                country_missing: false,
            })
            .collect()
    }

    /// Recent path: flat rows like historical ones, sheets via key + host lookup
    pub fn normalize_recent(
        &self,
        registry: &CountryRegistry,
        hosts: &HostRegistry,
        recent: &RecentSource,
    ) -> Result<RecentRows> {
        match recent {
            RecentSource::Flat(rows) => Ok(RecentRows {
                rows: self.normalize_historical(registry, rows),
                ..RecentRows::default()
            }),
            RecentSource::Sheets(sheets) => {
                let mut recent_rows = RecentRows::default();
                for sheet in sheets {
                    recent_rows.append(self.normalize_sheet(registry, hosts, sheet)?);
                }
                Ok(recent_rows)
            }
        }
    }

    fn normalize_sheet(
        &self,
        registry: &CountryRegistry,
        hosts: &HostRegistry,
        sheet: &Sheet,
    ) -> Result<RecentRows> {
        let edition = parse_sheet_key(&sheet.key)?;
        let host = hosts.lookup(edition.season, edition.year);

        let mut out = RecentRows::default();
        if hosts.get(&edition).is_none() {
            tracing::debug!(sheet = %sheet.key, "no host metadata, using placeholder");
            out.hosts_defaulted.push(edition);
        }

        for (idx, row) in sheet.rows.iter().enumerate() {
            let nation = match row.country.as_deref() {
                Some(country) => registry.canonical_name(country),
                None => {
                    let line = idx + 2; // 1-indexed + header row
                    tracing::warn!(sheet = %sheet.key, row = line, "country cell is not text, keeping row as {}", UNKNOWN_NATION);
                    out.missing_countries.push(MissingCountryRow {
                        sheet: sheet.key.clone(),
                        edition,
                        row: line,
                    });
                    UNKNOWN_NATION.to_string()
                }
            };

            out.rows.push(MergedRow {
                nation,
                gold: row.gold,
                silver: row.silver,
                bronze: row.bronze,
                year: edition.year,
                season: edition.season,
                host_city: host.city.clone(),
                host_country: host.country.clone(),
                country_missing: row.country.is_none(),
            });
        }

        Ok(out)
    }

    /// Apply the duplicate policy; returns the kept duplicates
    ///
    /// Placeholder rows for missing countries are not a nation and never collide.
    fn check_duplicates(&self, rows: &[MergedRow]) -> Result<Vec<DuplicateKey>> {
        let duplicates = find_duplicates(
            rows.iter()
                .filter(|r| !r.country_missing)
                .map(|r| (r.nation.as_str(), r.year, r.season)),
        );

        if duplicates.is_empty() {
            return Ok(duplicates);
        }

        match self.duplicate_policy {
            DuplicatePolicy::Reject => {
                let first = &duplicates[0];
                Err(EngineError::DuplicateRecord {
                    nation: first.nation.clone(),
                    year: first.year,
                    season: first.season,
                })
            }
            DuplicatePolicy::Keep => {
                for dup in &duplicates {
                    tracing::warn!(
                        nation = %dup.nation,
                        year = dup.year,
                        season = %dup.season,
                        count = dup.count,
                        "duplicate medal record kept"
                    );
                }
                Ok(duplicates)
            }
        }
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Every (nation, year, season) triple seen more than once, sorted
pub fn find_duplicates<'a, I>(keys: I) -> Vec<DuplicateKey>
where
    I: IntoIterator<Item = (&'a str, i32, Season)>,
{
    let mut counts: HashMap<(&str, i32, Season), usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut duplicates: Vec<DuplicateKey> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((nation, year, season), count)| DuplicateKey {
            nation: nation.to_string(),
            year,
            season,
            count,
        })
        .collect();
    duplicates.sort();
    duplicates
}

// ============================================================================
// TESTS
// ============================================================================
