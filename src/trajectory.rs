// 📈 Historical Aggregator - cumulative Points per nation across editions
//
// The year axis is every edition of the season inside the window, so a nation
// that won nothing at some edition still gets a (flat) point there.

use crate::error::{EngineError, Result};
use crate::record::{MedalRecord, Season};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryRequest {
    pub season: Season,

    /// Canonical names to include; empty means every nation in the window
    #[serde(default)]
    pub nations: BTreeSet<String>,

    pub from_year: i32,
    pub to_year: i32,

    /// Removed after the cumulative sum, so other series are unaffected
    #[serde(default)]
    pub exclude: BTreeSet<String>,
}

impl TrajectoryRequest {
    pub fn new(season: Season, from_year: i32, to_year: i32) -> Self {
        TrajectoryRequest {
            season,
            nations: BTreeSet::new(),
            from_year,
            to_year,
            exclude: BTreeSet::new(),
        }
    }

    pub fn with_nations<I, S>(mut self, nations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nations = nations.into_iter().map(Into::into).collect();
        self
    }

    pub fn excluding<I, S>(mut self, nations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = nations.into_iter().map(Into::into).collect();
        self
    }

    fn contains_year(&self, year: i32) -> bool {
        (self.from_year..=self.to_year).contains(&year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationSeries {
    pub nation: String,
    /// Aligned with `CumulativeTrajectory::years`
    pub cumulative: Vec<u64>,
}

impl NationSeries {
    pub fn final_value(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationValue {
    pub nation: String,
    pub cumulative: u64,
}

/// One year of the trajectory (rows = year, columns = nation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryRow {
    pub year: i32,
    pub values: Vec<NationValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeTrajectory {
    pub years: Vec<i32>,
    /// Ordered by final cumulative value, descending
    pub series: Vec<NationSeries>,
}

impl CumulativeTrajectory {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn nations(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.nation.as_str()).collect()
    }

    pub fn get(&self, nation: &str) -> Option<&NationSeries> {
        self.series.iter().find(|s| s.nation == nation)
    }

    /// Year-major view, columns in series order
    pub fn rows(&self) -> Vec<TrajectoryRow> {
        self.years
            .iter()
            .enumerate()
            .map(|(idx, &year)| TrajectoryRow {
                year,
                values: self
                    .series
                    .iter()
                    .map(|s| NationValue {
                        nation: s.nation.clone(),
                        cumulative: s.cumulative[idx],
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Cumulative Points trajectory for the requested nations and window
pub fn cumulative_points<'a, I>(records: I, request: &TrajectoryRequest) -> Result<CumulativeTrajectory>
where
    I: IntoIterator<Item = &'a MedalRecord>,
{
    if request.from_year > request.to_year {
        return Err(EngineError::InvalidRange {
            from: request.from_year,
            to: request.to_year,
        });
    }

    let window: Vec<&MedalRecord> = records
        .into_iter()
        .filter(|r| r.season == request.season && request.contains_year(r.year))
        .collect();

    let years: Vec<i32> = window
        .iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if years.is_empty() {
        return Ok(CumulativeTrajectory::default());
    }

    // Rows without a country share one placeholder name; they are not a nation
    let nations: BTreeSet<&str> = if request.nations.is_empty() {
        window
            .iter()
            .filter(|r| !r.country_missing)
            .map(|r| r.nation.as_str())
            .collect()
    } else {
        request.nations.iter().map(String::as_str).collect()
    };

    let mut points: HashMap<(&str, i32), u64> = HashMap::new();
    for record in window.iter().filter(|r| !r.country_missing) {
        *points.entry((record.nation.as_str(), record.year)).or_insert(0) += record.points;
    }

    let mut series: Vec<NationSeries> = nations
        .into_iter()
        .map(|nation| {
            let mut running = 0u64;
            let cumulative = years
                .iter()
                .map(|&year| {
                    running += points.get(&(nation, year)).copied().unwrap_or(0);
                    running
                })
                .collect();
            NationSeries {
                nation: nation.to_string(),
                cumulative,
            }
        })
        .filter(|s| !request.exclude.contains(&s.nation))
        .collect();

    series.sort_by(|a, b| {
        b.final_value()
            .cmp(&a.final_value())
            .then_with(|| a.nation.cmp(&b.nation))
    });

    tracing::debug!(
        season = %request.season,
        from = request.from_year,
        to = request.to_year,
        editions = years.len(),
        nations = series.len(),
        "cumulative trajectory"
    );

    Ok(CumulativeTrajectory { years, series })
}
