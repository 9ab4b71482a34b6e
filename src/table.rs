// 📋 Medal Table - ranked records for every edition

use crate::entities::HostInfo;
use crate::record::{Edition, MedalRecord, Season};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One line of the edition selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionSummary {
    pub year: i32,
    pub season: Season,
    pub host_city: String,
    pub host_country: String,
    pub nations: usize,
}

/// Records ordered by edition, then official rank, then nation name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedalTable {
    records: Vec<MedalRecord>,
}

impl MedalTable {
    pub fn new(mut records: Vec<MedalRecord>) -> Self {
        records.sort_by(|a, b| {
            a.edition()
                .cmp(&b.edition())
                .then(a.rank.cmp(&b.rank))
                .then_with(|| a.nation.cmp(&b.nation))
        });
        MedalTable { records }
    }

    pub fn records(&self) -> &[MedalRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MedalRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one edition in official order; empty when nothing matches
    pub fn edition(&self, year: i32, season: Season) -> Vec<&MedalRecord> {
        self.records
            .iter()
            .filter(|r| r.year == year && r.season == season)
            .collect()
    }

    /// All editions, most recent first
    pub fn editions(&self) -> Vec<EditionSummary> {
        let mut by_edition: BTreeMap<Edition, EditionSummary> = BTreeMap::new();

        for record in &self.records {
            by_edition
                .entry(record.edition())
                .and_modify(|summary| summary.nations += 1)
                .or_insert_with(|| EditionSummary {
                    year: record.year,
                    season: record.season,
                    host_city: record.host_city.clone(),
                    host_country: record.host_country.clone(),
                    nations: 1,
                });
        }

        by_edition.into_values().rev().collect()
    }

    /// Distinct years, most recent first
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.records.iter().map(|r| r.year).collect();
        years.into_iter().rev().collect()
    }

    pub fn host_of(&self, year: i32, season: Season) -> Option<HostInfo> {
        self.records
            .iter()
            .find(|r| r.year == year && r.season == season)
            .map(|r| HostInfo::new(r.host_city.clone(), r.host_country.clone()))
    }

    /// Canonical nation names that appear in a season
    pub fn nations(&self, season: Season) -> BTreeSet<String> {
        self.records
            .iter()
            .filter(|r| r.season == season && !r.country_missing)
            .map(|r| r.nation.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(nation: &str, rank: u32, year: i32, season: Season, city: &str) -> MedalRecord {
        MedalRecord {
            rank,
            flag: "un".to_string(),
            nation: nation.to_string(),
            gold: 0,
            silver: 0,
            bronze: 0,
            total: 0,
            points: 0,
            year,
            season,
            host_city: city.to_string(),
            host_country: "Somewhere".to_string(),
            country_missing: false,
        }
    }

    fn table() -> MedalTable {
        MedalTable::new(vec![
            record("B", 2, 2024, Season::Summer, "Paris"),
            record("A", 1, 2022, Season::Winter, "Beijing"),
            record("C", 1, 2024, Season::Summer, "Paris"),
            record("D", 2, 2024, Season::Summer, "Paris"),
        ])
    }

    #[test]
    fn test_table_ordering() {
        let table = table();
        let order: Vec<&str> = table.records().iter().map(|r| r.nation.as_str()).collect();
        assert_eq!(order, vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_edition_filter() {
        let table = table();
        assert_eq!(table.edition(2024, Season::Summer).len(), 3);
        assert_eq!(table.edition(2022, Season::Winter).len(), 1);
        // Empty selection is not an error
        assert!(table.edition(2024, Season::Winter).is_empty());
    }

    #[test]
    fn test_editions_most_recent_first() {
        let editions = table().editions();
        assert_eq!(editions.len(), 2);
        assert_eq!(editions[0].year, 2024);
        assert_eq!(editions[0].host_city, "Paris");
        assert_eq!(editions[0].nations, 3);
        assert_eq!(editions[1].season, Season::Winter);
    }

    #[test]
    fn test_years_and_hosts() {
        let table = table();
        assert_eq!(table.years(), vec![2024, 2022]);
        assert_eq!(table.host_of(2022, Season::Winter).unwrap().city, "Beijing");
        assert!(table.host_of(1896, Season::Summer).is_none());
        assert_eq!(table.nations(Season::Summer).len(), 3);
    }

    #[test]
    fn test_nations_skip_rows_without_country() {
        let mut unnamed = record("Unknown", 3, 2024, Season::Summer, "Paris");
        unnamed.country_missing = true;
        let table = MedalTable::new(vec![record("B", 1, 2024, Season::Summer, "Paris"), unnamed]);

        assert_eq!(table.edition(2024, Season::Summer).len(), 2);
        assert_eq!(table.nations(Season::Summer).into_iter().collect::<Vec<_>>(), vec!["B"]);
    }
}
